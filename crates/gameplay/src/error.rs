use gd_core::Seat;

/// Every failure kind observable by collaborators.
///
/// Validator kinds are reported to the submitting player and leave state
/// unchanged; timeouts are recovered locally with defaults; an
/// `InternalInvariant` is fatal for the match.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid card id: {0}")]
    InvalidCardID(String),
    #[error("cards form no valid combination")]
    InvalidCombo,
    #[error("not seat {0}'s turn")]
    NotYourTurn(Seat),
    #[error("the trick leader must play")]
    MustLead,
    #[error("combination does not beat the lead")]
    IllegalBeat,
    #[error("card not in hand: {0}")]
    NotInHand(String),
    #[error("invalid tribute selection: {0}")]
    InvalidTributeSelection(String),
    #[error("no pending input request")]
    NoPendingInput,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("operation not valid in this phase")]
    WrongPhase,
    #[error("request cancelled")]
    Cancelled,
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}
