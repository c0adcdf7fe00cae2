use super::event::Event;
use super::event::PlayRequest;
use super::event::ReturnRequest;
use super::event::TributeRequest;
use gd_cards::Card;
use gd_gameplay::Action;
use gd_gameplay::GameError;

/// Trait for entities that make guandan decisions.
/// Implementations can be bots, humans via CLI, network players via
/// WebSocket, etc.
///
/// The async design allows:
/// - Bots to spawn blocking computation in separate threads
/// - Human players to await user input without blocking the room
/// - Network players to await remote responses with timeouts
///
/// Decision methods are fallible: an implementation that cannot produce
/// an answer surfaces a [`GameError`] instead of panicking, and the
/// driver's deadline default covers the seat. The seat is
/// transport-agnostic: the room doesn't care whether decisions come
/// from local computation, stdin, HTTP, or WebSocket.
#[async_trait::async_trait]
pub trait Player: Send {
    /// Check if the player is still connected.
    /// Returns false when the player has gone away (channel closed,
    /// socket dropped). Bots are always alive.
    fn alive(&self) -> bool {
        true
    }
    /// Make a play decision. Called when it's this player's turn; the
    /// request carries everything visible to this seat.
    async fn decide(&mut self, request: &PlayRequest) -> Result<Action, GameError>;
    /// Pick a card from the tribute pool.
    async fn pick(&mut self, request: &TributeRequest) -> Result<Card, GameError>;
    /// Choose the card to return for a received tribute.
    async fn give_back(&mut self, request: &ReturnRequest) -> Result<Card, GameError>;
    /// Receive notification of game events. Called for all public
    /// events and private messages for this seat. Not required for
    /// decision-making (requests are self-contained).
    async fn notify(&mut self, event: &Event);
}
