use super::error::GameError;
use gd_cards::Card;

/// A player decision at a trick turn: play a card set or pass.
///
/// Actions parse from the wire as `pass` or a whitespace-separated list
/// of `Color_Number` card ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Play(Vec<Card>),
    Pass,
}

impl Action {
    pub fn is_pass(&self) -> bool {
        matches!(self, Action::Pass)
    }
    /// The played cards, empty for a pass.
    pub fn cards(&self) -> &[Card] {
        match self {
            Action::Play(cards) => cards,
            Action::Pass => &[],
        }
    }
}

impl TryFrom<&str> for Action {
    type Error = GameError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "pass" => Ok(Action::Pass),
            _ => Card::parse(s)
                .map(Action::Play)
                .map_err(GameError::InvalidCardID),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Pass => write!(f, "PASS"),
            Action::Play(cards) => {
                let s = cards
                    .iter()
                    .map(|c| c.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "PLAY {}", s)
            }
        }
    }
}
