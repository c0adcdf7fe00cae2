use gd_core::*;
use gd_gameplay::DealResult;
use gd_gameplay::PlayerView;
use serde::Serialize;

/// Messages sent from the room to clients over the collaborator
/// transport. Tagged with the event's wire name so clients dispatch on
/// `type`; cards travel as `Color_Number` id strings.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Initial connection confirmation with seat assignment.
    Connected { room: String, seat: Seat },
    MatchStarted {
        usernames: Vec<String>,
        levels: [u8; TEAMS],
    },
    MatchEnded { winner: i8, aborted: bool },
    DealStarted { number: usize, level: u8 },
    CardsDealt { counts: [usize; N] },
    TributePhase { status: String },
    TributeRulesSet {
        victory: String,
        map: Vec<(Seat, i8)>,
    },
    TributeImmunity { team: Team },
    TributePoolCreated { pool: Vec<PoolCard> },
    TributeStarted,
    TributeGiven { from: Seat, to: Seat, card: String },
    TributeSelected {
        seat: Seat,
        donor: Seat,
        card: String,
    },
    ReturnTribute { from: Seat, to: Seat, card: String },
    TributeCompleted,
    TrickStarted { leader: Seat },
    PlayerPlayed {
        seat: Seat,
        cards: Vec<String>,
        combo: String,
    },
    PlayerPassed { seat: Seat },
    TrickEnded { winner: Seat, next_leader: Seat },
    DealEnded { result: DealResult },
    PlayerTimeout { seat: Seat },
    PlayerDisconnect { seat: Seat },
    PlayerReconnect { seat: Seat },
    /// It's your turn to play or pass.
    PlayRequest {
        seat: Seat,
        hand: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        lead: Option<String>,
        deadline_ms: u64,
    },
    /// Pick a card from the tribute pool.
    TributeRequest {
        seat: Seat,
        pool: Vec<String>,
        deadline_ms: u64,
    },
    /// Choose a return card.
    ReturnRequest {
        seat: Seat,
        hand: Vec<String>,
        deadline_ms: u64,
    },
    /// Per-seat state projection after a change.
    State { view: PlayerView },
}

/// One pool entry: who donated which card.
#[derive(Clone, Debug, Serialize)]
pub struct PoolCard {
    pub seat: Seat,
    pub card: String,
}

impl ServerMessage {
    pub fn connected(room: &str, seat: Seat) -> Self {
        Self::Connected {
            room: room.to_string(),
            seat,
        }
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}
