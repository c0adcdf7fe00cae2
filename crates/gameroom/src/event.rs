use gd_cards::Card;
use gd_cards::Combo;
use gd_cards::Rank;
use gd_core::*;
use gd_gameplay::DealResult;
use gd_gameplay::PlayerView;
use gd_gameplay::TributeStatus;
use gd_gameplay::VictoryType;

/// It is your turn to play or pass.
#[derive(Clone, Debug)]
pub struct PlayRequest {
    pub seat: Seat,
    pub hand: Vec<Card>,
    pub lead: Option<Combo>,
    pub level: Rank,
    pub deadline_ms: u64,
}

/// Pick one card from the tribute pool.
#[derive(Clone, Debug)]
pub struct TributeRequest {
    pub seat: Seat,
    pub pool: Vec<Card>,
    pub level: Rank,
    pub deadline_ms: u64,
}

/// Choose the card returned for a received tribute.
#[derive(Clone, Debug)]
pub struct ReturnRequest {
    pub seat: Seat,
    pub hand: Vec<Card>,
    pub level: Rank,
    pub deadline_ms: u64,
}

/// Everything the driver announces.
///
/// The first block are the public kinds fanned out to observers and all
/// players, synchronously and in emission order. The request and state
/// variants at the bottom are unicast to a single seat and never reach
/// the observer bus.
#[derive(Clone, Debug)]
pub enum Event {
    MatchStarted {
        usernames: [String; N],
        levels: [u8; TEAMS],
    },
    MatchEnded {
        winner: Option<Team>,
        aborted: bool,
    },
    DealStarted {
        number: usize,
        level: Rank,
    },
    CardsDealt {
        counts: [usize; N],
    },
    TributePhase {
        status: TributeStatus,
    },
    TributeRulesSet {
        victory: VictoryType,
        /// Payer → receiver, -1 for the pool.
        map: Vec<(Seat, i8)>,
    },
    TributeImmunity {
        team: Team,
    },
    TributePoolCreated {
        pool: Vec<(Seat, Card)>,
    },
    TributeStarted,
    TributeGiven {
        from: Seat,
        to: Seat,
        card: Card,
    },
    TributeSelected {
        seat: Seat,
        donor: Seat,
        card: Card,
    },
    ReturnTribute {
        from: Seat,
        to: Seat,
        card: Card,
    },
    TributeCompleted,
    TrickStarted {
        leader: Seat,
    },
    PlayerPlayed {
        seat: Seat,
        cards: Vec<Card>,
        combo: Combo,
    },
    PlayerPassed {
        seat: Seat,
    },
    TrickEnded {
        winner: Seat,
        next_leader: Seat,
    },
    DealEnded {
        result: DealResult,
    },
    PlayerTimeout {
        seat: Seat,
    },
    PlayerDisconnect {
        seat: Seat,
    },
    PlayerReconnect {
        seat: Seat,
    },
    /// Unicast: a decision is required.
    PlayRequest(PlayRequest),
    /// Unicast: a pool pick is required.
    TributeRequest(TributeRequest),
    /// Unicast: a return card is required.
    ReturnRequest(ReturnRequest),
    /// Unicast: fresh per-seat projection after a state change.
    StateSync(PlayerView),
}

impl Event {
    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::MatchStarted { .. } => "match_started",
            Event::MatchEnded { .. } => "match_ended",
            Event::DealStarted { .. } => "deal_started",
            Event::CardsDealt { .. } => "cards_dealt",
            Event::TributePhase { .. } => "tribute_phase",
            Event::TributeRulesSet { .. } => "tribute_rules_set",
            Event::TributeImmunity { .. } => "tribute_immunity",
            Event::TributePoolCreated { .. } => "tribute_pool_created",
            Event::TributeStarted => "tribute_started",
            Event::TributeGiven { .. } => "tribute_given",
            Event::TributeSelected { .. } => "tribute_selected",
            Event::ReturnTribute { .. } => "return_tribute",
            Event::TributeCompleted => "tribute_completed",
            Event::TrickStarted { .. } => "trick_started",
            Event::PlayerPlayed { .. } => "player_played",
            Event::PlayerPassed { .. } => "player_passed",
            Event::TrickEnded { .. } => "trick_ended",
            Event::DealEnded { .. } => "deal_ended",
            Event::PlayerTimeout { .. } => "player_timeout",
            Event::PlayerDisconnect { .. } => "player_disconnect",
            Event::PlayerReconnect { .. } => "player_reconnect",
            Event::PlayRequest(_) => "play_request",
            Event::TributeRequest(_) => "tribute_request",
            Event::ReturnRequest(_) => "return_request",
            Event::StateSync(_) => "state_sync",
        }
    }
    /// Seat a private event is addressed to; None for the public kinds.
    pub fn audience(&self) -> Option<Seat> {
        match self {
            Event::PlayRequest(request) => Some(request.seat),
            Event::TributeRequest(request) => Some(request.seat),
            Event::ReturnRequest(request) => Some(request.seat),
            Event::StateSync(view) => Some(view.seat),
            _ => None,
        }
    }
    /// True for the kinds delivered to the observer bus and every seat.
    pub fn is_public(&self) -> bool {
        self.audience().is_none()
    }
    pub fn seat(&self) -> Option<Seat> {
        match self {
            Event::PlayerPlayed { seat, .. }
            | Event::PlayerPassed { seat }
            | Event::PlayerTimeout { seat }
            | Event::PlayerDisconnect { seat }
            | Event::PlayerReconnect { seat }
            | Event::TributeSelected { seat, .. } => Some(*seat),
            _ => None,
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::MatchStarted { usernames, .. } => {
                write!(f, "match started: {}", usernames.join(", "))
            }
            Event::MatchEnded {
                winner: Some(team), ..
            } => write!(f, "match ended: team {} wins", team),
            Event::MatchEnded { winner: None, .. } => write!(f, "match ended without a winner"),
            Event::DealStarted { number, level } => {
                write!(f, "deal #{} at level {}", number, level)
            }
            Event::CardsDealt { .. } => write!(f, "cards dealt"),
            Event::TributePhase { status } => write!(f, "tribute phase: {:?}", status),
            Event::TributeRulesSet { victory, .. } => write!(f, "tribute rules: {}", victory),
            Event::TributeImmunity { team } => write!(f, "team {} is immune", team),
            Event::TributePoolCreated { pool } => write!(f, "tribute pool of {}", pool.len()),
            Event::TributeStarted => write!(f, "tribute started"),
            Event::TributeGiven { from, to, card } => {
                write!(f, "P{} tributes {} to P{}", from, card, to)
            }
            Event::TributeSelected { seat, card, .. } => {
                write!(f, "P{} takes {} from the pool", seat, card)
            }
            Event::ReturnTribute { from, to, card } => {
                write!(f, "P{} returns {} to P{}", from, card, to)
            }
            Event::TributeCompleted => write!(f, "tribute completed"),
            Event::TrickStarted { leader } => write!(f, "trick started, P{} leads", leader),
            Event::PlayerPlayed { seat, combo, .. } => write!(f, "P{}: {}", seat, combo),
            Event::PlayerPassed { seat } => write!(f, "P{}: pass", seat),
            Event::TrickEnded { winner, .. } => write!(f, "trick won by P{}", winner),
            Event::DealEnded { result } => {
                write!(f, "deal ended: {} for team {}", result.victory, result.winning_team)
            }
            Event::PlayerTimeout { seat } => write!(f, "P{}: timed out", seat),
            Event::PlayerDisconnect { seat } => write!(f, "P{}: disconnected", seat),
            Event::PlayerReconnect { seat } => write!(f, "P{}: reconnected", seat),
            Event::PlayRequest(req) => write!(f, "P{}: your turn", req.seat),
            Event::TributeRequest(req) => write!(f, "P{}: pick from the pool", req.seat),
            Event::ReturnRequest(req) => write!(f, "P{}: return a card", req.seat),
            Event::StateSync(view) => write!(f, "state sync for P{}", view.seat),
        }
    }
}
