use super::deal::Deal;
use super::deal::DealStatus;
use super::game::Match;
use super::game::MatchStatus;
use super::trick::Trick;
use super::tribute::TributePhase;
use super::tribute::TributeStatus;
use gd_core::*;
use serde::Serialize;

/// Everything one seat is allowed to see.
///
/// Contains the seat's own hand and only public facts about everyone
/// else: card counts, plays, levels, tribute state, and the public turn
/// deadline. Other hands and the shuffle seed never appear.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub seat: Seat,
    pub hand: Vec<String>,
    pub players: Vec<PublicPlayer>,
    pub levels: [u8; TEAMS],
    pub status: String,
    pub deal: Option<DealView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicPlayer {
    pub username: String,
    pub seat: Seat,
    pub online: bool,
    pub auto_play: bool,
    pub cards_left: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DealView {
    pub level: u8,
    pub status: String,
    pub rankings: Vec<Seat>,
    pub trick: Option<TrickView>,
    pub tribute: Option<TributeView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrickView {
    pub leader: Seat,
    pub turn: Seat,
    pub lead: Option<String>,
    pub plays: Vec<PlayView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayView {
    pub seat: Seat,
    /// Card ids, empty for a pass.
    pub cards: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TributeView {
    pub status: String,
    pub immune: bool,
    /// Payer → receiver, -1 for the pool.
    pub map: Vec<(Seat, i8)>,
    pub pool: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selecting: Option<Seat>,
}

impl PlayerView {
    /// Projects the full match state down to what `seat` may see.
    pub fn project(game: &Match, seat: Seat) -> Self {
        let hand = game
            .deal()
            .map(|d| d.hand(seat).iter().map(|c| c.id()).collect())
            .unwrap_or_default();
        let players = game
            .participants()
            .iter()
            .map(|p| PublicPlayer {
                username: p.username.clone(),
                seat: p.seat,
                online: p.online,
                auto_play: p.auto_play,
                cards_left: game.deal().map(|d| d.hand(p.seat).len()).unwrap_or(0),
            })
            .collect();
        Self {
            seat,
            hand,
            players,
            levels: game.levels().map(u8::from),
            status: status_name(game.status()).into(),
            deal: game.deal().map(DealView::project),
        }
    }
}

impl DealView {
    /// Public projection of a deal: level, status, rankings, trick,
    /// and tribute state. No hands.
    pub fn project(deal: &Deal) -> Self {
        Self {
            level: u8::from(deal.level()),
            status: deal_status_name(deal.status()).into(),
            rankings: deal.rankings().to_vec(),
            trick: deal.trick().map(trick_view),
            tribute: deal.tribute().map(tribute_view),
        }
    }
}

fn trick_view(trick: &Trick) -> TrickView {
    TrickView {
        leader: trick.leader(),
        turn: trick.turn(),
        lead: trick.lead().map(|c| c.to_string()),
        plays: trick
            .plays()
            .iter()
            .map(|(seat, cards)| PlayView {
                seat: *seat,
                cards: cards
                    .as_ref()
                    .map(|cs| cs.iter().map(|c| c.id()).collect())
                    .unwrap_or_default(),
            })
            .collect(),
        deadline_ms: trick.deadline_ms(),
    }
}

fn tribute_view(phase: &TributePhase) -> TributeView {
    TributeView {
        status: tribute_status_name(phase.status()).into(),
        immune: phase.is_immune(),
        map: phase
            .map()
            .iter()
            .map(|&(payer, to)| (payer, to.map(|s| s as i8).unwrap_or(-1)))
            .collect(),
        pool: phase.pool().iter().map(|(_, c)| c.id()).collect(),
        selecting: phase.selecting(),
    }
}

fn status_name(status: MatchStatus) -> &'static str {
    match status {
        MatchStatus::Waiting => "waiting",
        MatchStatus::Playing => "playing",
        MatchStatus::Finished => "finished",
    }
}

fn deal_status_name(status: DealStatus) -> &'static str {
    match status {
        DealStatus::Waiting => "waiting",
        DealStatus::Dealing => "dealing",
        DealStatus::Tribute => "tribute",
        DealStatus::Playing => "playing",
        DealStatus::Finished => "finished",
    }
}

fn tribute_status_name(status: TributeStatus) -> &'static str {
    match status {
        TributeStatus::Waiting => "waiting",
        TributeStatus::Selecting => "selecting",
        TributeStatus::Returning => "returning",
        TributeStatus::Finished => "finished",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_match() -> Match {
        let mut game = Match::new(["p0", "p1", "p2", "p3"].map(String::from));
        game.begin().unwrap();
        let deal = game.start_deal().unwrap();
        deal.deal_cards(1).unwrap();
        let leader = deal.first_leader();
        deal.begin_play(leader).unwrap();
        game
    }

    #[test]
    fn view_contains_own_hand_only() {
        let game = started_match();
        for seat in 0..N {
            let view = PlayerView::project(&game, seat);
            assert_eq!(view.seat, seat);
            assert_eq!(view.hand.len(), HAND);
            let own: Vec<String> =
                game.deal().unwrap().hand(seat).iter().map(|c| c.id()).collect();
            assert_eq!(view.hand, own);
            // everyone else appears only as a count
            for p in &view.players {
                assert_eq!(p.cards_left, HAND);
            }
        }
    }

    #[test]
    fn view_serializes() {
        let game = started_match();
        let view = PlayerView::project(&game, 0);
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"levels\":[2,2]"));
        assert!(json.contains("\"cards_left\":27"));
    }
}
