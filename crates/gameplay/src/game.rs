use super::deal::Deal;
use super::error::GameError;
use super::result::DealResult;
use gd_cards::Rank;
use gd_core::*;
use std::time::SystemTime;

/// Match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Waiting,
    Playing,
    Finished,
}

/// A seated player's public record.
#[derive(Debug, Clone)]
pub struct Participant {
    id: ID<Participant>,
    pub username: String,
    pub seat: Seat,
    pub online: bool,
    pub auto_play: bool,
}

impl Participant {
    pub fn new(username: impl Into<String>, seat: Seat) -> Self {
        Self {
            id: ID::default(),
            username: username.into(),
            seat,
            online: true,
            auto_play: false,
        }
    }
}

impl Unique for Participant {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

/// A full game session: deals until a team wins one while already at
/// level A. Exclusively owns its deals, which own their tricks and
/// tribute phase.
#[derive(Debug, Clone)]
pub struct Match {
    participants: [Participant; N],
    levels: [Rank; TEAMS],
    deal: Option<Deal>,
    history: Vec<DealResult>,
    winner: Option<Team>,
    status: MatchStatus,
    started: SystemTime,
    ended: Option<SystemTime>,
}

impl Match {
    pub fn new(usernames: [String; N]) -> Self {
        let mut seat = 0;
        Self {
            participants: usernames.map(|name| {
                let p = Participant::new(name, seat);
                seat += 1;
                p
            }),
            levels: [Rank::Two; TEAMS],
            deal: None,
            history: Vec::new(),
            winner: None,
            status: MatchStatus::Waiting,
            started: SystemTime::now(),
            ended: None,
        }
    }

    pub fn participants(&self) -> &[Participant; N] {
        &self.participants
    }
    pub fn participant(&self, seat: Seat) -> &Participant {
        &self.participants[seat]
    }
    pub fn set_online(&mut self, seat: Seat, online: bool) {
        self.participants[seat].online = online;
    }
    pub fn set_auto_play(&mut self, seat: Seat, auto_play: bool) {
        self.participants[seat].auto_play = auto_play;
    }
    pub fn levels(&self) -> [Rank; TEAMS] {
        self.levels
    }
    pub fn deal(&self) -> Option<&Deal> {
        self.deal.as_ref()
    }
    pub fn deal_mut(&mut self) -> Option<&mut Deal> {
        self.deal.as_mut()
    }
    /// Zero-based index of the current deal; doubles as the per-deal
    /// shuffle seed offset.
    pub fn deal_index(&self) -> usize {
        self.history.len()
    }
    pub fn history(&self) -> &[DealResult] {
        &self.history
    }
    pub fn winner(&self) -> Option<Team> {
        self.winner
    }
    pub fn status(&self) -> MatchStatus {
        self.status
    }
    pub fn started(&self) -> SystemTime {
        self.started
    }
    pub fn ended(&self) -> Option<SystemTime> {
        self.ended
    }
    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Waiting → Playing.
    pub fn begin(&mut self) -> Result<(), GameError> {
        if self.status != MatchStatus::Waiting {
            return Err(GameError::WrongPhase);
        }
        self.status = MatchStatus::Playing;
        Ok(())
    }

    /// Opens the next deal, played at the level of the team that won
    /// the previous one (level 2 on the first deal).
    pub fn start_deal(&mut self) -> Result<&mut Deal, GameError> {
        if self.status != MatchStatus::Playing {
            return Err(GameError::WrongPhase);
        }
        if self.deal.as_ref().is_some_and(|d| !d.is_finished()) {
            return Err(GameError::WrongPhase);
        }
        let prior = self.history.last().copied();
        let level = match prior {
            Some(result) => self.levels[result.winning_team],
            None => Rank::Two,
        };
        self.deal = Some(Deal::new(level, prior));
        Ok(self.deal.as_mut().expect("just set"))
    }

    /// Records the finished deal, applies level progression, and detects
    /// the match terminal: a team winning a deal while already at A.
    /// Returns the result and whether the match ended.
    pub fn conclude_deal(&mut self) -> Result<(DealResult, bool), GameError> {
        let deal = self.deal.as_ref().ok_or(GameError::WrongPhase)?;
        let result = deal.result()?;
        let team = result.winning_team;
        let at_ace = self.levels[team] == Rank::Ace;
        let raised = (u8::from(self.levels[team]) + result.upgrade).min(u8::from(Rank::Ace));
        self.levels[team] = Rank::try_from(raised)
            .map_err(GameError::InternalInvariant)?;
        self.history.push(result);
        if at_ace {
            self.status = MatchStatus::Finished;
            self.winner = Some(team);
            self.ended = Some(SystemTime::now());
            log::info!("[match] team {} wins at level A", team);
        }
        Ok((result, at_ace))
    }

    /// Ends the match without a winner (cancellation or a fatal
    /// invariant failure).
    pub fn abort(&mut self) {
        self.status = MatchStatus::Finished;
        self.ended = Some(SystemTime::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::DealStatus;
    use gd_cards::Card;

    fn named() -> [String; N] {
        ["p0", "p1", "p2", "p3"].map(String::from)
    }

    /// Runs a pre-arranged deal to completion from a play script,
    /// skipping tribute. `"pass"` passes; anything else is a card list
    /// to play.
    fn run_deal(game: &mut Match, hands: [&str; N], script: &[(Seat, &str)]) {
        let level = match game.history().last() {
            Some(result) => game.levels()[result.winning_team],
            None => Rank::Two,
        };
        let mut deal = Deal::with_hands(level, None, hands.map(|s| Card::parse(s).unwrap()));
        deal.begin_play(script[0].0).unwrap();
        deal.start_trick().unwrap();
        for &(seat, act) in script {
            let rotate = match act {
                "pass" => deal.pass(seat).unwrap(),
                cards => {
                    let out = deal.play(seat, Card::parse(cards).unwrap()).unwrap();
                    out.trick_finished && !out.deal_finished
                }
            };
            if rotate {
                deal.rotate_trick().unwrap();
                deal.start_trick().unwrap();
            }
        }
        assert!(deal.is_finished());
        game.deal = Some(deal);
    }

    /// Rankings [0, 2, 1, 3]: seat 0 goes out, the trick passes to their
    /// teammate, who empties for the double-down.
    fn double_down_script(game: &mut Match) {
        run_deal(
            game,
            ["Spade_12", "Spade_4", "Spade_11", "Spade_5"],
            &[
                (0, "Spade_12"),
                (1, "pass"),
                (2, "pass"),
                (3, "pass"),
                (2, "Spade_11"),
            ],
        );
    }

    /// Rankings [0, 1, 3, 2]: partner-last for team 0.
    fn partner_last_script(game: &mut Match) {
        run_deal(
            game,
            ["Spade_12", "Spade_7", "Spade_3 Club_4", "Spade_5 Club_8"],
            &[
                (0, "Spade_12"),
                (1, "pass"),
                (2, "pass"),
                (3, "pass"),
                (2, "Spade_3"),
                (3, "Spade_5"),
                (1, "Spade_7"),
                (2, "pass"),
                (3, "Club_8"),
            ],
        );
    }

    /// Rankings [0, 1, 2, 3]: single-last for team 0.
    fn single_last_script(game: &mut Match) {
        run_deal(
            game,
            ["Spade_12", "Spade_7", "Spade_3 Club_8", "Spade_5 Club_6"],
            &[
                (0, "Spade_12"),
                (1, "pass"),
                (2, "pass"),
                (3, "pass"),
                (2, "Spade_3"),
                (3, "Spade_5"),
                (1, "Spade_7"),
                (2, "Club_8"),
            ],
        );
    }

    #[test]
    fn begins_at_level_two() {
        let game = Match::new(named());
        assert_eq!(game.levels(), [Rank::Two, Rank::Two]);
        assert_eq!(game.status(), MatchStatus::Waiting);
    }

    #[test]
    fn first_deal_plays_at_two() {
        let mut game = Match::new(named());
        game.begin().unwrap();
        let deal = game.start_deal().unwrap();
        assert_eq!(deal.level(), Rank::Two);
        assert_eq!(deal.status(), DealStatus::Waiting);
    }

    #[test]
    fn double_down_upgrades_by_three() {
        let mut game = Match::new(named());
        game.begin().unwrap();
        double_down_script(&mut game);
        let (result, over) = game.conclude_deal().unwrap();
        assert_eq!(result.rankings, [0, 2, 1, 3]);
        assert_eq!(result.upgrade, 3);
        assert!(!over);
        assert_eq!(game.levels(), [Rank::Five, Rank::Two]);
    }

    #[test]
    fn level_caps_at_ace_and_wins_from_ace() {
        let mut game = Match::new(named());
        game.begin().unwrap();
        game.levels[0] = Rank::King;
        // partner-last: +1 takes team 0 to A, match continues
        partner_last_script(&mut game);
        let (result, over) = game.conclude_deal().unwrap();
        assert_eq!(result.upgrade, 1);
        assert!(!over);
        assert_eq!(game.levels()[0], Rank::Ace);
        // winning again while at A ends the match, cap holding at A
        single_last_script(&mut game);
        let (_, over) = game.conclude_deal().unwrap();
        assert!(over);
        assert_eq!(game.status(), MatchStatus::Finished);
        assert_eq!(game.winner(), Some(0));
        assert_eq!(game.levels()[0], Rank::Ace);
    }

    #[test]
    fn next_deal_level_follows_the_winner() {
        let mut game = Match::new(named());
        game.begin().unwrap();
        // rankings [1, 0, 3, 2]: single-last for team 1
        run_deal(
            &mut game,
            ["Spade_5 Club_6", "Spade_12", "Spade_9", "Spade_3 Club_8"],
            &[
                (1, "Spade_12"),
                (2, "pass"),
                (3, "pass"),
                (0, "pass"),
                (3, "Spade_3"),
                (0, "Spade_5"),
                (2, "pass"),
                (3, "pass"),
                (0, "Club_6"),
                (2, "pass"),
                (3, "Club_8"),
            ],
        );
        let (result, _) = game.conclude_deal().unwrap();
        assert_eq!(result.rankings, [1, 0, 3, 2]);
        // team 1 won single-last: the next deal plays to their new level
        let deal = game.start_deal().unwrap();
        let deal_level = deal.level();
        assert_eq!(deal_level, game.levels()[1]);
        assert_eq!(u8::from(deal_level), 4);
    }
}
