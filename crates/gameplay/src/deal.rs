use super::error::GameError;
use super::result::DealResult;
use super::trick::Trick;
use super::tribute::TributePhase;
use super::tribute::TributeStatus;
use super::validate;
use gd_cards::Card;
use gd_cards::Combo;
use gd_cards::Deck;
use gd_cards::Rank;
use gd_cards::Suit;
use gd_core::*;
use std::time::SystemTime;

/// Deal lifecycle. Tribute is entered only when a previous result
/// exists and skipped straight to Playing otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealStatus {
    Waiting,
    Dealing,
    Tribute,
    Playing,
    Finished,
}

/// What a validated play did to the deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOutcome {
    pub combo: Combo,
    pub seat_finished: bool,
    pub trick_finished: bool,
    pub deal_finished: bool,
}

/// One distribution and play-through of the 108-card double deck.
///
/// Owns its hands, the current trick, the trick history, and the
/// optional tribute phase. A deal finishes as soon as one team's both
/// players have emptied their hands, or when the third finisher is
/// determined.
#[derive(Debug, Clone)]
pub struct Deal {
    level: Rank,
    hands: [Vec<Card>; N],
    trick: Option<Trick>,
    history: Vec<Trick>,
    rankings: Vec<Seat>,
    status: DealStatus,
    tribute: Option<TributePhase>,
    prior: Option<DealResult>,
    started: SystemTime,
}

impl Deal {
    pub fn new(level: Rank, prior: Option<DealResult>) -> Self {
        Self {
            level,
            hands: std::array::from_fn(|_| Vec::new()),
            trick: None,
            history: Vec::new(),
            rankings: Vec::new(),
            status: DealStatus::Waiting,
            tribute: None,
            prior,
            started: SystemTime::now(),
        }
    }
    /// A deal with pre-arranged hands, as if just dealt. Used by
    /// simulations and tests that need specific card placement.
    pub fn with_hands(level: Rank, prior: Option<DealResult>, hands: [Vec<Card>; N]) -> Self {
        let mut deal = Self::new(level, prior);
        deal.hands = hands;
        deal.status = DealStatus::Dealing;
        deal
    }

    pub fn level(&self) -> Rank {
        self.level
    }
    pub fn status(&self) -> DealStatus {
        self.status
    }
    pub fn hands(&self) -> &[Vec<Card>; N] {
        &self.hands
    }
    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat]
    }
    /// Seats in finish order so far.
    pub fn rankings(&self) -> &[Seat] {
        &self.rankings
    }
    pub fn prior(&self) -> Option<&DealResult> {
        self.prior.as_ref()
    }
    pub fn trick(&self) -> Option<&Trick> {
        self.trick.as_ref()
    }
    pub fn trick_mut(&mut self) -> Option<&mut Trick> {
        self.trick.as_mut()
    }
    pub fn history(&self) -> &[Trick] {
        &self.history
    }
    pub fn tribute(&self) -> Option<&TributePhase> {
        self.tribute.as_ref()
    }
    pub fn started(&self) -> SystemTime {
        self.started
    }
    pub fn is_finished(&self) -> bool {
        self.status == DealStatus::Finished
    }

    /// Waiting → Dealing: shuffle with the injected seed and deal 27
    /// cards to each seat in dealer order.
    pub fn deal_cards(&mut self, seed: u64) -> Result<(), GameError> {
        if self.status != DealStatus::Waiting {
            return Err(GameError::WrongPhase);
        }
        self.hands = Deck::shuffled(seed).deal(self.level);
        self.status = DealStatus::Dealing;
        Ok(())
    }

    /// Dealing → Tribute, constructing the phase from the prior result
    /// and the fresh hands.
    pub fn begin_tribute(&mut self) -> Result<&TributePhase, GameError> {
        if self.status != DealStatus::Dealing {
            return Err(GameError::WrongPhase);
        }
        let prior = self.prior.as_ref().ok_or(GameError::WrongPhase)?;
        let phase = TributePhase::from_result(prior, &self.hands, self.level)?;
        self.tribute = Some(phase);
        self.status = DealStatus::Tribute;
        Ok(self.tribute.as_ref().expect("just set"))
    }
    pub fn tribute_mut(&mut self) -> Result<&mut TributePhase, GameError> {
        match (self.status, self.tribute.as_mut()) {
            (DealStatus::Tribute, Some(phase)) => Ok(phase),
            _ => Err(GameError::WrongPhase),
        }
    }
    /// Records a receiver's return card, judged against their current
    /// hand.
    pub fn give_return(&mut self, seat: Seat, card: Card) -> Result<Seat, GameError> {
        if self.status != DealStatus::Tribute {
            return Err(GameError::WrongPhase);
        }
        let phase = self.tribute.as_mut().ok_or(GameError::WrongPhase)?;
        phase.give_return(seat, card, &self.hands[seat])
    }
    /// Applies tribute transfers to the hands in one step.
    pub fn finish_tribute(&mut self) -> Result<(), GameError> {
        if self.status != DealStatus::Tribute {
            return Err(GameError::WrongPhase);
        }
        let phase = self.tribute.as_mut().ok_or(GameError::WrongPhase)?;
        phase.finish(&mut self.hands, self.level)
    }

    /// Who leads the first trick: on the first deal the lowest seat
    /// holding a Spade 2, afterwards the previous first finisher.
    pub fn first_leader(&self) -> Seat {
        match self.prior.as_ref() {
            Some(result) => result.place(1),
            None => {
                let spade_two = Card::from((Rank::Two, Suit::Spade));
                (0..N)
                    .find(|&s| self.hands[s].contains(&spade_two))
                    .unwrap_or(0)
            }
        }
    }

    /// Dealing/Tribute → Playing with the first trick waiting to start.
    pub fn begin_play(&mut self, leader: Seat) -> Result<(), GameError> {
        let ready = match self.status {
            DealStatus::Dealing => self.prior.is_none(),
            DealStatus::Tribute => self
                .tribute
                .as_ref()
                .is_some_and(|t| t.status() == TributeStatus::Finished),
            _ => false,
        };
        if !ready {
            return Err(GameError::WrongPhase);
        }
        self.trick = Some(Trick::new(leader));
        self.status = DealStatus::Playing;
        Ok(())
    }

    /// Starts the waiting trick, returning its leader.
    pub fn start_trick(&mut self) -> Result<Seat, GameError> {
        if self.status != DealStatus::Playing {
            return Err(GameError::WrongPhase);
        }
        let trick = self.trick.as_mut().ok_or(GameError::WrongPhase)?;
        trick.start()?;
        Ok(trick.leader())
    }

    /// Validates and applies a play: removes the card instances from the
    /// hand, records the play, ranks the seat if it emptied, and closes
    /// the deal when terminal.
    pub fn play(&mut self, seat: Seat, cards: Vec<Card>) -> Result<PlayOutcome, GameError> {
        if self.status != DealStatus::Playing {
            return Err(GameError::WrongPhase);
        }
        let trick = self.trick.as_mut().ok_or(GameError::WrongPhase)?;
        let combo = validate::validate_play(seat, &cards, &self.hands[seat], trick, self.level)?;
        for card in &cards {
            let i = self.hands[seat]
                .iter()
                .position(|c| c == card)
                .ok_or_else(|| GameError::NotInHand(card.id()))?;
            self.hands[seat].remove(i);
        }
        let seat_finished = self.hands[seat].is_empty();
        if seat_finished {
            self.rankings.push(seat);
            log::debug!("[deal] seat {} finished in place {}", seat, self.rankings.len());
        }
        trick.play(seat, cards, combo, &self.rankings)?;
        let trick_finished = trick.is_finished();
        let deal_finished = self.check_terminal();
        Ok(PlayOutcome {
            combo,
            seat_finished,
            trick_finished,
            deal_finished,
        })
    }

    /// Validates and applies a pass. Returns true when the trick closed.
    pub fn pass(&mut self, seat: Seat) -> Result<bool, GameError> {
        if self.status != DealStatus::Playing {
            return Err(GameError::WrongPhase);
        }
        let trick = self.trick.as_mut().ok_or(GameError::WrongPhase)?;
        validate::validate_pass(seat, trick)?;
        trick.pass(seat, &self.rankings)?;
        Ok(trick.is_finished())
    }

    /// Moves the finished trick into history and opens the next one
    /// under its crowned leader.
    pub fn rotate_trick(&mut self) -> Result<Seat, GameError> {
        if self.status != DealStatus::Playing {
            return Err(GameError::WrongPhase);
        }
        let trick = self.trick.take().ok_or(GameError::WrongPhase)?;
        if !trick.is_finished() {
            self.trick = Some(trick);
            return Err(GameError::WrongPhase);
        }
        let next = trick.next_leader().ok_or_else(|| {
            GameError::InternalInvariant("finished trick without next leader".into())
        })?;
        self.history.push(trick);
        self.trick = Some(Trick::new(next));
        Ok(next)
    }

    /// The outcome of a finished deal.
    pub fn result(&self) -> Result<DealResult, GameError> {
        if self.status != DealStatus::Finished {
            return Err(GameError::WrongPhase);
        }
        DealResult::from_rankings(&self.rankings)
    }

    /// Terminal when one team's both players emptied or three seats
    /// ranked; remaining seats complete the rankings in seat order.
    fn check_terminal(&mut self) -> bool {
        let team_out = self.rankings.len() == 2
            && team_of(self.rankings[0]) == team_of(self.rankings[1]);
        if !(team_out || self.rankings.len() >= 3) {
            return false;
        }
        for seat in 0..N {
            if !self.rankings.contains(&seat) {
                self.rankings.push(seat);
            }
        }
        if let Some(trick) = self.trick.take() {
            self.history.push(trick);
        }
        self.status = DealStatus::Finished;
        log::debug!("[deal] finished with rankings {:?}", self.rankings);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::VictoryType;

    fn singles(deal: &mut Deal, seat: Seat, id: &str) -> PlayOutcome {
        deal.play(seat, Card::parse(id).unwrap()).unwrap()
    }

    fn playing_deal(hands: [&str; 4]) -> Deal {
        let mut deal = Deal::with_hands(
            Rank::Two,
            None,
            hands.map(|s| Card::parse(s).unwrap()),
        );
        let leader = deal.first_leader();
        deal.begin_play(leader).unwrap();
        deal.start_trick().unwrap();
        deal
    }

    #[test]
    fn dealt_hands_conserve_the_deck() {
        let mut deal = Deal::new(Rank::Two, None);
        deal.deal_cards(1).unwrap();
        assert!(deal.hands().iter().all(|h| h.len() == HAND));
        let total: usize = deal.hands().iter().map(|h| h.len()).sum();
        assert_eq!(total, DECK);
    }

    #[test]
    fn spade_two_holder_leads_the_first_deal() {
        let deal = playing_deal([
            "Spade_3 Club_4",
            "Spade_2 Club_5",
            "Spade_6 Club_7",
            "Spade_9 Club_8",
        ]);
        assert_eq!(deal.trick().unwrap().leader(), 1);
    }

    #[test]
    fn plays_remove_cards_and_rank_finishers() {
        let mut deal = playing_deal([
            "Spade_2 Spade_3",
            "Spade_5 Club_5",
            "Spade_7 Club_7",
            "Spade_9 Club_9",
        ]);
        let out = singles(&mut deal, 0, "Spade_3");
        assert!(!out.seat_finished);
        assert_eq!(deal.hand(0).len(), 1);
        let out = singles(&mut deal, 1, "Spade_5");
        assert!(!out.trick_finished);
        singles(&mut deal, 2, "Spade_7");
        singles(&mut deal, 3, "Spade_9");
        // back around: seat 0 beats with nothing to spare
        let out = singles(&mut deal, 0, "Spade_2");
        assert!(out.seat_finished);
        assert_eq!(deal.rankings(), &[0]);
    }

    #[test]
    fn team_out_ends_the_deal_early() {
        let mut deal = playing_deal([
            "Spade_13",
            "Spade_5 Club_5 Diamond_5",
            "Spade_14",
            "Spade_9 Club_9 Diamond_9",
        ]);
        let out = singles(&mut deal, 0, "Spade_13");
        assert!(out.seat_finished);
        assert!(!out.deal_finished);
        deal.pass(1).unwrap();
        let out = singles(&mut deal, 2, "Spade_14");
        assert!(out.deal_finished);
        assert_eq!(deal.status(), DealStatus::Finished);
        // remaining seats complete in seat order
        assert_eq!(deal.rankings(), &[0, 2, 1, 3]);
        let result = deal.result().unwrap();
        assert_eq!(result.winning_team, 0);
    }

    #[test]
    fn third_finisher_closes_the_deal() {
        let mut deal = playing_deal([
            "Spade_3",
            "Spade_5",
            "Spade_7",
            "Spade_9 Club_9 Diamond_2",
        ]);
        singles(&mut deal, 0, "Spade_3");
        let out = singles(&mut deal, 1, "Spade_5");
        assert!(!out.deal_finished);
        // seats 0 and 1 are opposite teams, so the deal continues
        let out = singles(&mut deal, 2, "Spade_7");
        assert!(out.deal_finished);
        // the fourth place is implicit
        assert_eq!(deal.rankings(), &[0, 1, 2, 3]);
        assert_eq!(deal.result().unwrap().victory, VictoryType::SingleLast);
    }

    #[test]
    fn rotate_requires_a_finished_trick() {
        let mut deal = playing_deal([
            "Spade_3 Club_3",
            "Spade_5 Club_5",
            "Spade_7 Club_7",
            "Spade_9 Club_9",
        ]);
        assert_eq!(deal.rotate_trick(), Err(GameError::WrongPhase));
    }
}
