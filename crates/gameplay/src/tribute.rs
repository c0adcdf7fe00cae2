use super::error::GameError;
use super::result::DealResult;
use super::result::VictoryType;
use gd_cards::Card;
use gd_cards::Rank;
use gd_cards::sort_hand;
use gd_core::*;

/// Tribute sub-phases in order. Selecting occurs only for a
/// double-down pool; an immune phase finishes without leaving Waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TributeStatus {
    Waiting,
    Selecting,
    Returning,
    Finished,
}

/// Pre-play card exchange driven by the previous deal's outcome.
///
/// Contributions are deterministic (highest non-wildcard, non-joker
/// card, suit priority breaking ties). The double-down pool pick and
/// every return are player inputs. Hands mutate exactly once, when the
/// phase finishes.
#[derive(Debug, Clone)]
pub struct TributePhase {
    victory: VictoryType,
    immune: bool,
    map: Vec<(Seat, Option<Seat>)>,
    cards: Vec<(Seat, Card)>,
    pool: Vec<(Seat, Card)>,
    selecting: Option<Seat>,
    selections: Vec<(Seat, Seat, Card)>,
    returns: Vec<(Seat, Seat, Card)>,
    status: TributeStatus,
}

impl TributePhase {
    /// Builds the phase from the previous result and the freshly dealt
    /// hands. Immunity: the losing team collectively holds both big
    /// jokers (or more).
    pub fn from_result(
        result: &DealResult,
        hands: &[Vec<Card>; N],
        level: Rank,
    ) -> Result<Self, GameError> {
        let losers = seats_of(result.losing_team());
        let big_jokers = losers
            .iter()
            .flat_map(|&s| hands[s].iter())
            .filter(|c| c.rank() == Rank::BigJoker)
            .count();
        let immune = big_jokers >= 2;
        let map: Vec<(Seat, Option<Seat>)> = if immune {
            Vec::new()
        } else {
            match result.victory {
                VictoryType::DoubleDown => {
                    vec![(result.place(3), None), (result.place(4), None)]
                }
                VictoryType::SingleLast => vec![(result.place(4), Some(result.place(1)))],
                VictoryType::PartnerLast => vec![(result.place(3), Some(result.place(1)))],
            }
        };
        let mut cards = Vec::with_capacity(map.len());
        for &(payer, _) in &map {
            cards.push((payer, contribution(&hands[payer], level)?));
        }
        let pool = match result.victory {
            VictoryType::DoubleDown => cards.clone(),
            _ => Vec::new(),
        };
        Ok(Self {
            victory: result.victory,
            immune,
            map,
            cards,
            pool,
            selecting: None,
            selections: Vec::new(),
            returns: Vec::new(),
            status: TributeStatus::Waiting,
        })
    }

    pub fn victory(&self) -> VictoryType {
        self.victory
    }
    pub fn is_immune(&self) -> bool {
        self.immune
    }
    pub fn status(&self) -> TributeStatus {
        self.status
    }
    /// Payer → receiver pairs; None routes into the pool.
    pub fn map(&self) -> &[(Seat, Option<Seat>)] {
        &self.map
    }
    /// Deterministic contributions, payer by payer.
    pub fn contributions(&self) -> &[(Seat, Card)] {
        &self.cards
    }
    /// Remaining pool entries (double-down only).
    pub fn pool(&self) -> &[(Seat, Card)] {
        &self.pool
    }
    pub fn selecting(&self) -> Option<Seat> {
        self.selecting
    }
    /// Completed picks as (picker, donor, card).
    pub fn selections(&self) -> &[(Seat, Seat, Card)] {
        &self.selections
    }
    /// Completed returns as (returner, to, card).
    pub fn returns(&self) -> &[(Seat, Seat, Card)] {
        &self.returns
    }

    /// Waiting → Selecting (pool pick pending) or Returning.
    /// The first picker is the previous deal's first finisher.
    pub fn begin(&mut self, first: Seat) -> Result<TributeStatus, GameError> {
        if self.status != TributeStatus::Waiting || self.immune {
            return Err(GameError::WrongPhase);
        }
        self.status = match self.victory {
            VictoryType::DoubleDown => {
                self.selecting = Some(first);
                TributeStatus::Selecting
            }
            _ => TributeStatus::Returning,
        };
        Ok(self.status)
    }

    /// The first picker takes a pool card; their teammate takes the
    /// remainder. Returns both picks as (picker, donor, card).
    pub fn select(&mut self, seat: Seat, card: Card) -> Result<[(Seat, Seat, Card); 2], GameError> {
        if self.status != TributeStatus::Selecting {
            return Err(GameError::WrongPhase);
        }
        if self.selecting != Some(seat) {
            return Err(GameError::NotYourTurn(seat));
        }
        let i = self
            .pool
            .iter()
            .position(|(_, c)| *c == card)
            .ok_or_else(|| GameError::InvalidTributeSelection(card.id()))?;
        let (donor, picked) = self.pool.remove(i);
        let (other_donor, rest) = self.pool.remove(0);
        let picks = [
            (seat, donor, picked),
            (teammate(seat), other_donor, rest),
        ];
        self.selections.extend(picks);
        self.selecting = None;
        self.status = TributeStatus::Returning;
        Ok(picks)
    }

    /// Receivers still owing a return, as (returner, to).
    pub fn outstanding_returns(&self) -> Vec<(Seat, Seat)> {
        self.expected_returns()
            .into_iter()
            .filter(|(returner, _)| !self.returns.iter().any(|(s, _, _)| s == returner))
            .collect()
    }

    fn expected_returns(&self) -> Vec<(Seat, Seat)> {
        if self.immune {
            return Vec::new();
        }
        match self.victory {
            VictoryType::DoubleDown => self
                .selections
                .iter()
                .map(|&(picker, donor, _)| (picker, donor))
                .collect(),
            _ => self
                .map
                .iter()
                .filter_map(|&(payer, receiver)| receiver.map(|r| (r, payer)))
                .collect(),
        }
    }

    /// Records a receiver's return card. Legality is judged against the
    /// hand before any tribute transfer applies.
    pub fn give_return(
        &mut self,
        seat: Seat,
        card: Card,
        hand: &[Card],
    ) -> Result<Seat, GameError> {
        if self.status != TributeStatus::Returning {
            return Err(GameError::WrongPhase);
        }
        let (_, to) = self
            .outstanding_returns()
            .into_iter()
            .find(|&(returner, _)| returner == seat)
            .ok_or_else(|| GameError::InvalidInput(format!("no return expected from seat {}", seat)))?;
        if !hand.contains(&card) {
            return Err(GameError::InvalidTributeSelection(card.id()));
        }
        self.returns.push((seat, to, card));
        Ok(to)
    }

    /// Applies every transfer to the hands in one step and finishes the
    /// phase. Immune phases finish directly from Waiting.
    pub fn finish(&mut self, hands: &mut [Vec<Card>; N], level: Rank) -> Result<(), GameError> {
        match (self.immune, self.status) {
            (true, TributeStatus::Waiting) => {
                self.status = TributeStatus::Finished;
                return Ok(());
            }
            (false, TributeStatus::Returning) if self.outstanding_returns().is_empty() => {}
            _ => return Err(GameError::WrongPhase),
        }
        for &(payer, card) in &self.cards {
            remove_card(&mut hands[payer], card)?;
        }
        match self.victory {
            VictoryType::DoubleDown => {
                for &(picker, _, card) in &self.selections {
                    hands[picker].push(card);
                }
            }
            _ => {
                for (&(_, receiver), &(_, card)) in self.map.iter().zip(self.cards.iter()) {
                    let receiver = receiver.ok_or_else(|| {
                        GameError::InternalInvariant("pool tribute outside double-down".into())
                    })?;
                    hands[receiver].push(card);
                }
            }
        }
        for &(returner, to, card) in &self.returns {
            remove_card(&mut hands[returner], card)?;
            hands[to].push(card);
        }
        for hand in hands.iter_mut() {
            sort_hand(hand, level);
        }
        self.status = TributeStatus::Finished;
        Ok(())
    }
}

/// Highest non-wildcard, non-joker card; suit priority breaks ties.
fn contribution(hand: &[Card], level: Rank) -> Result<Card, GameError> {
    hand.iter()
        .filter(|c| !c.is_wildcard(level) && !c.is_joker())
        .max_by_key(|c| (c.power(level), c.suit().priority()))
        .copied()
        .ok_or_else(|| GameError::InternalInvariant("no tributable card in hand".into()))
}

fn remove_card(hand: &mut Vec<Card>, card: Card) -> Result<(), GameError> {
    let i = hand
        .iter()
        .position(|c| *c == card)
        .ok_or_else(|| GameError::InternalInvariant(format!("card {} left the hand", card.id())))?;
    hand.swap_remove(i);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: Rank = Rank::Two;

    fn hands(specs: [&str; 4]) -> [Vec<Card>; 4] {
        specs.map(|s| Card::parse(s).unwrap())
    }

    fn card(s: &str) -> Card {
        Card::try_from(s).unwrap()
    }

    #[test]
    fn double_down_pool_flow() {
        let result = DealResult::from_rankings(&[0, 2, 1, 3]).unwrap();
        let mut hands = hands([
            "Spade_3 Club_4",
            "Spade_14 Club_5",
            "Spade_6 Club_7",
            "Diamond_13 Club_8",
        ]);
        let mut phase = TributePhase::from_result(&result, &hands, LEVEL).unwrap();
        assert!(!phase.is_immune());
        assert_eq!(phase.pool().len(), 2);
        assert_eq!(phase.begin(0).unwrap(), TributeStatus::Selecting);
        assert_eq!(phase.selecting(), Some(0));

        // seat 0 picks the ace donated by seat 1; seat 2 takes the king
        let picks = phase.select(0, card("Spade_14")).unwrap();
        assert_eq!(picks[0], (0, 1, card("Spade_14")));
        assert_eq!(picks[1], (2, 3, card("Diamond_13")));

        // picking again is out of phase
        assert_eq!(
            phase.select(0, card("Diamond_13")),
            Err(GameError::WrongPhase)
        );

        assert_eq!(phase.outstanding_returns().len(), 2);
        phase.give_return(0, card("Spade_3"), &hands[0]).unwrap();
        phase.give_return(2, card("Spade_6"), &hands[2]).unwrap();
        phase.finish(&mut hands, LEVEL).unwrap();
        assert_eq!(phase.status(), TributeStatus::Finished);

        // seat 0: -Spade_3 +Spade_14; seat 1: -Spade_14 +Spade_3
        assert!(hands[0].contains(&card("Spade_14")));
        assert!(!hands[0].contains(&card("Spade_3")));
        assert!(hands[1].contains(&card("Spade_3")));
        assert!(!hands[1].contains(&card("Spade_14")));
        // seat 2: -Spade_6 +Diamond_13; seat 3: -Diamond_13 +Spade_6
        assert!(hands[2].contains(&card("Diamond_13")));
        assert!(hands[3].contains(&card("Spade_6")));
        assert!(hands.iter().all(|h| h.len() == 2));
    }

    #[test]
    fn pool_pick_must_come_from_pool() {
        let result = DealResult::from_rankings(&[0, 2, 1, 3]).unwrap();
        let hands = hands([
            "Spade_3 Club_4",
            "Spade_14 Club_5",
            "Spade_6 Club_7",
            "Diamond_13 Club_8",
        ]);
        let mut phase = TributePhase::from_result(&result, &hands, LEVEL).unwrap();
        phase.begin(0).unwrap();
        assert_eq!(
            phase.select(0, card("Club_5")),
            Err(GameError::InvalidTributeSelection("Club_5".into()))
        );
        assert_eq!(
            phase.select(2, card("Spade_14")),
            Err(GameError::NotYourTurn(2))
        );
    }

    #[test]
    fn single_last_tribute_and_return() {
        let result = DealResult::from_rankings(&[1, 0, 3, 2]).unwrap();
        let mut hands = hands([
            "Spade_12 Club_4",
            "Spade_3 Club_5",
            "Spade_10 Club_7",
            "Spade_6 Club_8",
        ]);
        let mut phase = TributePhase::from_result(&result, &hands, LEVEL).unwrap();
        assert_eq!(phase.map(), &[(2, Some(1))]);
        assert_eq!(phase.contributions(), &[(2, card("Spade_10"))]);
        assert_eq!(phase.begin(1).unwrap(), TributeStatus::Returning);
        assert_eq!(phase.outstanding_returns(), vec![(1, 2)]);
        phase.give_return(1, card("Spade_3"), &hands[1]).unwrap();
        phase.finish(&mut hands, LEVEL).unwrap();
        assert!(hands[1].contains(&card("Spade_10")));
        assert!(hands[2].contains(&card("Spade_3")));
        assert!(!hands[2].contains(&card("Spade_10")));
    }

    #[test]
    fn contribution_skips_wildcards_and_jokers() {
        let hand = Card::parse("Joker_16 Heart_2 Spade_13 Club_14").unwrap();
        assert_eq!(contribution(&hand, LEVEL).unwrap(), card("Club_14"));
        // the heart of the level never leaves as tribute
        let hand = Card::parse("Joker_16 Heart_2 Spade_5").unwrap();
        assert_eq!(contribution(&hand, LEVEL).unwrap(), card("Spade_5"));
    }

    #[test]
    fn contribution_ties_break_by_suit() {
        let hand = Card::parse("Spade_13 Diamond_13 Club_13").unwrap();
        assert_eq!(contribution(&hand, LEVEL).unwrap(), card("Diamond_13"));
    }

    #[test]
    fn immunity_with_split_big_jokers() {
        let result = DealResult::from_rankings(&[0, 2, 1, 3]).unwrap();
        let hands = hands([
            "Spade_3 Club_4",
            "Joker_16 Club_5",
            "Spade_6 Club_7",
            "Joker_16 Club_8",
        ]);
        let phase = TributePhase::from_result(&result, &hands, LEVEL).unwrap();
        assert!(phase.is_immune());
        assert!(phase.map().is_empty());
        assert!(phase.contributions().is_empty());
    }

    #[test]
    fn immune_phase_finishes_without_transfers() {
        let result = DealResult::from_rankings(&[0, 2, 1, 3]).unwrap();
        let mut hands = hands([
            "Spade_3 Club_4",
            "Joker_16 Joker_16",
            "Spade_6 Club_7",
            "Spade_9 Club_8",
        ]);
        let before = hands.clone();
        let mut phase = TributePhase::from_result(&result, &hands, LEVEL).unwrap();
        assert_eq!(phase.begin(0), Err(GameError::WrongPhase));
        phase.finish(&mut hands, LEVEL).unwrap();
        assert_eq!(hands, before);
    }

    #[test]
    fn return_card_must_be_in_hand() {
        let result = DealResult::from_rankings(&[1, 0, 3, 2]).unwrap();
        let hands = hands([
            "Spade_12 Club_4",
            "Spade_3 Club_5",
            "Spade_10 Club_7",
            "Spade_6 Club_8",
        ]);
        let mut phase = TributePhase::from_result(&result, &hands, LEVEL).unwrap();
        phase.begin(1).unwrap();
        assert_eq!(
            phase.give_return(1, card("Spade_10"), &hands[1]),
            Err(GameError::InvalidTributeSelection("Spade_10".into()))
        );
        assert!(matches!(
            phase.give_return(0, card("Spade_12"), &hands[0]),
            Err(GameError::InvalidInput(_))
        ));
    }
}
