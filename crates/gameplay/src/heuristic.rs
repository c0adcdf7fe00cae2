//! Autoplay strategy.
//!
//! One pure capability with three entry points — play, tribute pick,
//! tribute return — used whenever a seat forfeits control. Preference
//! order for a follow: the smallest same-tag beat, then the smallest
//! bomb, never the joker bomb unless a bomb is on the table. On lead,
//! the smallest single. The strategy may evolve without touching core
//! correctness: every produced move is re-verified against the rules
//! before it leaves this module.
use super::action::Action;
use gd_cards::Card;
use gd_cards::Combo;
use gd_cards::Rank;
use gd_cards::Suit;
use std::collections::BTreeMap;

/// A legal move for the seat holding `hand` against the current lead.
pub fn select_play(hand: &[Card], lead: Option<&Combo>, level: Rank) -> Action {
    let Some(lead) = lead else {
        return smallest_single(hand, level)
            .map(Action::Play)
            .unwrap_or(Action::Pass);
    };
    let groups = Groups::of(hand, level);
    let candidate = if lead.is_bomb() {
        smallest_bomb(&groups, Some(lead), level, true)
    } else {
        beat_same_tag(&groups, lead, level)
            .or_else(|| smallest_bomb(&groups, Some(lead), level, false))
    };
    candidate
        .and_then(|cards| verified(cards, Some(lead), level))
        .map(Action::Play)
        .unwrap_or(Action::Pass)
}

/// Pool pick: the largest card on offer.
pub fn select_tribute(pool: &[Card], level: Rank) -> Option<Card> {
    pool.iter()
        .max_by_key(|c| (c.power(level), c.suit().priority()))
        .copied()
}

/// Return card: the smallest non-wildcard in hand.
pub fn select_return(hand: &[Card], level: Rank) -> Option<Card> {
    hand.iter()
        .filter(|c| !c.is_wildcard(level))
        .min_by_key(|c| (c.power(level), c.suit().priority()))
        .or_else(|| hand.iter().min_by_key(|c| (c.power(level), c.suit().priority())))
        .copied()
}

/// The weakest single card, used for leads and timeout defaults.
pub fn smallest_single(hand: &[Card], level: Rank) -> Option<Vec<Card>> {
    hand.iter()
        .min_by_key(|c| (c.power(level), c.suit().priority()))
        .map(|c| vec![*c])
}

/// Hand split into naturals by sequence number, jokers, and wildcards.
struct Groups {
    naturals: BTreeMap<u8, Vec<Card>>,
    small_jokers: Vec<Card>,
    big_jokers: Vec<Card>,
    wilds: Vec<Card>,
    level: Rank,
}

impl Groups {
    fn of(hand: &[Card], level: Rank) -> Self {
        let mut groups = Self {
            naturals: BTreeMap::new(),
            small_jokers: Vec::new(),
            big_jokers: Vec::new(),
            wilds: Vec::new(),
            level,
        };
        for &card in hand {
            if card.is_wildcard(level) {
                groups.wilds.push(card);
            } else {
                match card.rank() {
                    Rank::SmallJoker => groups.small_jokers.push(card),
                    Rank::BigJoker => groups.big_jokers.push(card),
                    rank => groups
                        .naturals
                        .entry(rank.natural().expect("non-joker"))
                        .or_default()
                        .push(card),
                }
            }
        }
        groups
    }
    fn power(&self, number: u8) -> u8 {
        if number == self.level as u8 { 15 } else { number }
    }
    /// Natural numbers held, weakest power first.
    fn numbers(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = self.naturals.keys().copied().collect();
        numbers.sort_by_key(|&n| self.power(n));
        numbers
    }
}

fn beat_same_tag(groups: &Groups, lead: &Combo, level: Rank) -> Option<Vec<Card>> {
    match *lead {
        Combo::Single { rank } => single_above(groups, rank, level),
        Combo::Pair { rank } => set_above(groups, 2, rank),
        Combo::Triple { rank } => set_above(groups, 3, rank),
        Combo::FullHouse { triple } => full_house_above(groups, triple),
        Combo::Straight { high } => run_above(groups, high, 5, 1),
        Combo::Tube { high } => run_above(groups, high, 3, 2),
        Combo::Plate { high } => run_above(groups, high, 2, 3),
        // bombs are beaten by bombs only
        _ => None,
    }
}

fn single_above(groups: &Groups, floor: u8, level: Rank) -> Option<Vec<Card>> {
    let mut options: Vec<&Card> = groups
        .naturals
        .values()
        .flatten()
        .chain(groups.wilds.iter())
        .chain(groups.small_jokers.iter())
        .chain(groups.big_jokers.iter())
        .filter(|c| c.power(level) > floor)
        .collect();
    options.sort_by_key(|c| (c.power(level), c.is_wildcard(level), c.suit().priority()));
    options.first().map(|&&c| vec![c])
}

/// Smallest pair or triple above the floor; wildcards fill shortfalls,
/// identical jokers may pair.
fn set_above(groups: &Groups, need: usize, floor: u8) -> Option<Vec<Card>> {
    let mut options: Vec<(u8, usize, Vec<Card>)> = Vec::new();
    for &number in &groups.numbers() {
        let power = groups.power(number);
        if power <= floor {
            continue;
        }
        let cards = &groups.naturals[&number];
        if cards.len() >= need {
            options.push((power, 0, cards[..need].to_vec()));
        } else if cards.len() + groups.wilds.len() >= need {
            let shortfall = need - cards.len();
            let mut set = cards.clone();
            set.extend_from_slice(&groups.wilds[..shortfall]);
            options.push((power, shortfall, set));
        }
    }
    if need == 2 {
        if groups.small_jokers.len() >= 2 && 16 > floor {
            options.push((16, 0, groups.small_jokers[..2].to_vec()));
        }
        if groups.big_jokers.len() >= 2 && 17 > floor {
            options.push((17, 0, groups.big_jokers[..2].to_vec()));
        }
    }
    options
        .into_iter()
        .min_by_key(|(power, wilds, _)| (*power, *wilds))
        .map(|(_, _, cards)| cards)
}

/// Smallest full house whose triple beats the floor.
fn full_house_above(groups: &Groups, floor: u8) -> Option<Vec<Card>> {
    for &t in &groups.numbers() {
        let power = groups.power(t);
        if power <= floor {
            continue;
        }
        let cards = &groups.naturals[&t];
        let take = cards.len().min(3);
        let shortfall = 3 - take;
        if shortfall > groups.wilds.len() {
            continue;
        }
        let spare_wilds = groups.wilds.len() - shortfall;
        let mut pairs: Vec<(usize, u8, Vec<Card>)> = Vec::new();
        for &p in &groups.numbers() {
            if p == t {
                continue;
            }
            let pcards = &groups.naturals[&p];
            if pcards.len() >= 2 {
                pairs.push((0, groups.power(p), pcards[..2].to_vec()));
            } else if pcards.len() == 1 && spare_wilds >= 1 {
                let mut set = pcards.clone();
                set.push(groups.wilds[shortfall]);
                pairs.push((1, groups.power(p), set));
            }
        }
        if groups.small_jokers.len() >= 2 {
            pairs.push((0, 16, groups.small_jokers[..2].to_vec()));
        }
        if groups.big_jokers.len() >= 2 {
            pairs.push((0, 17, groups.big_jokers[..2].to_vec()));
        }
        if let Some((_, _, pair)) = pairs.into_iter().min_by_key(|(w, p, _)| (*w, *p)) {
            let mut set = cards[..take].to_vec();
            set.extend_from_slice(&groups.wilds[..shortfall]);
            set.extend(pair);
            return Some(set);
        }
    }
    None
}

/// Smallest same-length run above the floor (straights, tubes, plates).
fn run_above(groups: &Groups, floor: u8, len: u8, need: usize) -> Option<Vec<Card>> {
    for high in (floor + 1)..=14 {
        if high < len {
            continue;
        }
        if let Some(cards) = fill_run(groups, high, len, need, None) {
            return Some(cards);
        }
    }
    None
}

/// Assembles a run topping at `high`, taking `need` copies per number
/// and filling shortfalls with wildcards. With a suit the run becomes a
/// straight-flush candidate; without one, picks lean on mixed suits so
/// a plain straight is not accidentally promoted.
fn fill_run(groups: &Groups, high: u8, len: u8, need: usize, suit: Option<Suit>) -> Option<Vec<Card>> {
    let lo = high - len + 1;
    let mut set: Vec<Card> = Vec::with_capacity(len as usize * need);
    let mut wilds_needed = 0usize;
    for x in lo..=high {
        let number = if x == 1 { 14 } else { x };
        let empty = Vec::new();
        let pool = groups.naturals.get(&number).unwrap_or(&empty);
        let mut avail: Vec<Card> = match suit {
            Some(s) => pool.iter().filter(|c| c.suit() == s).copied().collect(),
            None => pool.clone(),
        };
        if suit.is_none() {
            // break suit uniformity when an alternative exists
            if let Some(first) = set.first().map(|c| c.suit()) {
                avail.sort_by_key(|c| c.suit() == first);
            }
        }
        let take = avail.len().min(need);
        set.extend_from_slice(&avail[..take]);
        wilds_needed += need - take;
    }
    if wilds_needed > groups.wilds.len() {
        return None;
    }
    set.extend_from_slice(&groups.wilds[..wilds_needed]);
    Some(set)
}

/// Smallest bomb that beats the lead, walking the bomb ladder upward.
/// The joker bomb is reserved for beating other bombs.
fn smallest_bomb(
    groups: &Groups,
    lead: Option<&Combo>,
    level: Rank,
    allow_joker: bool,
) -> Option<Vec<Card>> {
    let wilds = groups.wilds.len();
    let largest = groups
        .naturals
        .values()
        .map(|v| v.len())
        .max()
        .unwrap_or(0);
    for size in 4..=(largest + wilds).max(4) {
        for &number in &groups.numbers() {
            let cards = &groups.naturals[&number];
            if cards.is_empty() || cards.len() + wilds < size {
                continue;
            }
            let combo = Combo::NaiveBomb {
                rank: groups.power(number),
                size: size as u8,
            };
            if combo.beats(lead) {
                let take = cards.len().min(size);
                let mut set = cards[..take].to_vec();
                set.extend_from_slice(&groups.wilds[..size - take]);
                return Some(set);
            }
        }
    }
    for high in 5..=14 {
        if !(Combo::StraightFlush { high }).beats(lead) {
            continue;
        }
        for s in Suit::all() {
            if let Some(cards) = fill_run(groups, high, 5, 1, Some(s)) {
                if Combo::identify(&cards, level) == Some(Combo::StraightFlush { high }) {
                    return Some(cards);
                }
            }
        }
    }
    if allow_joker
        && groups.small_jokers.len() >= 2
        && groups.big_jokers.len() >= 2
        && Combo::JokerBomb.beats(lead)
    {
        let mut set = groups.small_jokers[..2].to_vec();
        set.extend_from_slice(&groups.big_jokers[..2]);
        return Some(set);
    }
    None
}

/// Last line of defense: the move must recognize and beat the lead.
fn verified(cards: Vec<Card>, lead: Option<&Combo>, level: Rank) -> Option<Vec<Card>> {
    match Combo::identify(&cards, level) {
        Some(combo) if combo.beats(lead) => Some(cards),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: Rank = Rank::Five;

    fn hand(s: &str) -> Vec<Card> {
        Card::parse(s).unwrap()
    }
    fn lead(s: &str) -> Combo {
        Combo::identify(&hand(s), LEVEL).unwrap()
    }

    #[test]
    fn leads_with_smallest_single() {
        let h = hand("Spade_13 Club_3 Joker_16 Heart_9");
        match select_play(&h, None, LEVEL) {
            Action::Play(cards) => assert_eq!(cards, hand("Club_3")),
            Action::Pass => panic!("must lead"),
        }
    }

    #[test]
    fn follows_single_with_smallest_beat() {
        let h = hand("Spade_13 Club_3 Club_9");
        let lead = lead("Diamond_7");
        match select_play(&h, Some(&lead), LEVEL) {
            Action::Play(cards) => assert_eq!(cards, hand("Club_9")),
            Action::Pass => panic!("has a beat"),
        }
    }

    #[test]
    fn follows_pair_with_wildcard_completion() {
        let h = hand("Spade_13 Heart_5 Club_3");
        let lead = lead("Spade_9 Club_9");
        match select_play(&h, Some(&lead), LEVEL) {
            Action::Play(cards) => {
                let combo = Combo::identify(&cards, LEVEL).unwrap();
                assert_eq!(combo, Combo::Pair { rank: 13 });
            }
            Action::Pass => panic!("wildcard completes the king pair"),
        }
    }

    #[test]
    fn passes_without_a_beat() {
        let h = hand("Spade_3 Club_4 Diamond_6");
        let lead = lead("Spade_13 Club_13");
        assert_eq!(select_play(&h, Some(&lead), LEVEL), Action::Pass);
    }

    #[test]
    fn bombs_only_when_no_same_tag_beat() {
        let h = hand("Spade_7 Club_7 Diamond_7 Heart_7 Spade_13 Club_13");
        let lead = lead("Spade_12 Club_12");
        // the king pair is preferred over the bomb
        match select_play(&h, Some(&lead), LEVEL) {
            Action::Play(cards) => assert_eq!(cards.len(), 2),
            Action::Pass => panic!("has beats"),
        }
        // without the pair, the bomb comes out
        let h = hand("Spade_7 Club_7 Diamond_7 Heart_7 Spade_3");
        match select_play(&h, Some(&lead), LEVEL) {
            Action::Play(cards) => {
                assert!(Combo::identify(&cards, LEVEL).unwrap().is_bomb())
            }
            Action::Pass => panic!("has a bomb"),
        }
    }

    #[test]
    fn joker_bomb_held_back_for_bombs() {
        let h = hand("Joker_15 Joker_15 Joker_16 Joker_16 Spade_3");
        let pair = lead("Spade_13 Club_13");
        assert_eq!(select_play(&h, Some(&pair), LEVEL), Action::Pass);
        let bomb = lead("Spade_7 Club_7 Diamond_7 Heart_7");
        match select_play(&h, Some(&bomb), LEVEL) {
            Action::Play(cards) => {
                assert_eq!(Combo::identify(&cards, LEVEL), Some(Combo::JokerBomb))
            }
            Action::Pass => panic!("joker bomb answers a bomb"),
        }
    }

    #[test]
    fn beats_a_bomb_with_a_bigger_bomb() {
        let h = hand("Spade_9 Club_9 Diamond_9 Heart_9 Spade_9");
        let bomb = lead("Spade_7 Club_7 Diamond_7 Heart_7 Club_7");
        match select_play(&h, Some(&bomb), LEVEL) {
            Action::Play(cards) => assert_eq!(cards.len(), 5),
            Action::Pass => panic!("has a bigger bomb"),
        }
    }

    #[test]
    fn follows_straight_with_higher_straight() {
        let h = hand("Spade_4 Club_5 Diamond_6 Spade_7 Club_8 Diamond_13");
        let lead = lead("Spade_3 Club_4 Diamond_5 Spade_6 Club_7");
        match select_play(&h, Some(&lead), LEVEL) {
            Action::Play(cards) => {
                assert_eq!(
                    Combo::identify(&cards, LEVEL),
                    Some(Combo::Straight { high: 8 })
                );
            }
            Action::Pass => panic!("has a higher straight"),
        }
    }

    #[test]
    fn tribute_pick_is_largest() {
        let pool = hand("Spade_9 Diamond_13");
        assert_eq!(
            select_tribute(&pool, LEVEL),
            Some(Card::try_from("Diamond_13").unwrap())
        );
    }

    #[test]
    fn tribute_return_is_smallest_non_wildcard() {
        let h = hand("Heart_5 Spade_9 Club_12");
        assert_eq!(
            select_return(&h, LEVEL),
            Some(Card::try_from("Spade_9").unwrap())
        );
    }
}
