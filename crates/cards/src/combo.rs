use super::card::Card;
use super::rank::Rank;
use super::suit::Suit;
use std::collections::BTreeMap;

/// A typed card combination.
///
/// Variants carry only their defining rank: non-sequence ranks are
/// level-aware power keys (2..=17, level floating at 15), sequence highs
/// are natural positions (2..=14, with ace-low runs topping at their
/// highest natural card). The concrete card set stays with the play that
/// produced the combination.
///
/// Recognition ([`Combo::identify`]) substitutes wildcards (Heart cards
/// of the level) for any non-joker card, never for a joker, and inside a
/// straight flush the wildcard assumes the suit the run requires.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Combo {
    Single { rank: u8 },
    Pair { rank: u8 },
    Triple { rank: u8 },
    FullHouse { triple: u8 },
    Straight { high: u8 },
    Tube { high: u8 },
    Plate { high: u8 },
    NaiveBomb { rank: u8, size: u8 },
    StraightFlush { high: u8 },
    JokerBomb,
}

impl Combo {
    /// Classifies a card multiset as its best-typed combination.
    ///
    /// Types are attempted from the highest tier down; within a tier the
    /// highest defining rank wins. Returns None when nothing fits.
    pub fn identify(cards: &[Card], level: Rank) -> Option<Combo> {
        let n = cards.len();
        if n == 0 {
            return None;
        }
        let wilds = cards.iter().filter(|c| c.is_wildcard(level)).count();
        let naturals: Vec<Card> = cards
            .iter()
            .filter(|c| !c.is_wildcard(level))
            .cloned()
            .collect();
        let jokers = naturals.iter().filter(|c| c.is_joker()).count();
        if n == 4 && jokers == 4 {
            let smalls = naturals.iter().filter(|c| c.rank() == Rank::SmallJoker).count();
            return (smalls == 2).then_some(Combo::JokerBomb);
        }
        if n >= 4 && jokers == 0 {
            if let Some(rank) = same_number(&naturals) {
                return Some(Combo::NaiveBomb {
                    rank: rank.power(level),
                    size: n as u8,
                });
            }
        }
        match n {
            1 => Some(Combo::Single {
                rank: cards[0].power(level),
            }),
            2 => of_a_kind(&naturals, wilds, 2, level).map(|rank| Combo::Pair { rank }),
            3 => of_a_kind(&naturals, wilds, 3, level).map(|rank| Combo::Triple { rank }),
            5 => {
                if one_suit(&naturals) {
                    if let Some(high) = best_run(&naturals, wilds, 5, 1) {
                        return Some(Combo::StraightFlush { high });
                    }
                }
                if let Some(triple) = full_house(&naturals, wilds, level) {
                    return Some(Combo::FullHouse { triple });
                }
                best_run(&naturals, wilds, 5, 1).map(|high| Combo::Straight { high })
            }
            6 => {
                if let Some(high) = best_run(&naturals, wilds, 2, 3) {
                    return Some(Combo::Plate { high });
                }
                best_run(&naturals, wilds, 3, 2).map(|high| Combo::Tube { high })
            }
            _ => None,
        }
    }

    /// Number of cards this combination is made of.
    pub fn size(&self) -> usize {
        match self {
            Combo::Single { .. } => 1,
            Combo::Pair { .. } => 2,
            Combo::Triple { .. } => 3,
            Combo::JokerBomb => 4,
            Combo::FullHouse { .. } | Combo::Straight { .. } | Combo::StraightFlush { .. } => 5,
            Combo::Tube { .. } | Combo::Plate { .. } => 6,
            Combo::NaiveBomb { size, .. } => *size as usize,
        }
    }
    /// The defining rank used for same-tag comparison.
    pub fn rank(&self) -> u8 {
        match self {
            Combo::Single { rank }
            | Combo::Pair { rank }
            | Combo::Triple { rank }
            | Combo::NaiveBomb { rank, .. } => *rank,
            Combo::FullHouse { triple } => *triple,
            Combo::Straight { high } | Combo::Tube { high } | Combo::Plate { high } => *high,
            Combo::StraightFlush { high } => *high,
            Combo::JokerBomb => 18,
        }
    }
    pub fn is_bomb(&self) -> bool {
        matches!(
            self,
            Combo::NaiveBomb { .. } | Combo::StraightFlush { .. } | Combo::JokerBomb
        )
    }
    /// Total order over bombs: joker bomb over any straight flush over
    /// any naive bomb; naive bombs by size, then rank.
    fn bomb_key(&self) -> (u8, u8, u8) {
        match self {
            Combo::JokerBomb => (3, 0, 0),
            Combo::StraightFlush { high } => (2, 0, *high),
            Combo::NaiveBomb { rank, size } => (1, *size, *rank),
            _ => (0, 0, 0),
        }
    }

    /// True when this combination legally beats the lead.
    ///
    /// A nil lead is beaten by any valid combination. Otherwise: same
    /// tag and higher rank, any bomb over any non-bomb, or a strictly
    /// stronger bomb over a bomb.
    pub fn beats(&self, lead: Option<&Combo>) -> bool {
        let Some(lead) = lead else { return true };
        match (self.is_bomb(), lead.is_bomb()) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => self.bomb_key() > lead.bomb_key(),
            (false, false) => {
                std::mem::discriminant(self) == std::mem::discriminant(lead)
                    && self.rank() > lead.rank()
            }
        }
    }
}

/// All cards share one number; jokers qualify only among themselves.
fn same_number(naturals: &[Card]) -> Option<Rank> {
    let first = naturals.first()?.rank();
    naturals
        .iter()
        .all(|c| c.rank() == first)
        .then_some(first)
}

/// N-of-a-kind completion: naturals of one number plus wildcards.
/// Wildcards never complete a joker rank; an all-wildcard set counts as
/// the level number itself.
fn of_a_kind(naturals: &[Card], wilds: usize, need: usize, level: Rank) -> Option<u8> {
    if naturals.len() + wilds != need {
        return None;
    }
    match same_number(naturals) {
        None if naturals.is_empty() => Some(level.power(level)),
        Some(rank) if rank.is_joker() => (wilds == 0).then(|| rank.power(level)),
        Some(rank) => Some(rank.power(level)),
        None => None,
    }
}

/// All naturals in one real suit (straight-flush precondition).
fn one_suit(naturals: &[Card]) -> bool {
    match naturals.first() {
        Some(first) => {
            first.suit() != Suit::Joker && naturals.iter().all(|c| c.suit() == first.suit())
        }
        None => false,
    }
}

/// Highest consecutive run of `len` numbers, `need` copies each, that
/// the naturals plus wildcards fill exactly. Windows are scanned from
/// the top; the ace drops to position 1 only in the ace-low window, so
/// K-A-2 wraps never fit.
fn best_run(naturals: &[Card], wilds: usize, len: u8, need: usize) -> Option<u8> {
    let top = 14 - len + 1;
    (1..=top).rev().find_map(|lo| {
        run_fits(naturals, wilds, lo, len, need).then_some(lo + len - 1)
    })
}

fn run_fits(naturals: &[Card], wilds: usize, lo: u8, len: u8, need: usize) -> bool {
    let mut slots = vec![0usize; len as usize];
    for card in naturals {
        let Some(number) = card.rank().natural() else {
            return false;
        };
        let number = if lo == 1 && number == 14 { 1 } else { number };
        if number < lo || number >= lo + len {
            return false;
        }
        slots[(number - lo) as usize] += 1;
    }
    if slots.iter().any(|&have| have > need) {
        return false;
    }
    slots.iter().map(|&have| need - have).sum::<usize>() == wilds
}

/// Best triple rank of a 3+2 split over two distinct numbers.
/// The pair may be a natural joker pair; the triple never contains
/// jokers.
fn full_house(naturals: &[Card], wilds: usize, level: Rank) -> Option<u8> {
    let mut counts: BTreeMap<Rank, usize> = BTreeMap::new();
    for card in naturals {
        *counts.entry(card.rank()).or_default() += 1;
    }
    let mut best: Option<u8> = None;
    for (&triple, &tc) in counts.iter() {
        if triple.is_joker() || tc > 3 {
            continue;
        }
        for (&pair, &pc) in counts.iter() {
            if pair == triple || pc > 2 {
                continue;
            }
            if pair.is_joker() && pc != 2 {
                continue;
            }
            let fits = tc + pc == naturals.len() && (3 - tc) + (2 - pc) == wilds;
            if fits {
                best = best.max(Some(triple.power(level)));
            }
        }
    }
    best
}

fn glyph(rank: u8) -> String {
    match rank {
        11 => "J".into(),
        12 => "Q".into(),
        13 => "K".into(),
        14 => "A".into(),
        15 => "Lv".into(),
        16 => "SJ".into(),
        17 => "BJ".into(),
        n => n.to_string(),
    }
}

impl std::fmt::Display for Combo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Combo::Single { rank } => write!(f, "Single({})", glyph(*rank)),
            Combo::Pair { rank } => write!(f, "Pair({})", glyph(*rank)),
            Combo::Triple { rank } => write!(f, "Triple({})", glyph(*rank)),
            Combo::FullHouse { triple } => write!(f, "FullHouse({})", glyph(*triple)),
            Combo::Straight { high } => write!(f, "Straight({})", glyph(*high)),
            Combo::Tube { high } => write!(f, "Tube({})", glyph(*high)),
            Combo::Plate { high } => write!(f, "Plate({})", glyph(*high)),
            Combo::NaiveBomb { rank, size } => write!(f, "Bomb{}({})", size, glyph(*rank)),
            Combo::StraightFlush { high } => write!(f, "StraightFlush({})", glyph(*high)),
            Combo::JokerBomb => write!(f, "JokerBomb"),
        }
    }
}
