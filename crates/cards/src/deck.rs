use super::card::Card;
use super::rank::Rank;
use super::suit::Suit;
use gd_core::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// The 108-card double deck.
///
/// Two copies of each of the 52 standard cards plus two small and two
/// big jokers. Shuffling is driven by an injected seed so deals are
/// reproducible in tests and replays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck(Vec<Card>);

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// Creates the full double deck in canonical order.
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(DECK);
        for _ in 0..2 {
            for suit in Suit::all() {
                for rank in Rank::standard() {
                    cards.push(Card::from((rank, suit)));
                }
            }
            cards.push(Card::from((Rank::SmallJoker, Suit::Joker)));
            cards.push(Card::from((Rank::BigJoker, Suit::Joker)));
        }
        Self(cards)
    }
    /// Creates a deck shuffled by a seeded RNG.
    pub fn shuffled(seed: u64) -> Self {
        let mut deck = Self::new();
        let mut rng = SmallRng::seed_from_u64(seed);
        deck.0.shuffle(&mut rng);
        deck
    }
    pub fn size(&self) -> usize {
        self.0.len()
    }
    pub fn contains(&self, card: &Card) -> bool {
        self.0.contains(card)
    }
    /// Deals the deck round-robin into four 27-card hands, each sorted
    /// into canonical order for the given level.
    pub fn deal(self, level: Rank) -> [Vec<Card>; 4] {
        debug_assert!(self.0.len() == DECK);
        let mut hands: [Vec<Card>; 4] = std::array::from_fn(|_| Vec::with_capacity(HAND));
        for (i, card) in self.0.into_iter().enumerate() {
            hands[i % N].push(card);
        }
        for hand in hands.iter_mut() {
            sort_hand(hand, level);
        }
        hands
    }
    pub fn into_cards(self) -> Vec<Card> {
        self.0
    }
}

/// Sorts a hand into canonical display order: power descending, then
/// suit priority Heart > Diamond > Club > Spade; jokers first.
pub fn sort_hand(hand: &mut [Card], level: Rank) {
    hand.sort_by(|a, b| b.sort_key(level).cmp(&a.sort_key(level)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_double_deck() {
        let deck = Deck::new();
        assert_eq!(deck.size(), DECK);
        let jokers = deck
            .clone()
            .into_cards()
            .into_iter()
            .filter(|c| c.is_joker())
            .count();
        assert_eq!(jokers, 4);
    }

    #[test]
    fn every_card_twice() {
        let cards = Deck::new().into_cards();
        for card in &cards {
            assert_eq!(cards.iter().filter(|c| *c == card).count(), 2);
        }
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        assert_eq!(Deck::shuffled(1), Deck::shuffled(1));
        assert_ne!(Deck::shuffled(1), Deck::shuffled(2));
    }

    #[test]
    fn deal_conserves_cards() {
        let hands = Deck::shuffled(1).deal(Rank::Two);
        assert!(hands.iter().all(|h| h.len() == HAND));
        let mut all: Vec<Card> = hands.into_iter().flatten().collect();
        let mut full = Deck::new().into_cards();
        sort_hand(&mut all, Rank::Two);
        sort_hand(&mut full, Rank::Two);
        assert_eq!(all, full);
    }

    #[test]
    fn hands_sorted_descending() {
        let level = Rank::Seven;
        let hands = Deck::shuffled(7).deal(level);
        for hand in &hands {
            for pair in hand.windows(2) {
                assert!(pair[0].sort_key(level) >= pair[1].sort_key(level));
            }
        }
    }
}
