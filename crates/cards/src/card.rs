use super::rank::Rank;
use super::suit::Suit;

/// A playing card from the 108-card double deck.
///
/// Cards are immutable value objects; two copies of every card exist.
/// Identity on the wire is the ASCII string `Color_Number`, e.g.
/// `Heart_5` or `Joker_16` (big joker). Parsing round-trips:
/// `Card::try_from(card.id()).unwrap() == card`.
///
/// # Level awareness
///
/// A card has no fixed strength: [`Card::power`] derives the comparison
/// key for the current deal level, and [`Card::is_wildcard`] tests for
/// the Heart card of the level, which substitutes for any non-joker card
/// when forming combinations.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub struct Card {
    rank: Rank,
    suit: Suit,
}

impl Card {
    pub fn rank(&self) -> Rank {
        self.rank
    }
    pub fn suit(&self) -> Suit {
        self.suit
    }
    /// Stable wire identity, `Color_Number`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.suit, u8::from(self.rank))
    }
    /// True for the Heart card of the current level.
    pub fn is_wildcard(&self, level: Rank) -> bool {
        self.suit == Suit::Heart && self.rank == level
    }
    pub fn is_joker(&self) -> bool {
        self.rank.is_joker()
    }
    /// Level-aware comparison key; see [`Rank::power`].
    pub fn power(&self, level: Rank) -> u8 {
        self.rank.power(level)
    }
    /// Canonical hand-ordering key: power descending, then suit priority
    /// Heart > Diamond > Club > Spade within equal rank.
    pub fn sort_key(&self, level: Rank) -> (u8, u8) {
        (self.power(level), self.suit.priority())
    }
}

/// (Rank, Suit) isomorphism
impl From<(Rank, Suit)> for Card {
    fn from((rank, suit): (Rank, Suit)) -> Self {
        Self { rank, suit }
    }
}

/// str isomorphism over the `Color_Number` wire form
impl TryFrom<&str> for Card {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let (color, number) = s
            .trim()
            .split_once('_')
            .ok_or_else(|| format!("malformed card id: {}", s))?;
        let suit = Suit::try_from(color)?;
        let rank = number
            .parse::<u8>()
            .map_err(|_| format!("malformed card number: {}", s))
            .and_then(Rank::try_from)?;
        match (suit, rank.is_joker()) {
            (Suit::Joker, true) | (Suit::Spade, false) | (Suit::Heart, false)
            | (Suit::Club, false) | (Suit::Diamond, false) => Ok(Self { rank, suit }),
            _ => Err(format!("suit and number disagree: {}", s)),
        }
    }
}

impl Card {
    /// Parses a whitespace-separated list of card ids.
    ///
    /// Returns an error if any id fails to parse.
    pub fn parse(s: &str) -> Result<Vec<Self>, String> {
        s.split_whitespace()
            .map(Self::try_from)
            .collect::<Result<Vec<Self>, _>>()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.suit {
            Suit::Joker => write!(f, "{}", self.rank),
            suit => write!(f, "{}{}", suit.ascii(), self.rank),
        }
    }
}

impl gd_core::Arbitrary for Card {
    fn random() -> Self {
        use super::deck::Deck;
        let i = rand::random_range(0..gd_core::DECK);
        Deck::new().into_cards()[i]
    }
}
