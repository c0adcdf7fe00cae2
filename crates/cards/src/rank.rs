/// Card rank: 2 through Ace on the wire numbers 2..=14, jokers as 15/16.
///
/// Ranks carry no level information by themselves; the level-aware
/// comparison key lives in [`power`](Rank::power) so that C1–C3 share a
/// single promotion rule.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
    SmallJoker = 15,
    BigJoker = 16,
}

impl Rank {
    /// The thirteen standard ranks in ascending order.
    pub const fn standard() -> [Rank; 13] {
        [
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
            Rank::Ten,
            Rank::Jack,
            Rank::Queen,
            Rank::King,
            Rank::Ace,
        ]
    }
    pub const fn is_joker(&self) -> bool {
        matches!(self, Rank::SmallJoker | Rank::BigJoker)
    }
    /// Sequence position 2..=14 for straight-type runs. None for jokers.
    pub const fn natural(&self) -> Option<u8> {
        match self {
            Rank::SmallJoker | Rank::BigJoker => None,
            r => Some(*r as u8),
        }
    }
    /// Level-aware comparison key: the level rank floats just below the
    /// jokers (level → 15, small joker → 16, big joker → 17).
    pub const fn power(&self, level: Rank) -> u8 {
        match self {
            Rank::SmallJoker => 16,
            Rank::BigJoker => 17,
            r if *r as u8 == level as u8 => 15,
            r => *r as u8,
        }
    }
}

/// u8 isomorphism over wire numbers
impl From<Rank> for u8 {
    fn from(r: Rank) -> u8 {
        r as u8
    }
}
impl TryFrom<u8> for Rank {
    type Error = String;
    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            2 => Ok(Rank::Two),
            3 => Ok(Rank::Three),
            4 => Ok(Rank::Four),
            5 => Ok(Rank::Five),
            6 => Ok(Rank::Six),
            7 => Ok(Rank::Seven),
            8 => Ok(Rank::Eight),
            9 => Ok(Rank::Nine),
            10 => Ok(Rank::Ten),
            11 => Ok(Rank::Jack),
            12 => Ok(Rank::Queen),
            13 => Ok(Rank::King),
            14 => Ok(Rank::Ace),
            15 => Ok(Rank::SmallJoker),
            16 => Ok(Rank::BigJoker),
            _ => Err(format!("invalid rank number: {}", n)),
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Rank::Jack => write!(f, "J"),
            Rank::Queen => write!(f, "Q"),
            Rank::King => write!(f, "K"),
            Rank::Ace => write!(f, "A"),
            Rank::SmallJoker => write!(f, "SJ"),
            Rank::BigJoker => write!(f, "BJ"),
            r => write!(f, "{}", *r as u8),
        }
    }
}

impl gd_core::Arbitrary for Rank {
    fn random() -> Self {
        Rank::try_from(rand::random_range(2..=16u8)).expect("in range")
    }
}
