/// Card color: the four French suits plus the joker color.
///
/// Suits never affect combination strength except inside a straight
/// flush. The ordering Heart > Diamond > Club > Spade is the display and
/// tribute tie-break priority; jokers sit outside the suit order.
#[derive(Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Suit {
    #[default]
    Spade = 0,
    Club = 1,
    Diamond = 2,
    Heart = 3,
    Joker = 4,
}

impl Suit {
    /// The four real suits in ascending priority order.
    pub const fn all() -> [Suit; 4] {
        [Suit::Spade, Suit::Club, Suit::Diamond, Suit::Heart]
    }
    /// Tie-break priority: Heart > Diamond > Club > Spade.
    pub const fn priority(&self) -> u8 {
        *self as u8
    }
    /// Unicode suit symbol for display.
    pub fn ascii(&self) -> char {
        match self {
            Suit::Spade => '♠',
            Suit::Club => '♣',
            Suit::Diamond => '♦',
            Suit::Heart => '♥',
            Suit::Joker => '☆',
        }
    }
}

/// u8 isomorphism
impl From<u8> for Suit {
    fn from(n: u8) -> Suit {
        match n {
            0 => Suit::Spade,
            1 => Suit::Club,
            2 => Suit::Diamond,
            3 => Suit::Heart,
            4 => Suit::Joker,
            _ => unreachable!("invalid suit"),
        }
    }
}
impl From<Suit> for u8 {
    fn from(s: Suit) -> u8 {
        s as u8
    }
}

/// str isomorphism over wire color names
impl TryFrom<&str> for Suit {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "spade" => Ok(Suit::Spade),
            "club" => Ok(Suit::Club),
            "diamond" => Ok(Suit::Diamond),
            "heart" => Ok(Suit::Heart),
            "joker" => Ok(Suit::Joker),
            _ => Err(format!("invalid suit str: {}", s)),
        }
    }
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Suit::Spade => write!(f, "Spade"),
            Suit::Club => write!(f, "Club"),
            Suit::Diamond => write!(f, "Diamond"),
            Suit::Heart => write!(f, "Heart"),
            Suit::Joker => write!(f, "Joker"),
        }
    }
}
