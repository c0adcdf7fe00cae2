//! Core type aliases, traits, and constants for the guandan workspace.
//!
//! This crate provides the foundational types and table parameters used
//! throughout the guandan workspace.
#![allow(dead_code)]

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Seat index around the table, 0..4 clockwise.
pub type Seat = usize;
/// Team index: team 0 holds seats {0, 2}, team 1 holds seats {1, 3}.
pub type Team = usize;

// ============================================================================
// TABLE PARAMETERS
// ============================================================================
/// Number of players at the table.
pub const N: usize = 4;
/// Number of partnerships.
pub const TEAMS: usize = 2;
/// Two full 54-card decks.
pub const DECK: usize = 108;
/// Cards dealt to each seat.
pub const HAND: usize = DECK / N;

/// Seconds a player has to submit a play decision.
pub const PLAY_TIMEOUT: u64 = 20;
/// Seconds a player has to pick from the tribute pool.
pub const TRIBUTE_TIMEOUT: u64 = 3;
/// Seconds a player has to choose a return card.
pub const RETURN_TIMEOUT: u64 = 3;
/// Consecutive timeouts before a seat is switched to autoplay.
pub const AUTOPLAY_STRIKES: u32 = 2;

/// The seat's partner across the table.
pub const fn teammate(seat: Seat) -> Seat {
    (seat + 2) % N
}
/// The next seat clockwise.
pub const fn clockwise(seat: Seat) -> Seat {
    (seat + 1) % N
}
/// The partnership a seat belongs to.
pub const fn team_of(seat: Seat) -> Team {
    seat % TEAMS
}
/// Both seats of a partnership.
pub const fn seats_of(team: Team) -> [Seat; 2] {
    [team, team + 2]
}

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast ID<T> to ID<U> while preserving the underlying UUID.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_arithmetic() {
        assert_eq!(teammate(0), 2);
        assert_eq!(teammate(3), 1);
        assert_eq!(clockwise(3), 0);
        assert_eq!(team_of(0), team_of(2));
        assert_eq!(team_of(1), team_of(3));
        assert_ne!(team_of(0), team_of(1));
    }

    #[test]
    fn deck_splits_evenly() {
        assert_eq!(HAND * N, DECK);
    }

    #[test]
    fn ids_are_unique() {
        struct Marker;
        let a = ID::<Marker>::default();
        let b = ID::<Marker>::default();
        assert_ne!(a, b);
        assert_eq!(a, a.cast::<u8>().cast::<Marker>());
    }
}
