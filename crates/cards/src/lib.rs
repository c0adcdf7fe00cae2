//! Card primitives for guandan played with two standard 54-card decks.
//!
//! ## Types
//!
//! - [`Suit`] — The four French suits plus the joker color
//! - [`Rank`] — 2 through Ace plus the two jokers
//! - [`Card`] — A concrete card with `Color_Number` wire identity
//! - [`Deck`] — The 108-card double deck with seeded shuffling
//! - [`Combo`] — Typed card combinations with wildcard substitution
//!
//! ## Level awareness
//!
//! Every deal is played "to" a level rank. A single rank-key function,
//! [`Card::power`], places the level rank just below the jokers; the Heart
//! card of the level is the wildcard and substitutes for any non-joker
//! card when forming combinations.
mod card;
mod combo;
mod deck;
mod rank;
mod suit;

pub use card::*;
pub use combo::*;
pub use deck::*;
pub use rank::*;
pub use suit::*;
