//! Async runtime for live guandan matches.
//!
//! This crate drives the pure rules engine in `gd-gameplay` through a
//! real-time match, pulling decisions from four players concurrently
//! and broadcasting state-change events.
//!
//! ## Architecture
//!
//! - [`Room`] — Match coordinator owning engine, arbitration, and bus
//! - [`Engine`] — Single-threaded driver advancing Match → Deal → Trick
//! - [`Arbiter`] — Per-seat pending requests, deadlines, and defaults
//! - [`Actor`] — Async task wrapper for a single player's decision loop
//! - [`Bus`] — Ordered, synchronous fan-out of typed [`Event`]s
//!
//! ## Interfaces
//!
//! - [`Player`] — Trait for pluggable player implementations
//! - [`Observer`] — Collaborator-implemented event sink
//! - [`RoomHandle`] — Submissions, projections, lifecycle controls
//! - [`ServerMessage`] — Wire encoding of events for transports
//!
//! The driver holds the match write lock across every mutation and its
//! event emission, and suspends only at the three arbitration points
//! (play decision, pool pick, tribute return).
mod actor;
mod arbiter;
mod bus;
mod channel;
mod config;
mod engine;
mod event;
mod message;
mod player;
mod protocol;
mod room;
mod table;
mod timer;

pub mod players;

pub use actor::*;
pub use arbiter::*;
pub use bus::*;
pub use channel::*;
pub use config::*;
pub use engine::*;
pub use event::*;
pub use message::*;
pub use player::*;
pub use protocol::*;
pub use room::*;
pub use table::*;
pub use timer::*;
pub use players::*;
