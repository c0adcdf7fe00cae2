//! Guandan rules engine.
//!
//! Pure, deterministic match state layered as Match → Deal → Trick with
//! strict tree ownership; no async, no I/O. The driver in `gd-gameroom`
//! advances this state and broadcasts the resulting events.
//!
//! ## Modules
//!
//! - [`Action`] — A play decision: cards or a pass
//! - [`Trick`] — Lead/follow turn machine with clockwise advancement
//! - [`Deal`] — One 108-card distribution, hands, rankings, tricks
//! - [`TributePhase`] — Immunity, pool, selection, and return sub-phases
//! - [`Match`] — Team levels, deal history, terminal detection
//! - [`GameError`] — Every failure kind collaborators can observe
//! - [`PlayerView`] — Per-seat projection hiding the other hands
//! - [`heuristic`] — The autoplay strategy capability
mod action;
mod deal;
mod error;
mod game;
mod result;
mod trick;
mod tribute;
mod validate;
mod view;

pub mod heuristic;

pub use action::*;
pub use deal::*;
pub use error::*;
pub use game::*;
pub use result::*;
pub use trick::*;
pub use tribute::*;
pub use validate::*;
pub use view::*;
