//! Concrete player implementations.
mod robot;
mod scripted;

pub use robot::*;
pub use scripted::*;
