//! Data models for Seatbook

mod hall;
mod occupant;
mod slot;
mod ticket;

pub use hall::*;
pub use occupant::*;
pub use slot::*;
pub use ticket::*;
