//! Seatbook Core Library
//!
//! Reservation model for group tickets: the daily slot grid, the price-tier
//! policy, the ticket aggregate with its invariants, and the mutator that
//! creates tickets and seats participants.

pub mod command;
pub mod config;
pub mod error;
pub mod grid;
pub mod ids;
pub mod invariants;
pub mod models;
pub mod pricing;
pub mod reservation;
pub mod storage;

pub use command::{Command, Reply, SlotPick, TicketEvent};
pub use config::{BookingPolicy, ConfigError, SlotRemoval, VenueConfig};
pub use error::{Error, NotFound, Result, ValidationError};
pub use grid::{generate_daily_slots, SlotCandidate, SlotGrid};
pub use ids::{Clock, FixedClock, IdGenerator, RandomIds, SequentialIds, SystemClock};
pub use models::*;
pub use pricing::{capacity_of, price_tier_for, PriceTier};
pub use reservation::{NewTicket, Reservations};
pub use storage::{MemoryTicketStore, TicketRepository};
