//! Error types for Seatbook Core

use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigError;

/// A rule that a create/edit/occupy request broke
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("At least one time slot must be selected")]
    EmptySelection,

    #[error("Headcount must be greater than zero")]
    InvalidHeadcount,

    #[error("Selected slots seat {capacity} but the ticket needs {headcount}")]
    CapacityShortfall { capacity: u32, headcount: u32 },

    #[error("Occupant {field} must not be empty")]
    MalformedOccupant { field: &'static str },

    #[error("Time {time} is not on the booking grid")]
    OffGridTime { time: String },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("Slot {slot_id} still has {occupied} occupied seat(s)")]
    OccupiedSlotRemoved { slot_id: String, occupied: usize },
}

/// Something addressed by a request does not exist
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    #[error("ticket {0}")]
    Ticket(Uuid),

    #[error("slot {slot_index} in ticket {ticket_id}")]
    Slot { ticket_id: Uuid, slot_index: usize },

    #[error("seat {seat_index} of slot {slot_index} in ticket {ticket_id}")]
    Seat {
        ticket_id: Uuid,
        slot_index: usize,
        seat_index: usize,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(#[from] NotFound),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Short machine-readable category, used in command replies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not_found",
            Error::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let validation: Error = ValidationError::EmptySelection.into();
        assert_eq!(validation.kind(), "validation");

        let missing: Error = NotFound::Ticket(Uuid::nil()).into();
        assert_eq!(missing.kind(), "not_found");
        assert_eq!(missing.to_string(), format!("Not found: ticket {}", Uuid::nil()));

        let config: Error = ConfigError::InvalidField {
            field: "grid.step_minutes",
            reason: "must be greater than zero".to_string(),
        }
        .into();
        assert_eq!(config.kind(), "config");
    }
}
