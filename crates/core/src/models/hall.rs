//! Hall types and their fixed seat capacities

use serde::{Deserialize, Serialize};

/// The two hall sizes a slot can be booked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HallType {
    /// Big hall
    A,
    /// Small hall
    B,
}

impl HallType {
    /// Seats per slot. Fixed for the lifetime of a slot.
    pub fn capacity(&self) -> u32 {
        match self {
            HallType::A => 4,
            HallType::B => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HallType::A => "A Hall (Big)",
            HallType::B => "B Hall (Small)",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            HallType::A => "A",
            HallType::B => "B",
        }
    }
}

impl std::fmt::Display for HallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacities() {
        assert_eq!(HallType::A.capacity(), 4);
        assert_eq!(HallType::B.capacity(), 2);
    }

    #[test]
    fn test_serialized_as_letter() {
        assert_eq!(serde_json::to_string(&HallType::A).unwrap(), "\"A\"");
        let hall: HallType = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(hall, HallType::B);
    }
}
