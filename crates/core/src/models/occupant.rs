//! Seat occupant model

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn display_name(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A participant holding a seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub gender: Gender,
    pub phone: String,
}

impl UserInfo {
    pub fn new(name: impl Into<String>, gender: Gender, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gender,
            phone: phone.into(),
        }
    }

    /// A seat only ever holds a fully populated occupant
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MalformedOccupant { field: "name" });
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::MalformedOccupant { field: "phone" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_occupant() {
        let info = UserInfo::new("Alice", Gender::Female, "13800000000");
        assert!(info.validate().is_ok());
    }

    #[test]
    fn test_blank_fields_rejected() {
        let no_name = UserInfo::new("  ", Gender::Male, "13800000000");
        assert_eq!(
            no_name.validate(),
            Err(ValidationError::MalformedOccupant { field: "name" })
        );

        let no_phone = UserInfo::new("Bob", Gender::Male, "");
        assert_eq!(
            no_phone.validate(),
            Err(ValidationError::MalformedOccupant { field: "phone" })
        );
    }

    #[test]
    fn test_gender_serializes_as_name() {
        let json = serde_json::to_string(&Gender::Female).unwrap();
        assert_eq!(json, "\"Female\"");
    }
}
