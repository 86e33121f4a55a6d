//! Capacity and price-tier policy
//!
//! The price tier is a pure function of headcount. It is never stored on a
//! ticket; callers re-evaluate it whenever they need it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::models::TimeSlot;

/// Display price bands, in ascending headcount order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriceTier {
    /// Up to 20 people
    Standard,
    /// 21 to 30 people
    Large,
    /// 31 and above
    Premium,
}

impl PriceTier {
    pub fn label(&self) -> &'static str {
        match self {
            PriceTier::Standard => "50元 (15-20人)",
            PriceTier::Large => "80元 (21-30人)",
            PriceTier::Premium => "120元 (31-50人)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [PriceTier::Standard, PriceTier::Large, PriceTier::Premium]
            .into_iter()
            .find(|tier| tier.label() == label)
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for PriceTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for PriceTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        PriceTier::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown price tier '{}'", label)))
    }
}

/// Map a headcount to its price tier. First matching band wins.
pub fn price_tier_for(headcount: u32) -> PriceTier {
    if headcount <= 20 {
        PriceTier::Standard
    } else if headcount <= 30 {
        PriceTier::Large
    } else {
        PriceTier::Premium
    }
}

/// Total seats offered by a set of slots
pub fn capacity_of(slots: &[TimeSlot]) -> u32 {
    slots.iter().map(|slot| slot.capacity).sum()
}

pub fn check_headcount(headcount: u32) -> Result<(), ValidationError> {
    if headcount == 0 {
        return Err(ValidationError::InvalidHeadcount);
    }
    Ok(())
}

/// Selected capacity must cover the whole group; the selection is never truncated
pub fn check_capacity(capacity: u32, headcount: u32) -> Result<(), ValidationError> {
    if capacity < headcount {
        return Err(ValidationError::CapacityShortfall {
            capacity,
            headcount,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(price_tier_for(15), PriceTier::Standard);
        assert_eq!(price_tier_for(20), PriceTier::Standard);
        assert_eq!(price_tier_for(21), PriceTier::Large);
        assert_eq!(price_tier_for(30), PriceTier::Large);
        assert_eq!(price_tier_for(31), PriceTier::Premium);
        assert_eq!(price_tier_for(50), PriceTier::Premium);
    }

    #[test]
    fn test_tier_is_total() {
        assert_eq!(price_tier_for(0), PriceTier::Standard);
        assert_eq!(price_tier_for(u32::MAX), PriceTier::Premium);
    }

    #[test]
    fn test_labels() {
        assert_eq!(price_tier_for(4).label(), "50元 (15-20人)");
        assert_eq!(price_tier_for(25).to_string(), "80元 (21-30人)");
        assert_eq!(price_tier_for(40).label(), "120元 (31-50人)");
    }

    #[test]
    fn test_label_serde() {
        let json = serde_json::to_string(&PriceTier::Large).unwrap();
        assert_eq!(json, "\"80元 (21-30人)\"");
        let tier: PriceTier = serde_json::from_str(&json).unwrap();
        assert_eq!(tier, PriceTier::Large);
        assert!(serde_json::from_str::<PriceTier>("\"free\"").is_err());
    }

    #[test]
    fn test_capacity_check() {
        assert!(check_capacity(4, 4).is_ok());
        assert_eq!(
            check_capacity(4, 5),
            Err(ValidationError::CapacityShortfall {
                capacity: 4,
                headcount: 5
            })
        );
        assert_eq!(check_headcount(0), Err(ValidationError::InvalidHeadcount));
    }
}
