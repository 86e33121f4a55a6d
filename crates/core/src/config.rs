//! Venue configuration schema and loader
//!
//! Read from a TOML file. Every section and field is optional; missing values
//! fall back to the defaults the venue ships with.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::grid::{parse_time, SlotGrid};

/// Top-level venue configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    pub venue: VenueSection,
    pub grid: GridSection,
    pub booking: BookingPolicy,
    pub log: LogSection,
}

/// Ticket defaults shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueSection {
    /// Package name stamped on new tickets
    pub package_name: String,
    /// Headcount pre-filled on the create form
    pub default_headcount: u32,
}

impl Default for VenueSection {
    fn default() -> Self {
        Self {
            package_name: "团票".to_string(),
            default_headcount: 18,
        }
    }
}

/// Daily booking window, as `HH:MM` strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSection {
    pub open: String,
    pub close: String,
    pub step_minutes: u32,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            open: "13:00".to_string(),
            close: "21:00".to_string(),
            step_minutes: 10,
        }
    }
}

impl GridSection {
    pub fn to_slot_grid(&self) -> Result<SlotGrid, ConfigError> {
        let open = parse_time(&self.open).map_err(|e| ConfigError::InvalidField {
            field: "grid.open",
            reason: e.to_string(),
        })?;
        let close = parse_time(&self.close).map_err(|e| ConfigError::InvalidField {
            field: "grid.close",
            reason: e.to_string(),
        })?;

        if open >= close {
            return Err(ConfigError::InvalidField {
                field: "grid.close",
                reason: format!("{} is not after {}", self.close, self.open),
            });
        }
        if self.step_minutes == 0 {
            return Err(ConfigError::InvalidField {
                field: "grid.step_minutes",
                reason: "must be greater than zero".to_string(),
            });
        }
        let window = (close - open).num_minutes();
        if window % i64::from(self.step_minutes) != 0 {
            return Err(ConfigError::InvalidField {
                field: "grid.step_minutes",
                reason: format!(
                    "{} minutes does not divide the {}-minute window",
                    self.step_minutes, window
                ),
            });
        }

        Ok(SlotGrid::new(open, close, self.step_minutes))
    }
}

/// What an edit does with a slot it drops while seats in it are taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SlotRemoval {
    /// Drop the slot and its occupants, logging who was evicted
    #[default]
    Discard,
    /// Refuse the edit
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingPolicy {
    pub occupied_slot_removal: SlotRemoval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl VenueConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded venue config");
        Ok(config)
    }

    /// Parse and validate config text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: VenueConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.to_slot_grid()?;

        if self.venue.default_headcount == 0 {
            return Err(ConfigError::InvalidField {
                field: "venue.default_headcount",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.venue.package_name.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "venue.package_name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// The configured grid. Falls back to the default grid if the section is invalid.
    pub fn slot_grid(&self) -> SlotGrid {
        self.grid.to_slot_grid().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid grid config, using default grid");
            SlotGrid::default()
        })
    }
}
