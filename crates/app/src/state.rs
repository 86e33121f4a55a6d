//! Application state management

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use seatbook_core::{Reservations, VenueConfig};

const CONFIG_FILE: &str = "venue.toml";

/// Where the running config came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path given on the command line
    Explicit(PathBuf),
    /// `venue.toml` in the platform config directory
    UserConfig(PathBuf),
    /// Built-in defaults
    Defaults,
}

/// Main application state
pub struct AppState {
    pub config: VenueConfig,
    pub source: ConfigSource,
}

impl AppState {
    /// Resolve configuration: explicit path, then the user config file, then defaults
    pub fn load(explicit: Option<&Path>) -> seatbook_core::Result<Self> {
        if let Some(path) = explicit {
            let config = VenueConfig::load(path)?;
            return Ok(Self {
                config,
                source: ConfigSource::Explicit(path.to_path_buf()),
            });
        }

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            let config = VenueConfig::load(&path)?;
            return Ok(Self {
                config,
                source: ConfigSource::UserConfig(path),
            });
        }

        Ok(Self {
            config: VenueConfig::default(),
            source: ConfigSource::Defaults,
        })
    }

    fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "seatbook", "seatbook")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// A fresh reservation store configured for this venue
    pub fn reservations(&self) -> Reservations {
        Reservations::from_config(&self.config)
    }

    /// Log filter to use when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &str {
        &self.config.log.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatbook_core::SlotRemoval;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("venue.toml");
        fs::write(&path, "[booking]\noccupied_slot_removal = \"reject\"\n").unwrap();

        let state = AppState::load(Some(&path)).unwrap();
        assert_eq!(state.source, ConfigSource::Explicit(path));
        assert_eq!(
            state.config.booking.occupied_slot_removal,
            SlotRemoval::Reject
        );
        assert_eq!(state.reservations().policy().occupied_slot_removal, SlotRemoval::Reject);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let temp = TempDir::new().unwrap();
        let result = AppState::load(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(seatbook_core::Error::Config(_))));
    }

    #[test]
    fn test_invalid_explicit_config_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("venue.toml");
        fs::write(&path, "[venue]\ndefault_headcount = 0\n").unwrap();
        assert!(AppState::load(Some(&path)).is_err());
    }
}
