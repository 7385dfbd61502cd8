//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants, validation limits and the
//! `ConfigFile::default()` implementation.

use std::path::PathBuf;

use super::file::config_directory;
use super::settings::*;
use crate::access::RegionSelection;
use crate::fetch::{DEFAULT_MIN_ZOOM, DEFAULT_PROVIDER_BATCH_CAP};
use crate::source::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

/// Default rank of an unconfigured caller.
pub const DEFAULT_USER_RANK: u8 = 1;

/// Highest editor rank.
pub const MAX_USER_RANK: u8 = 7;

/// Highest zoom level the editor offers.
pub const MAX_ZOOM: u8 = 22;

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "fclayer.log";

/// Default log file path (~/.fclayer/logs/fclayer.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join("logs").join(DEFAULT_LOG_FILE)
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            source: SourceSettings {
                timeout: DEFAULT_TIMEOUT_SECS,
                user_agent: DEFAULT_USER_AGENT.to_string(),
                batch_cap: DEFAULT_PROVIDER_BATCH_CAP,
            },
            display: DisplaySettings {
                enabled: true,
                min_zoom: DEFAULT_MIN_ZOOM,
                hide_streets: false,
                active_region: RegionSelection::All,
            },
            user: UserSettings {
                id: None,
                name: None,
                rank: DEFAULT_USER_RANK,
                area_manager: false,
                beta_users: Vec::new(),
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.source.timeout, 30);
        assert_eq!(config.source.batch_cap, 1000);
        assert_eq!(config.display.min_zoom, 12);
        assert!(config.display.enabled);
        assert!(!config.display.hide_streets);
        assert_eq!(config.display.active_region, RegionSelection::All);
        assert_eq!(config.user.rank, DEFAULT_USER_RANK);
        assert!(config.logging.file.ends_with("logs/fclayer.log"));
    }

    #[test]
    fn test_controller_settings_follow_config() {
        let mut config = ConfigFile::default();
        config.display.hide_streets = true;
        config.user.rank = 4;
        config.user.beta_users = vec![42];
        let settings = config.controller_settings();
        assert!(settings.hide_streets);
        assert_eq!(settings.caller.rank, 4);
        assert_eq!(settings.policy.beta_users, vec![42]);
        assert_eq!(settings.provider_batch_cap, 1000);
    }
}
