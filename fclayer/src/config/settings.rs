//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;
use std::time::Duration;

use crate::access::{AccessPolicy, Caller, RegionSelection};
use crate::fetch::ControllerSettings;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Data source settings
    pub source: SourceSettings,
    /// Overlay display settings
    pub display: DisplaySettings,
    /// Caller identity used for region permissions
    pub user: UserSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Data source configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    /// Timeout in seconds for HTTP requests.
    pub timeout: u64,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Maximum identifiers per feature request.
    pub batch_cap: usize,
}

/// Overlay display configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    /// Whether the overlay is shown at all.
    pub enabled: bool,
    /// Lowest zoom level that fetches.
    pub min_zoom: u8,
    /// Hide the lowest road class.
    pub hide_streets: bool,
    /// `ALL` or a single region code.
    pub active_region: RegionSelection,
}

/// Caller identity.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    pub id: Option<u64>,
    pub name: Option<String>,
    /// Editor rank, 1-based.
    pub rank: u8,
    pub area_manager: bool,
    /// Users who see every region regardless of permissions.
    pub beta_users: Vec<u64>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path; truncated at session start.
    pub file: PathBuf,
}

impl ConfigFile {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout)
    }

    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.user.id,
            user_name: self.user.name.clone(),
            rank: self.user.rank,
            area_manager: self.user.area_manager,
        }
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy {
            beta_users: self.user.beta_users.clone(),
            selection: self.display.active_region.clone(),
        }
    }

    /// Fetch controller settings described by this configuration.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            enabled: self.display.enabled,
            min_zoom: self.display.min_zoom,
            hide_streets: self.display.hide_streets,
            provider_batch_cap: self.source.batch_cap,
            caller: self.caller(),
            policy: self.access_policy(),
        }
    }
}
