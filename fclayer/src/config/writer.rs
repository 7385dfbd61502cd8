//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::defaults::{MAX_USER_RANK, MAX_ZOOM};
use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let user_id = config.user.id.map(|id| id.to_string()).unwrap_or_default();
    let user_name = config.user.name.as_deref().unwrap_or("");
    let beta_users = config
        .user
        .beta_users
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"[source]
; Timeout in seconds for each request to a region's data service (default: 30)
timeout = {}
; User agent sent with every request
user_agent = {}
; Maximum identifiers requested per feature query (default: 1000)
; Layers with a lower service limit use their own limit
batch_cap = {}

[display]
; Show the overlay at all (default: true)
enabled = {}
; Lowest zoom level that fetches; zooming out further clears the overlay (0-{}, default: 12)
min_zoom = {}
; Hide local streets (default: false)
hide_streets = {}
; ALL for every permitted region, or one region code such as MD
active_region = {}

[user]
; Editor identity used to decide which regions are visible
id = {}
name = {}
; Editor rank, 1-{}
rank = {}
; Area managers see regions restricted to area managers
area_manager = {}
; Comma-separated user ids that see every region
beta_users = {}

[logging]
; Log file, truncated at the start of each session
file = {}
"#,
        config.source.timeout,
        config.source.user_agent,
        config.source.batch_cap,
        config.display.enabled,
        MAX_ZOOM,
        config.display.min_zoom,
        config.display.hide_streets,
        config.display.active_region,
        user_id,
        user_name,
        MAX_USER_RANK,
        config.user.rank,
        config.user.area_manager,
        beta_users,
        path_to_string(&config.logging.file),
    )
}

/// Display a path with the home directory abbreviated to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
