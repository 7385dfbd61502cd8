//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::defaults::{MAX_USER_RANK, MAX_ZOOM};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [source] section
    if let Some(section) = ini.section(Some("source")) {
        if let Some(v) = section.get("timeout") {
            config.source.timeout = parse_positive(v, "source", "timeout", "must be a positive integer (seconds)")?;
        }
        if let Some(v) = section.get("user_agent") {
            let v = v.trim();
            if !v.is_empty() {
                config.source.user_agent = v.to_string();
            }
        }
        if let Some(v) = section.get("batch_cap") {
            config.source.batch_cap = parse_positive(v, "source", "batch_cap", "must be a positive integer")?;
        }
    }

    // [display] section
    if let Some(section) = ini.section(Some("display")) {
        if let Some(v) = section.get("enabled") {
            config.display.enabled = parse_bool(v);
        }
        if let Some(v) = section.get("min_zoom") {
            config.display.min_zoom = v
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|zoom| *zoom <= MAX_ZOOM)
                .ok_or_else(|| invalid("display", "min_zoom", v, &format!("must be a zoom level from 0 to {}", MAX_ZOOM)))?;
        }
        if let Some(v) = section.get("hide_streets") {
            config.display.hide_streets = parse_bool(v);
        }
        if let Some(v) = section.get("active_region") {
            let v = v.trim();
            if !v.is_empty() && !v.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(invalid(
                    "display",
                    "active_region",
                    v,
                    "must be ALL or a region code such as MD",
                ));
            }
            config.display.active_region = v.parse().unwrap_or_default();
        }
    }

    // [user] section
    if let Some(section) = ini.section(Some("user")) {
        if let Some(v) = section.get("id") {
            config.user.id = parse_optional_id(v, "user", "id")?;
        }
        if let Some(v) = section.get("name") {
            let v = v.trim();
            config.user.name = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = section.get("rank") {
            config.user.rank = v
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|rank| (1..=MAX_USER_RANK).contains(rank))
                .ok_or_else(|| invalid("user", "rank", v, &format!("must be an integer from 1 to {}", MAX_USER_RANK)))?;
        }
        if let Some(v) = section.get("area_manager") {
            config.user.area_manager = parse_bool(v);
        }
        if let Some(v) = section.get("beta_users") {
            config.user.beta_users = parse_id_list(v, "user", "beta_users")?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_positive<T>(value: &str, section: &str, key: &str, reason: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    value
        .trim()
        .parse::<T>()
        .ok()
        .filter(|parsed| *parsed > T::default())
        .ok_or_else(|| invalid(section, key, value, reason))
}

fn parse_optional_id(value: &str, section: &str, key: &str) -> Result<Option<u64>, ConfigFileError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| invalid(section, key, value, "must be a numeric user id"))
}

/// Comma-separated user ids; empty entries are ignored.
fn parse_id_list(value: &str, section: &str, key: &str) -> Result<Vec<u64>, ConfigFileError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse()
                .map_err(|_| invalid(section, key, value, "must be a comma-separated list of user ids"))
        })
        .collect()
}

/// Parse a boolean value from config string.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive) as true.
/// Everything else is false.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
