//! User configuration.
//!
//! Settings are read from `~/.fclayer/config.ini`; a missing file or a
//! missing key falls back to defaults. Invalid values are reported with
//! their section and key rather than silently replaced.
//!
//! # Example
//!
//! ```ignore
//! use fclayer::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let settings = config.controller_settings();
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{default_log_file, DEFAULT_LOG_FILE, DEFAULT_USER_RANK, MAX_USER_RANK, MAX_ZOOM};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, DisplaySettings, LoggingSettings, SourceSettings, UserSettings};
