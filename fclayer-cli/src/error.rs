//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use fclayer::catalog::CatalogError;
use fclayer::config::ConfigFileError;
use fclayer::source::SourceError;

/// Exit code for configuration and argument problems.
pub const EXIT_CONFIG: i32 = 2;

/// Exit code when every layer of a fetch failed.
pub const EXIT_FETCH_FAILED: i32 = 3;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Configuration error
    Config(ConfigFileError),
    /// Invalid command-line input
    InvalidArgument(String),
    /// Built-in catalog failed validation
    Catalog(CatalogError),
    /// HTTP client could not be created
    Client(SourceError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Every layer of the fetch failed
    FetchFailed(String),
    /// Failed to write output
    Output(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::InvalidArgument(_) => EXIT_CONFIG,
            CliError::FetchFailed(_) => EXIT_FETCH_FAILED,
            _ => 1,
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Fix the value in the config file, or recreate it with:");
                eprintln!("  fclayer config init --force");
            }
            CliError::FetchFailed(_) => {
                eprintln!();
                eprintln!("No region service answered. Check your network connection,");
                eprintln!("or raise [source] timeout if the services are slow.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "{}", msg),
            CliError::Catalog(e) => write!(f, "Region catalog is invalid: {}", e),
            CliError::Client(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::FetchFailed(summary) => write!(f, "Fetch failed:\n{}", summary),
            CliError::Output(msg) => write!(f, "Failed to write output: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) | CliError::Runtime(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Catalog(e) => Some(e),
            CliError::Client(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<SourceError> for CliError {
    fn from(e: SourceError) -> Self {
        CliError::Client(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::InvalidArgument("bad".into()).exit_code(), EXIT_CONFIG);
        assert_eq!(CliError::FetchFailed("x".into()).exit_code(), EXIT_FETCH_FAILED);
        assert_eq!(CliError::Output("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_config_error_message() {
        let err: CliError = ConfigFileError::InvalidValue {
            section: "user".into(),
            key: "rank".into(),
            value: "9".into(),
            reason: "must be 1-7".into(),
        }
        .into();
        assert_eq!(err.exit_code(), EXIT_CONFIG);
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration: user.rank = '9' - must be 1-7"
        );
    }
}
