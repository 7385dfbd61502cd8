//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization and client
//! construction to reduce duplication across command handlers.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use fclayer::catalog::RegionCatalog;
use fclayer::config::{config_file_path, ConfigFile};
use fclayer::logging::{init_logging, LoggingGuard};
use fclayer::source::{ArcGisFeatureSource, AsyncReqwestClient};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps the log writer alive while the runner exists.
    _logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load configuration and initialize logging.
    ///
    /// `config_path` overrides `~/.fclayer/config.ini`. With `verbose` set,
    /// log lines are mirrored to stderr.
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load_from(&config_file_path())?,
        };

        let logging_guard =
            init_logging(&config.logging.file, verbose).map_err(CliError::LoggingInit)?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Mutable configuration, for command-line overrides.
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("fclayer v{}", fclayer::VERSION);
        info!(
            command,
            log_file = %self.config.logging.file.display(),
            "fclayer CLI started"
        );
    }

    /// Built-in region catalog.
    pub fn catalog(&self) -> Result<Arc<RegionCatalog>, CliError> {
        let catalog = RegionCatalog::builtin()?;
        info!(regions = catalog.len(), "Region catalog loaded");
        Ok(Arc::new(catalog))
    }

    /// Feature source backed by a pooled HTTP client using the configured
    /// timeout and user agent.
    pub fn feature_source(&self) -> Result<Arc<ArcGisFeatureSource<AsyncReqwestClient>>, CliError> {
        let client = AsyncReqwestClient::with_options(
            self.config.http_timeout(),
            &self.config.source.user_agent,
        )?;
        Ok(Arc::new(ArcGisFeatureSource::new(client)))
    }

    /// Single-threaded runtime: one event loop drives every generation.
    pub fn runtime(&self) -> Result<tokio::runtime::Runtime, CliError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)
    }
}
