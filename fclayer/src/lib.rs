//! fclayer - functional-class road overlay
//!
//! Fetches government road classification data for the regions in view,
//! normalizes each agency's encoding onto one [`road_class::RoadClass`]
//! taxonomy and hands drawable, colored line records to a render sink.
//!
//! # High-Level API
//!
//! The [`fetch`] module drives everything:
//!
//! ```ignore
//! use std::sync::Arc;
//! use fclayer::catalog::RegionCatalog;
//! use fclayer::config::ConfigFile;
//! use fclayer::fetch::{FetchController, MemorySink};
//! use fclayer::source::{ArcGisFeatureSource, AsyncReqwestClient};
//!
//! let config = ConfigFile::load()?;
//! let controller = FetchController::new(
//!     Arc::new(RegionCatalog::builtin()?),
//!     Arc::new(ArcGisFeatureSource::new(AsyncReqwestClient::new()?)),
//!     Arc::new(MemorySink::new()),
//!     config.controller_settings(),
//! );
//! let outcome = controller.on_viewport_changed(viewport).await;
//! ```

pub mod access;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod fetch;
pub mod geo;
pub mod logging;
pub mod road_class;
pub mod source;

/// Version of the fclayer library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
