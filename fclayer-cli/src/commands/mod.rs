//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (init, show, path)
//! - [`fetch`] - Run one fetch generation for a viewport
//! - [`regions`] - List the built-in region catalog

pub mod config;
pub mod fetch;
pub mod regions;
