//! Configuration management CLI commands.
//!
//! Provides `config init`, `config show` and `config path`.

use std::path::{Path, PathBuf};

use clap::Subcommand;

use fclayer::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a commented config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand against `path`, or the default location.
pub fn run(command: ConfigCommands, path: Option<PathBuf>) -> Result<(), CliError> {
    let path = path.unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Init { force } => run_init(&path, force),
        ConfigCommands::Show => run_show(&path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn run_init(path: &Path, force: bool) -> Result<(), CliError> {
    if init_config(path, force)? {
        println!("Wrote {}", path.display());
    } else {
        println!(
            "{} already exists; use --force to overwrite it",
            path.display()
        );
    }
    Ok(())
}

/// Write defaults to `path`. Returns whether a file was written.
fn init_config(path: &Path, force: bool) -> Result<bool, CliError> {
    if force {
        ConfigFile::default().save_to(path)?;
        return Ok(true);
    }
    Ok(ConfigFile::ensure_exists_at(path)?)
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;
    if !path.exists() {
        println!("; {} not found, showing defaults", path.display());
    }
    print!("{}", config.to_ini_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.ini");

        assert!(init_config(&path, false).unwrap());
        fs::write(&path, "[display]\nmin_zoom = 14\n").unwrap();
        assert!(!init_config(&path, false).unwrap());
        assert_eq!(ConfigFile::load_from(&path).unwrap().display.min_zoom, 14);
    }

    #[test]
    fn test_init_force_restores_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        fs::write(&path, "[display]\nmin_zoom = 14\n").unwrap();

        assert!(init_config(&path, true).unwrap());
        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }
}
