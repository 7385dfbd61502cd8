//! fclayer CLI - Command-line interface
//!
//! Drives the functional-class fetch pipeline against the live region
//! services and prints the classified road lines as JSON.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::regions::RegionsArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "fclayer")]
#[command(version = fclayer::VERSION)]
#[command(about = "Road functional-class overlay from government GIS services", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.fclayer/config.ini
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and classify the roads in a viewport
    Fetch(FetchArgs),

    /// List the regions with a known data service
    Regions(RegionsArgs),

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Fetch(args) => {
            let mut runner = CliRunner::new(cli.config.as_deref(), cli.verbose)?;
            commands::fetch::run(&mut runner, args)
        }
        Commands::Regions(args) => {
            let runner = CliRunner::new(cli.config.as_deref(), cli.verbose)?;
            commands::regions::run(&runner, args)
        }
        Commands::Config { command } => commands::config::run(command, cli.config),
    }
}
