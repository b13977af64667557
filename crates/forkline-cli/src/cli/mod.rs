//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use forkline_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "forkline")]
#[command(version)]
#[command(about = "Branch, browse and switch chat threads")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Start an interactive session that reads commands from stdin (default)
    Repl,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load().context("load config")?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            let _log_guard = logging::init(&config.log, &config::paths::forkline_home())
                .context("init logging")?;
            commands::repl::run(&config)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
