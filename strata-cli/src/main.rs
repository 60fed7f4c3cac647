//! Strata CLI - schema migrations for DuckDB

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{down, generate, status, up, Target};

/// Strata - database schema migrations
#[derive(Parser)]
#[command(name = "strata", version, about, long_about = None)]
struct Cli {
    /// Target database name (overrides the config file)
    #[arg(short = 'd', long, global = true)]
    database: Option<String>,

    /// Database server port (ignored by the embedded backend)
    #[arg(short = 'p', long, global = true)]
    port: Option<u16>,

    /// Migrations directory
    #[arg(long, global = true, default_value = "migrations")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report applied and pending migrations
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply all pending migrations in order
    Up {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reverse one applied migration
    Down {
        /// Migration to reverse, or 'last' for the most recent
        #[arg(default_value = "last")]
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new timestamped migration stub
    Generate {
        /// Human-readable migration name
        name: String,
    },
}

fn main() -> ExitCode {
    if atty::isnt(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // recognized application errors print one clean line; anything
            // unexpected surfaces with full detail
            match e.downcast_ref::<strata_core::Error>() {
                Some(app) => output::error(&format!("strata: {}", app)),
                None => eprintln!("{:?}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let target = Target {
        database: cli.database,
        port: cli.port,
        dir: cli.dir,
    };

    match cli.command {
        Commands::Status { json } => status::run(&target, json),
        Commands::Up { json } => up::run(&target, json),
        Commands::Down { name, json } => down::run(&target, &name, json),
        Commands::Generate { name } => generate::run(&target, &name),
    }
}
