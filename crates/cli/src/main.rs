//! # chartlink
//!
//! Keeps a folder of hard links to a filtered subset of Spin Rhythm XD
//! custom charts.
//!
//! ## Example Usage
//!
//! ```bash
//! # Write config.toml pointing at the game's chart folder
//! chartlink init --charts-dir "D:/SRXD/Custom"
//!
//! # Index new and changed charts
//! chartlink index
//!
//! # Mirror every chart by two artists with an XD-level difficulty
//! chartlink sync --artist Camellia,Kobaryo --min-diff 30 --save
//! ```

mod commands;
mod filters;
mod metrics;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::Status;
use filters::FilterArgs;

/// Chart index and hard link mirror
#[derive(Parser)]
#[command(name = "chartlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "CHARTLINK_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Print metrics in Prometheus text format after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Custom charts folder (defaults to the game's folder under APPDATA)
        #[arg(long)]
        charts_dir: Option<PathBuf>,
    },

    /// Index new and changed chart files
    Index {
        /// Empty the index first and re-read every file
        #[arg(long)]
        rebuild: bool,
    },

    /// Show the number of indexed charts and the last index time
    Status,

    /// List charts matching the filters
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Remember the effective filter
        #[arg(long)]
        save: bool,
    },

    /// Count charts matching the filters
    Count {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Make the mirror hold exactly the charts matching the filters
    Sync {
        #[command(flatten)]
        filters: FilterArgs,

        /// Remember the effective filter
        #[arg(long)]
        save: bool,
    },

    /// Remove every link from the mirror
    ClearMirror,

    /// Empty the index
    Truncate,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(Status::Success) => ExitCode::SUCCESS,
        Ok(Status::Failed) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<Status> {
    let config = cli.config.as_path();

    let status = match &cli.command {
        Commands::Init { charts_dir } => commands::init(config, charts_dir.clone())?,
        Commands::Index { rebuild } => commands::index(config, *rebuild)?,
        Commands::Status => commands::status(config)?,
        Commands::Search { filters, save } => commands::search_cmd(config, filters, *save)?,
        Commands::Count { filters } => commands::count(config, filters)?,
        Commands::Sync { filters, save } => commands::sync(config, filters, *save)?,
        Commands::ClearMirror => commands::clear_mirror(config)?,
        Commands::Truncate => commands::truncate(config)?,
    };

    if cli.metrics {
        print!("{}", metrics::encode_metrics()?);
    }
    Ok(status)
}
