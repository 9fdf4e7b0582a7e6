//! recipe-path CLI
//!
//! Loads a recipe relation from JSON and searches synthesis paths with
//! recipe-path-core.
//!
//! ## Commands
//!
//! - `search <TARGET> --recipes <FILE>`: find one path (`--mode shortest`)
//!   or several distinct paths (`--mode multiple --max N`) and print a JSON
//!   report on stdout
//! - `stats --recipes <FILE>`: print element and recipe counts
//!
//! Logs go to stderr; set `RUST_LOG=debug` to trace the searches.

mod error;
mod load;
mod report;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use recipe_path_core::{Algorithm, SearchConfig, SearchEngine};
use serde::Serialize;

use crate::error::CliError;
use crate::report::{Mode, SearchRequest, StatsReport};

#[derive(Parser)]
#[command(name = "recipe-path")]
#[command(author, version, about = "Search synthesis paths through a recipe relation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for paths that produce an element from the base elements
    Search {
        /// Element to produce
        target: String,

        /// JSON recipe file
        #[arg(long)]
        recipes: PathBuf,

        /// Search strategy: bfs, dfs or bds
        #[arg(long, default_value = "bfs")]
        algo: Algorithm,

        #[arg(long, value_enum, default_value_t = Mode::Shortest)]
        mode: Mode,

        /// Number of distinct paths wanted (multiple mode)
        #[arg(long)]
        max: Option<usize>,

        /// TOML search configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override max_workers from the configuration
        #[arg(long)]
        workers: Option<usize>,

        /// Disable the shortest-path cache
        #[arg(long)]
        no_cache: bool,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Load the recipe file and print graph statistics
    Stats {
        /// JSON recipe file
        #[arg(long)]
        recipes: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

/// Returns whether the command produced what was asked for.
fn run(cli: Cli) -> Result<bool, CliError> {
    match cli.command {
        Commands::Search {
            target,
            recipes,
            algo,
            mode,
            max,
            config,
            workers,
            no_cache,
            pretty,
        } => {
            let config = settings::apply_overrides(
                settings::load_config(config.as_deref())?,
                workers,
                no_cache,
            );
            let engine = SearchEngine::new(config)?;
            engine.build_graph(load::load_recipes(&recipes)?);

            let request = SearchRequest {
                target,
                algorithm: algo,
                mode,
                max,
            };
            let report = report::run_search(&engine, &request);
            print_json(&report, pretty)?;

            Ok(report.path_found)
        }

        Commands::Stats { recipes } => {
            let start = Instant::now();
            let loaded = load::load_recipes(&recipes)?;
            let engine = SearchEngine::new(SearchConfig::default())?;
            engine.build_graph(loaded);
            let load_time_ms = start.elapsed().as_secs_f64() * 1000.0;

            let stats = StatsReport {
                graph: engine.stats()?,
                load_time_ms,
            };
            print_json(&stats, true)?;
            Ok(true)
        }
    }
}
