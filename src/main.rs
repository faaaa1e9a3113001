// Entry point of the Drive search assistant.
//
// **Architecture Overview:**
// - `core/` = Relevance engine, search orchestration, answers, evaluation
// - `infra/` = Implementations of core traits (Google APIs, OpenAI, files)
// - `cli/` = Terminal adapter (argument parsing, paging, rendering)
//
// This file's job is to:
// 1. Load configuration
// 2. Set up logging
// 3. Dispatch the subcommand

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "cli/cli_layer.rs"]
mod cli;
mod config;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing::Level;

use crate::cli::args::{parse_file_type, parse_from_date, parse_mode, parse_to_date};
use crate::cli::commands::{run_eval, run_ping, run_search, SearchRequest};
use crate::config::AppConfig;
use crate::core::search::{DateRange, FileTypeFilter, SearchContext, SearchMode};

/// Search Google Drive and answer questions from the documents it finds.
///
/// Credentials and tuning knobs are read from the environment (or a `.env`
/// file in the working directory).
#[derive(Parser)]
#[command(name = "drive-copilot", version)]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Drive and print ranked files, or an answer in question mode.
    Search {
        /// What to look for.
        query: String,

        /// `document`, `content`, `question`, or `test` (question mode over
        /// the local test documents).
        #[arg(long, default_value = "document", value_parser = parse_mode)]
        mode: SearchMode,

        /// `all`, `document`, `spreadsheet`, `presentation`, or `pdf`.
        #[arg(long, default_value = "all", value_parser = parse_file_type)]
        file_type: FileTypeFilter,

        /// Only files modified on or after this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_from_date)]
        from: Option<DateTime<Utc>>,

        /// Only files modified on or before this date (YYYY-MM-DD).
        #[arg(long, value_parser = parse_to_date)]
        to: Option<DateTime<Utc>>,

        /// Page of results to show, starting at 1.
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Print the page as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Page through the results with n/p/q on stdin.
        #[arg(long, short)]
        interactive: bool,
    },

    /// Run the evaluation cases and save a JSON report.
    Eval {
        /// JSON file with test cases; the built-in cases are used otherwise.
        #[arg(long)]
        cases: Option<PathBuf>,

        /// Directory the report is written to.
        #[arg(long, default_value = "evaluation/results")]
        results_dir: PathBuf,

        /// Search Google Drive instead of the local test documents.
        #[arg(long)]
        drive: bool,
    },

    /// Check that the Google credentials can obtain an access token.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so `--json` output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Commands::Search {
            query,
            mode,
            file_type,
            from,
            to,
            page,
            json,
            interactive,
        } => {
            let date_range = (from.is_some() || to.is_some()).then_some(DateRange {
                start: from,
                end: to,
            });
            let request = SearchRequest {
                query,
                context: SearchContext {
                    mode,
                    file_type,
                    date_range,
                },
                page,
                json,
                interactive,
            };
            run_search(&config, request).await
        }
        Commands::Eval {
            cases,
            results_dir,
            drive,
        } => run_eval(&config, cases.as_deref(), results_dir, drive).await,
        Commands::Ping => run_ping(&config).await,
    }
}
