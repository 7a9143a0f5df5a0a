//! LogInsight CLI
//!
//! Command-line access to the category log store.
//!
//! # Commands
//!
//! - `query` - Search a category, newest first, one page at a time
//! - `delete` - Delete records by date range or search text, recording
//!   the deletion in the `app` log
//! - `stats` - Show line count, size, and modification time per category
//! - `append` - Append an event to a category

mod commands;

use clap::{Parser, Subcommand};
use loginsight_core::{Config, CoreResult, LogStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// LogInsight command-line log tools.
#[derive(Parser)]
#[command(name = "loginsight")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log directory (defaults to $LOG_DIR, then ./logs)
    #[arg(global = true, short, long)]
    dir: Option<PathBuf>,

    /// Refuse to load log files larger than this many bytes
    #[arg(global = true, long)]
    max_file_size: Option<u64>,

    /// Rewrite log files in place on delete, keeping other processes'
    /// open append handles valid
    #[arg(global = true, long)]
    in_place: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a category, newest first
    Query {
        /// Category (general, login, tokens, app)
        category: String,

        /// Page number, starting at 1
        #[arg(short, long)]
        page: Option<String>,

        /// Entries per page
        #[arg(short, long)]
        limit: Option<String>,

        /// Case-insensitive text to look for anywhere in a record
        #[arg(short, long)]
        search: Option<String>,

        /// Only records at or after this date
        #[arg(long)]
        start: Option<String>,

        /// Only records at or before this date
        #[arg(long)]
        end: Option<String>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete records matching a date range or search text
    Delete {
        /// Category (general, login, tokens, app)
        category: String,

        /// Delete records at or after this date
        #[arg(long)]
        start: Option<String>,

        /// Delete records at or before this date
        #[arg(long)]
        end: Option<String>,

        /// Delete records containing this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show per-category statistics
    Stats {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Append an event to a category
    Append {
        /// Category (general, login, tokens, app)
        category: String,

        /// Event message
        message: String,

        /// Event level (trace, debug, info, warn, error, fatal)
        #[arg(short, long, default_value = "info")]
        level: String,

        /// Extra field as key=value; JSON values are kept typed
        #[arg(short, long = "field", value_parser = commands::append::parse_field)]
        fields: Vec<(String, serde_json::Value)>,
    },

    /// Show version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if e.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: Cli) -> CoreResult<()> {
    if let Commands::Version = cli.command {
        println!("LogInsight CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("LogInsight Core v{}", loginsight_core::VERSION);
        return Ok(());
    }

    let mut config = Config::from_env()
        .max_file_size(cli.max_file_size)
        .rewrite_in_place(cli.in_place);
    if let Some(dir) = cli.dir {
        config = config.log_dir(dir);
    }
    let store = LogStore::open(config)?;

    match cli.command {
        Commands::Query {
            category,
            page,
            limit,
            search,
            start,
            end,
            format,
        } => {
            let params = loginsight_core::QueryParams {
                page: page.as_deref(),
                limit: limit.as_deref(),
                search: search.as_deref(),
                start_date: start.as_deref(),
                end_date: end.as_deref(),
            };
            commands::query::run(&store, &category, &params, &format)
        }
        Commands::Delete {
            category,
            start,
            end,
            search,
        } => commands::delete::run(
            &store,
            &category,
            start.as_deref(),
            end.as_deref(),
            search.as_deref(),
        ),
        Commands::Stats { format } => commands::stats::run(&store, &format),
        Commands::Append {
            category,
            message,
            level,
            fields,
        } => commands::append::run(&store, &category, &message, &level, fields),
        Commands::Version => Ok(()),
    }
}
