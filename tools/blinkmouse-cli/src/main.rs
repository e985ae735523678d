//! Blinkmouse CLI: replay recorded signal traces and inspect settings.
//!
//! Usage:
//!   blinkmouse run                 Run a live session fed with detections on stdin
//!   blinkmouse replay <TRACE>      Replay a signal trace through the analyzer
//!   blinkmouse curve               Print pointer response tables
//!   blinkmouse config show         Print the effective configuration
//!   blinkmouse config init         Write the default configuration file

use std::path::PathBuf;

use blinkmouse_common::config::AppConfig;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "blinkmouse",
    about = "Hands-free pointer control from head motion and eye blinks",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a live session fed with detection records on stdin
    Run {
        /// Forward moves and clicks to the sink from the start
        #[arg(long)]
        capture: bool,

        /// Record every tick to this trace file
        #[arg(short, long)]
        trace: Option<PathBuf>,
    },

    /// Replay a recorded signal trace
    Replay {
        /// Path to the JSONL trace
        trace: PathBuf,

        /// Forward moves and clicks to the sink, as with capture enabled
        #[arg(long)]
        capture: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print pointer acceleration response tables
    Curve {
        /// Only this acceleration level (0-5)
        #[arg(short, long)]
        level: Option<u8>,
    },

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match (&cli.config, &cli.command) {
        // The file named by --config may not exist yet.
        (Some(_), Commands::Config {
            action: ConfigAction::Init { .. },
        }) => AppConfig::default(),
        (Some(path), _) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?,
        (None, _) => AppConfig::load(),
    };

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    blinkmouse_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Run { capture, trace } => commands::run::run(config, capture, trace).await,
        Commands::Replay {
            trace,
            capture,
            json,
        } => commands::replay::run(trace, config, capture, json),
        Commands::Curve { level } => commands::curve::run(level),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init { force } => commands::config::init(cli.config, force),
        },
    }
}
