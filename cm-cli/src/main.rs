mod adapters;
mod commands;
mod runner;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cm_core::error::CmError;

use commands::Context;

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "CM_LOG";

#[derive(Parser)]
#[command(name = "cm")]
#[command(about = "Control the docker-compose services of the current project", long_about = None)]
struct Cli {
    /// Settings file (defaults to $CM_CONFIG, then cm.yml / .cm.yml upwards)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Table of declared services and their containers
    Status,
    /// Colored one-line summary for a shell prompt
    Icon,
    /// Relaunch services matching the selectors, or everything
    Start { selectors: Vec<String> },
    /// Stop everything
    Stop,
    /// Open a shell in the best matching container or service
    Go {
        #[arg(required = true)]
        query: String,
    },
    /// Follow logs of running containers
    Log { query: Option<String> },
    /// Rank project directories against an abbreviation
    Goto {
        abbrev: String,
        /// Print only the best match
        #[arg(long)]
        first: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn dispatch(cli: Cli) -> Result<ExitCode, CmError> {
    let cwd = std::env::current_dir()?;
    let ctx = Context::load(cwd, cli.config.as_deref())?;

    match cli.command {
        Commands::Status => commands::run_status(&ctx).await,
        Commands::Icon => commands::run_icon(&ctx).await,
        Commands::Start { selectors } => commands::run_start(&ctx, &selectors).await,
        Commands::Stop => commands::run_stop(&ctx).await,
        Commands::Go { query } => commands::run_go(&ctx, &query).await,
        Commands::Log { query } => commands::run_log(&ctx, query.as_deref()).await,
        Commands::Goto { abbrev, first } => commands::run_goto(&ctx, &abbrev, first),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
