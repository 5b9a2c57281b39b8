//! # depsort-cli
//!
//! Orders, checks and explains item manifests from the terminal.
//!
//! Sets up logging and the panic hook, parses the command line and
//! dispatches to the command handlers.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Deterministic ordering of dependent items
#[derive(Parser)]
#[command(name = "depsort", version, about = "Deterministic dependency ordering")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the items of a manifest in dependency order
    Order {
        /// Manifest file (.toml or .json)
        manifest: Utf8PathBuf,
        /// Break ties by descending name
        #[arg(long)]
        reverse: bool,
        /// Ignore requirements to enclosing containers
        #[arg(long)]
        skip_container_deps: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report the structure errors of a manifest
    Check {
        manifest: Utf8PathBuf,
    },
    /// Show how one item has been sorted
    Explain {
        manifest: Utf8PathBuf,
        /// Full name of the item (or of a head, `<Group>.Head`)
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    debug!("Starting depsort v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::new();
    commands::dispatch_command(cli.command, &ctx)
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "depsort={level},depsort_resolver={level},depsort_config={level},depsort_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("depsort encountered an unexpected error: {}", panic_info);
        eprintln!("depsort crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}
