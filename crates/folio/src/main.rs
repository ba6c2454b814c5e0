//! Folio CLI - static documentation and blog site builder.
//!
//! Provides commands for:
//! - `build`: Write the static site
//! - `check`: Validate content and navigation without writing
//! - `serve`: Build, serve and rebuild on changes
//! - `start`: Serve a previously built site

mod commands;
mod error;
mod output;
mod project;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CheckArgs, ServeArgs, StartArgs};
use error::CliError;
use output::Output;

/// Folio - static documentation and blog site builder.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Log build progress (otherwise `RUST_LOG` decides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the static site.
    Build(BuildArgs),
    /// Validate content and navigation without writing output.
    Check(CheckArgs),
    /// Build, serve and rebuild on source changes.
    Serve(ServeArgs),
    /// Serve a previously built site.
    Start(StartArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Check(args) => args.execute(),
        Commands::Serve(args) => block_on(args.execute()),
        Commands::Start(args) => block_on(args.execute()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

fn block_on(future: impl Future<Output = Result<(), CliError>>) -> Result<(), CliError> {
    tokio::runtime::Runtime::new()?.block_on(future)
}
