//! refdocs CLI - versioned documentation server.
//!
//! Provides commands for:
//! - `serve`: Start the documentation server
//! - `versions`: List the release tags and branches docs are served for
//! - `resolve`: Show where a docs path redirects and which ref it reads

mod commands;
mod context;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ResolveArgs, ServeArgs, VersionsArgs};
use error::CliError;
use output::Output;

/// refdocs - versioned documentation server.
#[derive(Parser)]
#[command(name = "refdocs", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the documentation server.
    Serve(ServeArgs),
    /// List release tags and branches.
    Versions(VersionsArgs),
    /// Resolve a docs path to its canonical form.
    Resolve(ResolveArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = tokio::runtime::Runtime::new()
        .map_err(CliError::from)
        .and_then(|rt| {
            rt.block_on(async {
                match cli.command {
                    Commands::Serve(args) => args.execute().await,
                    Commands::Versions(args) => args.execute().await,
                    Commands::Resolve(args) => args.execute().await,
                }
            })
        });

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
