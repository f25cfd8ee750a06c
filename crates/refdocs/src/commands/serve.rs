//! `refdocs serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use refdocs_config::{CliSettings, Config};
use refdocs_server::{run_server, server_config_from_config};

use crate::context::build_docs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover refdocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose output (request and upstream logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            source_dir: self.source_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let docs = build_docs(&config)?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!("Repository: {}", docs.repo()));
        output.info(&format!(
            "Source directory: {}",
            config.docs_resolved.source_dir.display()
        ));
        output.info(&format!(
            "Version cache: {}s TTL, {} entries",
            config.versions.ttl_secs, config.versions.capacity
        ));
        if config.refresh.token.is_some() {
            output.info("Refresh endpoint: enabled");
        } else {
            output.info("Refresh endpoint: disabled (no refresh.token in config)");
        }

        run_server(server_config_from_config(&config), docs).await?;

        Ok(())
    }
}
