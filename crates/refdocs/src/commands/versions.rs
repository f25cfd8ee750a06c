//! `refdocs versions` command implementation.

use std::path::PathBuf;

use clap::Args;
use refdocs_config::Config;

use crate::context::build_docs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the versions command.
#[derive(Args)]
pub(crate) struct VersionsArgs {
    /// Path to configuration file (default: auto-discover refdocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl VersionsArgs {
    /// Execute the versions command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the hosting API is
    /// unreachable.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let docs = build_docs(&config)?;
        let versions = docs.versions().await?;

        output.highlight(&format!("Tags ({})", versions.tags.len()));
        for tag in &versions.tags {
            output.print(tag);
        }
        output.highlight(&format!("Branches ({})", versions.branches.len()));
        for branch in &versions.branches {
            output.print(branch);
        }

        match versions.latest() {
            Some(latest) => output.info(&format!("Latest release: {latest}")),
            None => output.warning("No stable release tags found"),
        }

        Ok(())
    }
}
