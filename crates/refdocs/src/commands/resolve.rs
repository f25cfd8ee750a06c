//! `refdocs resolve` command implementation.

use std::path::PathBuf;

use clap::Args;
use refdocs_config::Config;
use refdocs_refs::{ParamTriple, Ref, language_name};

use crate::context::build_docs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Docs path, relative to `/docs/` (e.g. `en/2.x/guides/routing`).
    path: String,

    /// Path to configuration file (default: auto-discover refdocs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ResolveArgs {
    /// Execute the resolve command.
    ///
    /// Prints the canonical path, then the ref whose content it serves.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty, configuration fails, or the
    /// hosting API is unreachable.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let params = parse_path(&self.path)?;
        let config = Config::load(self.config.as_deref(), None)?;
        let docs = build_docs(&config)?;

        let canonical = match docs.canonical_path(&params).await? {
            Some(target) => {
                output.info(&format!("Redirects to /docs/{target}"));
                parse_path(&target)?
            }
            None => {
                output.info("Path is canonical");
                params
            }
        };
        output.print(&format!("/docs/{}", display_path(&canonical)));

        let Some(ref_param) = canonical.ref_.as_deref() else {
            output.warning("No release tags found; path has no canonical form");
            return Ok(());
        };
        let resolved = docs.resolve_ref(ref_param).await?;
        output.info(&describe(&resolved, &canonical.lang));

        Ok(())
    }
}

fn parse_path(path: &str) -> Result<ParamTriple, CliError> {
    let path = path.trim_start_matches("/docs/");
    ParamTriple::from_path(path)
        .ok_or_else(|| CliError::Validation(format!("Empty docs path: {path:?}")))
}

/// Human-readable summary of the content a path serves.
fn describe(resolved: &Ref, lang: &str) -> String {
    let kind = if resolved.is_tag() { "release" } else { "branch" };
    let language = language_name(lang).unwrap_or(lang);
    format!("Serves {kind} {resolved} in {language}")
}

fn display_path(params: &ParamTriple) -> String {
    [
        Some(params.lang.as_str()),
        params.ref_.as_deref(),
        params.rest.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("/")
}
