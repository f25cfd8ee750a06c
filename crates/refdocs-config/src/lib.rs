//! Configuration management for refdocs.
//!
//! Parses `refdocs.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `upstream.repo`
//! - `upstream.primary_package`
//! - `upstream.latest_branch`
//! - `upstream.api_url`
//! - `upstream.token`
//! - `docs.source_dir`
//! - `refresh.token`
//!
//! Tokens that expand to an empty string are treated as unset.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override content source directory.
    pub source_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "refdocs.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Upstream repository configuration (required to serve docs).
    pub upstream: Option<UpstreamConfig>,
    /// Version cache configuration.
    pub versions: VersionsConfig,
    /// Content configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Refresh webhook configuration.
    pub refresh: RefreshConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

/// Upstream repository whose releases and branches are documented.
#[derive(Debug, Deserialize)]
pub struct UpstreamConfig {
    /// Repository identifier (`owner/name`).
    pub repo: String,
    /// Package whose `<package>@<version>` releases become doc versions.
    pub primary_package: String,
    /// Branch served for the `latest` keyword.
    #[serde(default = "default_latest_branch")]
    pub latest_branch: String,
    /// Hosting API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Hosting API token.
    #[serde(default)]
    pub token: Option<String>,
    /// Hosting API request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// Hosting API request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.repo, "upstream.repo")?;
        require_owner_name(&self.repo, "upstream.repo")?;
        require_non_empty(&self.primary_package, "upstream.primary_package")?;
        require_non_empty(&self.latest_branch, "upstream.latest_branch")?;
        require_http_url(&self.api_url, "upstream.api_url")?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "upstream.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_latest_branch() -> String {
    "main".to_owned()
}

fn default_api_url() -> String {
    "https://api.github.com".to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Version cache configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
    /// Age in seconds after which cached listings are refreshed.
    pub ttl_secs: u64,
    /// Maximum number of cached repositories per listing kind.
    pub capacity: usize,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            capacity: 3,
        }
    }
}

impl VersionsConfig {
    /// Cache time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Raw content configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    default_lang: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug)]
pub struct DocsConfig {
    /// Root of the `<ref>/<lang>/**/*.md` content tree.
    pub source_dir: PathBuf,
    /// Language used when a path does not start with a language code.
    pub default_lang: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("content"),
            default_lang: "en".to_owned(),
        }
    }
}

/// Refresh webhook configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Bearer token required by the refresh endpoint. Unset disables it.
    pub token: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`upstream.token`").
        field: String,
        /// Error message (e.g., "${`GITHUB_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Require a repository identifier of the form `owner/name`.
fn require_owner_name(value: &str, field: &str) -> Result<(), ConfigError> {
    match value.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(ConfigError::Validation(format!(
            "{field} must be owner/name, got {value:?}"
        ))),
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `refdocs.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
    }

    /// Get validated upstream configuration.
    ///
    /// Use this instead of accessing the `upstream` field directly when the
    /// command talks to the hosting API.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_upstream(&self) -> Result<&UpstreamConfig, ConfigError> {
        let upstream = self.upstream.as_ref().ok_or_else(|| {
            ConfigError::Validation("[upstream] section required in config".into())
        })?;
        upstream.validate()?;
        Ok(upstream)
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: None,
            versions: VersionsConfig::default(),
            docs: DocsConfigRaw::default(),
            refresh: RefreshConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("content"),
                ..DocsConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        if let Some(upstream) = &self.upstream {
            upstream.validate()?;
        }
        self.validate_versions()?;
        self.validate_docs()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate version cache configuration.
    fn validate_versions(&self) -> Result<(), ConfigError> {
        if self.versions.capacity == 0 {
            return Err(ConfigError::Validation(
                "versions.capacity must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Validate content configuration.
    fn validate_docs(&self) -> Result<(), ConfigError> {
        let lang = &self.docs_resolved.default_lang;
        if !refdocs_refs::is_language_code(lang) {
            return Err(ConfigError::Validation(format!(
                "docs.default_lang must be an ISO 639-1 code, got {lang:?}"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        // Server config
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        // Upstream config (if present)
        if let Some(ref mut upstream) = self.upstream {
            upstream.repo = expand::expand_env(&upstream.repo, "upstream.repo")?;
            upstream.primary_package =
                expand::expand_env(&upstream.primary_package, "upstream.primary_package")?;
            upstream.latest_branch =
                expand::expand_env(&upstream.latest_branch, "upstream.latest_branch")?;
            upstream.api_url = expand::expand_env(&upstream.api_url, "upstream.api_url")?;
            upstream.token = expand::expand_optional(upstream.token.as_deref(), "upstream.token")?;
        }

        if let Some(ref source_dir) = self.docs.source_dir {
            self.docs.source_dir = Some(expand::expand_env(source_dir, "docs.source_dir")?);
        }

        self.refresh.token = expand::expand_optional(self.refresh.token.as_deref(), "refresh.token")?;

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = DocsConfig::default();
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(
                self.docs
                    .source_dir
                    .as_deref()
                    .map_or(defaults.source_dir.as_path(), Path::new),
            ),
            default_lang: self
                .docs
                .default_lang
                .clone()
                .unwrap_or(defaults.default_lang),
        };
    }
}
