//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
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
//! - `site.url`
//! - `site.base_path`
//! - `theme.project_link`
//! - `server.host`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content source directory.
    pub source_dir: Option<PathBuf>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Override draft inclusion.
    pub include_drafts: Option<bool>,
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Largest heading level the table of contents may collect.
const MAX_TOC_DEPTH: u8 = 6;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site identity.
    pub site: SiteSettings,
    /// Content tree configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Navigation metadata configuration.
    pub metadata: MetadataConfig,
    /// Layout chrome configuration.
    pub theme: ThemeConfig,
    /// Preview server configuration.
    pub server: ServerConfig,

    /// Resolved docs configuration (set after loading).
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

/// Site identity settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Site title shown in the navbar, `<title>` suffix and footer.
    pub title: String,
    /// Default meta description for pages without one.
    pub description: Option<String>,
    /// Absolute site URL. Enables `sitemap.xml` when set.
    pub url: Option<String>,
    /// URL prefix the site is served under (e.g. `/docs/`).
    pub base_path: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "Documentation".to_owned(),
            description: None,
            url: None,
            base_path: "/".to_owned(),
        }
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    public_dir: Option<String>,
    include_drafts: Option<bool>,
    exclude: Vec<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Root of the Markdown/MDX content tree.
    pub source_dir: PathBuf,
    /// Directory the static site is written to.
    pub output_dir: PathBuf,
    /// Directory copied verbatim into the output.
    pub public_dir: PathBuf,
    /// Whether pages marked `draft: true` are built.
    pub include_drafts: bool,
    /// Glob patterns (relative to `source_dir`) excluded from the build.
    pub exclude: Vec<String>,
}

/// Navigation metadata configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Filename of per-directory navigation maps.
    pub name: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            name: "_meta.yaml".to_owned(),
        }
    }
}

/// Layout chrome configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Banner text shown above the navbar.
    pub banner: Option<String>,
    /// Footer text. Defaults to the site title.
    pub footer: Option<String>,
    /// Repository or project URL linked from the navbar.
    pub project_link: Option<String>,
    /// Deepest heading level listed in the table of contents.
    pub toc_depth: u8,
    /// Whether the navbar renders a search box.
    pub search: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            banner: None,
            footer: None,
            project_link: None,
            toc_depth: 3,
            search: true,
        }
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
            port: 3000,
        }
    }
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
    /// Output directory that would overwrite or delete build inputs.
    #[error("docs.output_dir {} overlaps {name} {}", .output.display(), .other.display())]
    OutputOverlap {
        /// Resolved output directory.
        output: PathBuf,
        /// Config field of the overlapped directory.
        name: &'static str,
        /// Resolved overlapped directory.
        other: PathBuf,
    },
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
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

/// Absolute form of `path` with symlinks resolved as far as it exists.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(mut real) = existing.canonicalize() {
            real.extend(missing.iter().rev().copied());
            return real;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return absolute.clone(),
        }
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
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
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate_dirs()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.docs_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(include_drafts) = settings.include_drafts {
            self.docs_resolved.include_drafts = include_drafts;
        }
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
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
            site: SiteSettings::default(),
            docs: DocsConfigRaw::default(),
            metadata: MetadataConfig::default(),
            theme: ThemeConfig::default(),
            server: ServerConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("pages"),
                output_dir: base.join("out"),
                public_dir: base.join("public"),
                include_drafts: false,
                exclude: Vec::new(),
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

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_metadata()?;
        self.validate_theme()?;
        self.validate_server()?;
        self.validate_dirs()?;
        Ok(())
    }

    /// The output directory is wiped on clean builds, so it must stay
    /// clear of every directory the build reads from.
    fn validate_dirs(&self) -> Result<(), ConfigError> {
        let docs = &self.docs_resolved;
        let output = normalize(&docs.output_dir);
        for (name, dir) in [
            ("docs.source_dir", &docs.source_dir),
            ("docs.public_dir", &docs.public_dir),
        ] {
            let other = normalize(dir);
            if output.starts_with(&other) || other.starts_with(&output) {
                return Err(ConfigError::OutputOverlap {
                    output: docs.output_dir.clone(),
                    name,
                    other: dir.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.title, "site.title")?;
        if let Some(url) = &self.site.url {
            require_http_url(url, "site.url")?;
        }
        let base = &self.site.base_path;
        if !base.starts_with('/') || !base.ends_with('/') {
            return Err(ConfigError::Validation(
                "site.base_path must start and end with '/'".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_metadata(&self) -> Result<(), ConfigError> {
        let name = &self.metadata.name;
        require_non_empty(name, "metadata.name")?;
        let supported = [".yaml", ".yml", ".json"];
        if !supported.iter().any(|ext| name.ends_with(ext)) {
            return Err(ConfigError::Validation(format!(
                "metadata.name must end with .yaml, .yml or .json (got {name})"
            )));
        }
        if name.contains('/') {
            return Err(ConfigError::Validation(
                "metadata.name must be a file name, not a path".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_theme(&self) -> Result<(), ConfigError> {
        let depth = self.theme.toc_depth;
        if !(2..=MAX_TOC_DEPTH).contains(&depth) {
            return Err(ConfigError::Validation(format!(
                "theme.toc_depth must be between 2 and {MAX_TOC_DEPTH}"
            )));
        }
        if let Some(link) = &self.theme.project_link {
            require_http_url(link, "theme.project_link")?;
        }
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.site.base_path = expand::expand_env(&self.site.base_path, "site.base_path")?;

        if let Some(url) = &self.site.url {
            self.site.url = Some(expand::expand_env(url, "site.url")?);
        }
        if let Some(link) = &self.theme.project_link {
            self.theme.project_link = Some(expand::expand_env(link, "theme.project_link")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "pages"),
            output_dir: resolve(self.docs.output_dir.as_deref(), "out"),
            public_dir: resolve(self.docs.public_dir.as_deref(), "public"),
            include_drafts: self.docs.include_drafts.unwrap_or(false),
            exclude: self.docs.exclude.clone(),
        };
    }
}
