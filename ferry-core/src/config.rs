//! Configuration management for Ferry
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (FERRY_*, plus the bare SOURCE_ORG style names)
//! 3. Config file (~/.config/ferry/config.toml)
//! 4. Default values

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One side of a migration: a GitHub repository and, optionally, its
/// Zenhub board id
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Organization (or user) owning the repository
    pub org: String,

    /// Repository name
    pub repo: String,

    /// Numeric Zenhub repository id. Zenhub has no API to look this up; it
    /// is visible in the board URL.
    pub zenhub_repo_id: Option<u64>,
}

impl RepoConfig {
    /// True when both org and repo are set
    pub fn is_complete(&self) -> bool {
        !self.org.trim().is_empty() && !self.repo.trim().is_empty()
    }
}

/// GitHub server endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API root, e.g. `https://github.example.com/api/v3` for GHE
    pub api_url: String,

    /// Web root used when writing issue links into bodies
    pub web_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            web_url: "https://github.com".to_string(),
        }
    }
}

/// Zenhub server endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ZenhubConfig {
    pub api_url: String,
}

impl Default for ZenhubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.zenhub.com".to_string(),
        }
    }
}

/// Transport, retry and paging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout. Response times vary a lot and a migration has
    /// to complete in one go, so this is generous.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Total attempts for a request that fails at the transport level
    pub max_attempts: u32,

    /// Pause between transport-level attempts
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,

    /// Extra wait added past the rate-limit reset time
    #[serde(with = "humantime_serde")]
    pub rate_limit_margin: Duration,

    /// Page size requested from list endpoints
    pub per_page: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
            rate_limit_margin: Duration::from_secs(1),
            per_page: 50,
        }
    }
}

/// Migration behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Rewrite references in the source repository and close the copied
    /// source issues. Mutates the source, so off unless asked for.
    pub patch_source: bool,

    /// Copy Zenhub estimates, pipelines and epics
    pub secondary_metadata: bool,

    /// Copy closed issues too (they are closed again in the target)
    pub include_closed: bool,

    /// Issues carrying any of these labels are not copied
    pub exclude_labels: Vec<String>,

    /// Source pipeline name -> target pipeline name, for columns whose
    /// names differ between the two boards
    pub pipeline_overrides: BTreeMap<String, String>,

    /// Column new issues land in on the target board
    pub default_pipeline: String,

    /// Where to write the issue number mapping at the end of a run
    pub mapping_file: Option<PathBuf>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            patch_source: false,
            secondary_metadata: true,
            include_closed: false,
            exclude_labels: Vec::new(),
            pipeline_overrides: BTreeMap::new(),
            default_pipeline: "New Issues".to_string(),
            mapping_file: None,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Repository issues are copied from
    pub source: RepoConfig,

    /// Repository issues are copied to
    pub target: RepoConfig,

    pub github: GitHubConfig,

    pub zenhub: ZenhubConfig,

    pub http: HttpConfig,

    pub migration: MigrationConfig,
}

/// Values supplied on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source: Option<(String, String)>,
    pub target: Option<(String, String)>,
    pub patch_source: Option<bool>,
    pub secondary_metadata: Option<bool>,
    pub include_closed: Option<bool>,
    pub exclude_labels: Vec<String>,
    pub mapping_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/ferry/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ferry").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables (the FERRY_ form wins when both are set):
    /// - FERRY_SOURCE_ORG / SOURCE_ORG
    /// - FERRY_SOURCE_REPO / SOURCE_REPO
    /// - FERRY_TARGET_ORG / TARGET_ORG
    /// - FERRY_TARGET_REPO / TARGET_REPO
    /// - FERRY_GITHUB_API_URL
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("FERRY_{}", name))
                .or_else(|| lookup(name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(org) = var("SOURCE_ORG") {
            self.source.org = org;
        }
        if let Some(repo) = var("SOURCE_REPO") {
            self.source.repo = repo;
        }
        if let Some(org) = var("TARGET_ORG") {
            self.target.org = org;
        }
        if let Some(repo) = var("TARGET_REPO") {
            self.target.repo = repo;
        }
        if let Some(api_url) = lookup("FERRY_GITHUB_API_URL").filter(|v| !v.is_empty()) {
            self.github.api_url = api_url;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some((org, repo)) = overrides.source {
            self.source.org = org;
            self.source.repo = repo;
        }

        if let Some((org, repo)) = overrides.target {
            self.target.org = org;
            self.target.repo = repo;
        }

        if let Some(patch) = overrides.patch_source {
            self.migration.patch_source = patch;
        }

        if let Some(metadata) = overrides.secondary_metadata {
            self.migration.secondary_metadata = metadata;
        }

        if let Some(closed) = overrides.include_closed {
            self.migration.include_closed = closed;
        }

        if !overrides.exclude_labels.is_empty() {
            self.migration.exclude_labels = overrides.exclude_labels;
        }

        if overrides.mapping_file.is_some() {
            self.migration.mapping_file = overrides.mapping_file;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(overrides: ConfigOverrides) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(overrides))
    }

    /// Check that a migration can run with this configuration
    pub fn validate_for_migration(&self) -> Result<()> {
        if !self.source.is_complete() {
            return Err(Error::Config(
                "Source repository not set. Use --source org/repo or set SOURCE_ORG and SOURCE_REPO"
                    .to_string(),
            ));
        }
        if !self.target.is_complete() {
            return Err(Error::Config(
                "Target repository not set. Use --target org/repo or set TARGET_ORG and TARGET_REPO"
                    .to_string(),
            ));
        }
        if self.source.org == self.target.org && self.source.repo == self.target.repo {
            return Err(Error::Config(
                "Source and target repositories are the same".to_string(),
            ));
        }
        if self.http.max_attempts == 0 {
            return Err(Error::Config("http.max_attempts must be at least 1".to_string()));
        }
        if self.http.per_page == 0 || self.http.per_page > 100 {
            return Err(Error::Config(format!(
                "http.per_page must be between 1 and 100, got {}",
                self.http.per_page
            )));
        }
        Ok(())
    }

    /// Zenhub board ids for both sides, when both are configured
    pub fn zenhub_repo_ids(&self) -> Option<(u64, u64)> {
        self.source.zenhub_repo_id.zip(self.target.zenhub_repo_id)
    }
}
