//! Secrets management for Ferry
//!
//! Tokens are stored separately from configuration to avoid accidental sharing.
//! The secrets file is located at `~/.config/ferry/secrets.toml` and must have
//! restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (GH_ACCESS_TOKEN, GITHUB_TOKEN, ZENHUB_ACCESS_TOKEN)
//! 2. Secrets file (~/.config/ferry/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: GitHubSecrets,

    /// Zenhub configuration
    pub zenhub: ZenhubSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub Personal Access Token
    pub token: Option<String>,
}

/// Zenhub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ZenhubSecrets {
    /// Zenhub API token
    pub token: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        let secrets_path = Self::default_secrets_path();

        if let Some(path) = secrets_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        // Check file permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            // Check if file is readable by group or others (mode & 0o077)
            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        for token in [&mut secrets.github.token, &mut secrets.zenhub.token] {
            if let Some(value) = token {
                *value = value.trim().to_string();
            }
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/ferry/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ferry").join("secrets.toml"))
    }

    /// Get GitHub token with environment variable override
    ///
    /// Priority: GH_ACCESS_TOKEN > GITHUB_TOKEN > secrets file
    pub fn github_token(&self) -> Option<String> {
        for var in ["GH_ACCESS_TOKEN", "GITHUB_TOKEN"] {
            if let Some(token) = env_token(var) {
                debug!(var, "Using GitHub token from environment");
                return Some(token);
            }
        }

        non_empty(&self.github.token).inspect(|_| debug!("Using GitHub token from secrets file"))
    }

    /// Get Zenhub token with environment variable override
    ///
    /// Priority: ZENHUB_ACCESS_TOKEN > secrets file
    pub fn zenhub_token(&self) -> Option<String> {
        if let Some(token) = env_token("ZENHUB_ACCESS_TOKEN") {
            debug!("Using Zenhub token from ZENHUB_ACCESS_TOKEN environment variable");
            return Some(token);
        }

        non_empty(&self.zenhub.token).inspect(|_| debug!("Using Zenhub token from secrets file"))
    }

    /// Create a template secrets file at the default location
    ///
    /// Creates parent directories if needed and sets secure permissions
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;
        Self::create_template_at(&path)?;
        Ok(path)
    }

    /// Create a template secrets file at `path`
    pub fn create_template_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        // Don't overwrite existing file
        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        let template = r#"# Ferry Secrets
# This file contains sensitive credentials - do not share or commit to version control
#
# IMPORTANT: This file must have restrictive permissions (chmod 600)

[github]
# GitHub Personal Access Token with repo scope on both repositories
token = ""

[zenhub]
# Zenhub API token, only needed to copy estimates, pipelines and epics
token = ""
"#;

        std::fs::write(path, template).map_err(Error::Io)?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms).map_err(Error::Io)?;
        }

        warn!(path = %path.display(), "Created secrets template - please edit and add your tokens");

        Ok(())
    }
}

fn env_token(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn non_empty(token: &Option<String>) -> Option<String> {
    token.as_ref().filter(|t| !t.is_empty()).cloned()
}
