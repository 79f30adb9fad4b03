//! Ferry Core - shared configuration for Ferry
//!
//! This crate holds the pieces every Ferry command needs before it talks to
//! an API: layered configuration, access tokens and the shared error type.

pub mod config;
pub mod error;
pub mod secrets;

pub use config::{
    Config, ConfigOverrides, GitHubConfig, HttpConfig, MigrationConfig, RepoConfig, ZenhubConfig,
};
pub use error::{Error, Result};
pub use secrets::{GitHubSecrets, Secrets, ZenhubSecrets};
