//! CLI command implementations

pub mod commits;
pub mod fetch;
pub mod migrate;
pub mod secrets;

pub use commits::CommitsArgs;
pub use fetch::FetchArgs;
pub use migrate::MigrateArgs;
pub use secrets::SecretsArgs;

use ferry_core::{Config, Secrets};
use ferry_github::{ApiClient, ClientConfig, EntityFetcher};

/// GitHub client, plus a Zenhub client when a Zenhub token is available
pub fn connect(config: &Config, secrets: &Secrets) -> anyhow::Result<(ApiClient, Option<ApiClient>)> {
    let token = secrets.github_token().ok_or_else(|| {
        anyhow::anyhow!(
            "No GitHub token found. Set GH_ACCESS_TOKEN or GITHUB_TOKEN, or run `ferry secrets init`"
        )
    })?;
    let github = ApiClient::connect(
        ClientConfig::github(&config.github.api_url, &token, &config.http)?,
        config.http.timeout,
    )?;

    let zenhub = match secrets.zenhub_token() {
        Some(token) => Some(ApiClient::connect(
            ClientConfig::zenhub(&config.zenhub.api_url, &token, &config.http)?,
            config.http.timeout,
        )?),
        None => None,
    };

    Ok((github, zenhub))
}

pub fn build_fetcher(config: &Config, secrets: &Secrets) -> anyhow::Result<EntityFetcher> {
    let (github, zenhub) = connect(config, secrets)?;
    Ok(EntityFetcher::new(github, zenhub, config.http.per_page))
}
