//! Fetch command - page through any list endpoint

use clap::Args;
use ferry_core::{Config, Secrets};
use ferry_github::FetchOptions;

use super::connect;

/// Fetch every page of a list endpoint and print the items as a JSON array
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Endpoint relative to the API root (e.g. repos/org/repo/issues) or an absolute URL
    endpoint: String,

    /// Stop after this many items
    #[arg(long)]
    max: Option<usize>,

    /// Query parameter for the first request (repeatable)
    #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = parse_query)]
    query: Vec<(String, String)>,

    /// Talk to the Zenhub API instead of GitHub
    #[arg(long)]
    zenhub: bool,
}

impl FetchArgs {
    /// Execute the fetch command
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = Config::load()?.with_env_overrides();
        let (github, zenhub) = connect(&config, &Secrets::load()?)?;
        let client = if self.zenhub {
            zenhub.ok_or_else(|| anyhow::anyhow!("No Zenhub token found. Set ZENHUB_ACCESS_TOKEN"))?
        } else {
            github
        };

        let options = match self.max {
            Some(max) => FetchOptions::at_most(max),
            None => FetchOptions::all(),
        };
        let query: Vec<(&str, String)> = self
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();

        let items = client.fetch(&self.endpoint, &query, options).await?;
        println!("{}", serde_json::to_string_pretty(&items)?);
        Ok(())
    }
}

fn parse_query(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{}`", s))?;
    if key.is_empty() {
        return Err(format!("empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}
