//! Commits command - commit counts per repository

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use ferry_core::{Config, Secrets};
use ferry_github::{Commit, EntityFetcher, FetchOptions, RepoRef};
use tracing::{info, warn};

use super::build_fetcher;

/// Count the commits of a series of repositories
#[derive(Args, Debug)]
pub struct CommitsArgs {
    /// Repositories (org/repo), comma separated or repeated
    #[arg(short, long, value_delimiter = ',', required = true)]
    repos: Vec<String>,

    /// Only commits after this ISO 8601 timestamp (YYYY-MM-DDTHH:MM:SSZ)
    #[arg(short, long)]
    since: Option<String>,

    /// Only commits up to this ISO 8601 timestamp
    #[arg(short, long)]
    until: Option<String>,

    /// Write results to this file instead of stdout
    #[arg(short, long)]
    filename: Option<PathBuf>,

    /// Break each count down by committer
    #[arg(long)]
    by_author: bool,

    /// Stop counting a repository after this many commits
    #[arg(long)]
    max: Option<usize>,
}

impl CommitsArgs {
    /// Execute the commits command
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = Config::load()?.with_env_overrides();
        let fetcher = build_fetcher(&config, &Secrets::load()?)?;

        let mut out: Box<dyn Write> = match &self.filename {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stdout()),
        };
        let options = match self.max {
            Some(max) => FetchOptions::at_most(max),
            None => FetchOptions::all(),
        };

        for repo in self.repos.iter().map(|r| r.trim()).filter(|r| !r.is_empty()) {
            let repo = RepoRef::parse(repo)?;
            info!("Processing {}", repo);

            let commits = fetcher
                .commits(&repo, self.since.as_deref(), self.until.as_deref(), options)
                .await?;
            writeln!(out, "{}, {}", repo, commits.len())?;

            if self.by_author {
                for (committer, count) in tally(&fetcher, &commits).await? {
                    writeln!(out, "  {}, {}", committer, count)?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }
}

/// Commits per committer. Linked accounts are shown as `login (name)`;
/// commits without one fall back to the git author name.
async fn tally(fetcher: &EntityFetcher, commits: &[Commit]) -> anyhow::Result<BTreeMap<String, usize>> {
    let mut counts = BTreeMap::new();

    for commit in commits {
        let committer = match &commit.author {
            Some(author) => match fetcher.user(&author.login).await {
                Ok(user) => match user.name {
                    Some(name) => format!("{} ({})", user.login, name),
                    None => user.login,
                },
                Err(e) if e.is_per_entity() => {
                    warn!(login = %author.login, error = %e, "User lookup failed");
                    author.login.clone()
                }
                Err(e) => return Err(e.into()),
            },
            None => commit.commit.author.name.clone(),
        };
        *counts.entry(committer).or_insert(0) += 1;
    }

    Ok(counts)
}
