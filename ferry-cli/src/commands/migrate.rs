//! Migrate command - copy issues between repositories

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use ferry_core::{Config, ConfigOverrides, Secrets};
use ferry_github::{ExcludeLabels, LogMappingSink, MigrationOptions, Migrator, RepoRef};
use tracing::{info, warn};

use super::build_fetcher;

/// Copy issues, comments, labels, milestones and board data
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Source repository (org/repo or URL)
    #[arg(short, long)]
    source: Option<String>,

    /// Target repository (org/repo or URL)
    #[arg(short, long)]
    target: Option<String>,

    /// Also rewrite references in the source and close the copied issues
    #[arg(long)]
    patch_source: bool,

    /// Skip estimates, pipelines and epics
    #[arg(long)]
    no_metadata: bool,

    /// Copy closed issues too
    #[arg(long)]
    include_closed: bool,

    /// Skip issues carrying this label (repeatable)
    #[arg(long = "exclude-label", value_name = "LABEL")]
    exclude_labels: Vec<String>,

    /// Write the source-to-target issue map to this JSON file
    #[arg(long, value_name = "PATH")]
    mapping_file: Option<PathBuf>,

    /// Read everything and report what would be copied, without writing
    #[arg(long)]
    dry_run: bool,
}

impl MigrateArgs {
    fn overrides(&self) -> anyhow::Result<ConfigOverrides> {
        Ok(ConfigOverrides {
            source: self.source.as_deref().map(repo_pair).transpose()?,
            target: self.target.as_deref().map(repo_pair).transpose()?,
            patch_source: self.patch_source.then_some(true),
            secondary_metadata: self.no_metadata.then_some(false),
            include_closed: self.include_closed.then_some(true),
            exclude_labels: self.exclude_labels.clone(),
            mapping_file: self.mapping_file.clone(),
        })
    }

    /// Execute the migrate command
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(self.overrides()?)?;
        let mut options = MigrationOptions::from_config(&config)?;
        options.dry_run = self.dry_run;

        let secrets = Secrets::load()?;
        let fetcher = build_fetcher(&config, &secrets)?;
        if options.secondary_metadata && options.zenhub_repos.is_none() {
            info!("No Zenhub repository ids configured; estimates, pipelines and epics are skipped");
        }

        let sink = LogMappingSink::new(config.migration.mapping_file.clone());
        let report = Migrator::new(&fetcher, options)
            .with_predicate(ExcludeLabels::new(config.migration.exclude_labels.iter().cloned()))
            .with_sink(Arc::new(sink))
            .run()
            .await?;

        println!("{}", serde_json::to_string_pretty(&report)?);

        if report.has_errors() {
            warn!(
                count = report.errors.len(),
                "Some entities could not be copied; see the errors in the report"
            );
        }
        Ok(())
    }
}

fn repo_pair(input: &str) -> anyhow::Result<(String, String)> {
    let repo = RepoRef::parse(input)?;
    Ok((repo.org, repo.repo))
}
