//! Issue migration between two repositories
//!
//! A run copies the selected issues of a source repository into a target
//! repository in eight ordered phases:
//! 1. Select source issues
//! 2. Prime the target with labels and milestones
//! 3. Build the pipeline map
//! 4. Create target issues, their comments and the identifier mapping
//! 5. Rewrite references in the target issues
//! 6. Copy estimates, pipelines and epics
//! 7. Close target issues, then milestones, mirroring the source
//! 8. Optionally patch and close the source issues
//!
//! Per-entity failures are recorded in the [`MigrationReport`] and the run
//! moves on. Any other failure ends the run. Either way the mapping built
//! so far is handed to the [`MappingSink`] before `run` returns.

mod filter;
mod pipeline;
mod provenance;
mod report;


use std::collections::BTreeMap;
use std::sync::Arc;

use ferry_core::Config;
use tracing::{debug, info, warn};

use crate::fetcher::EntityFetcher;
use crate::mapping::{IdentifierMapping, LogMappingSink, MappingSink};
use crate::models::{Issue, Milestone, NewIssue, NewMilestone, State, StateFilter};
use crate::repo::RepoRef;
use crate::rewrite::{ReferenceRewriter, UnmappedPolicy};
use crate::zenhub::{Board, DEFAULT_PIPELINE};
use crate::Result;

pub use filter::{ExcludeLabels, IncludeAll, InclusionPredicate};
pub use pipeline::PipelineMap;
pub use provenance::{comment_body, issue_body, moved_notice};
pub use report::{EntityError, EntityKind, EpicOutcome, MigrationReport};

/// Phases of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationPhase {
    Select,
    PrimeTarget,
    MapPipelines,
    Create,
    RewriteTarget,
    SecondaryMetadata,
    CloseMirrored,
    PatchSource,
}

impl MigrationPhase {
    pub fn description(&self) -> &'static str {
        match self {
            MigrationPhase::Select => "Reading source issues",
            MigrationPhase::PrimeTarget => "Copying labels and milestones",
            MigrationPhase::MapPipelines => "Matching board pipelines",
            MigrationPhase::Create => "Creating target issues",
            MigrationPhase::RewriteTarget => "Patching issue references in target repo",
            MigrationPhase::SecondaryMetadata => "Copying estimates, pipelines and epics",
            MigrationPhase::CloseMirrored => "Closing issues and milestones closed in source",
            MigrationPhase::PatchSource => "Patching and closing source issues",
        }
    }
}

impl std::fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Settings of one run
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub source: RepoRef,
    pub target: RepoRef,
    /// Browser root used to build issue links, e.g. `https://github.com`
    pub web_url: String,
    /// Zenhub repository ids of source and target
    pub zenhub_repos: Option<(u64, u64)>,
    pub selection: StateFilter,
    pub secondary_metadata: bool,
    pub patch_source: bool,
    pub dry_run: bool,
    /// Source pipeline name to target pipeline name, for names that differ
    pub pipeline_overrides: BTreeMap<String, String>,
    pub default_pipeline: String,
}

impl MigrationOptions {
    pub fn new(source: RepoRef, target: RepoRef) -> Self {
        Self {
            source,
            target,
            web_url: "https://github.com".to_string(),
            zenhub_repos: None,
            selection: StateFilter::Open,
            secondary_metadata: true,
            patch_source: false,
            dry_run: false,
            pipeline_overrides: BTreeMap::new(),
            default_pipeline: DEFAULT_PIPELINE.to_string(),
        }
    }

    /// Options for the repositories and flags in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate_for_migration()?;

        let migration = &config.migration;
        Ok(Self {
            source: RepoRef::new(&config.source.org, &config.source.repo),
            target: RepoRef::new(&config.target.org, &config.target.repo),
            web_url: config.github.web_url.clone(),
            zenhub_repos: config.zenhub_repo_ids(),
            selection: if migration.include_closed {
                StateFilter::All
            } else {
                StateFilter::Open
            },
            secondary_metadata: migration.secondary_metadata,
            patch_source: migration.patch_source,
            dry_run: false,
            pipeline_overrides: migration.pipeline_overrides.clone(),
            default_pipeline: migration.default_pipeline.clone(),
        })
    }

    fn source_issues_url(&self) -> String {
        self.source.issues_web_url(&self.web_url)
    }

    fn target_issues_url(&self) -> String {
        self.target.issues_web_url(&self.web_url)
    }
}

/// Zenhub state needed by the metadata phase
struct ZenhubContext {
    source_id: u64,
    target_id: u64,
    source_board: Board,
    pipelines: PipelineMap,
}

/// Drives one migration run
pub struct Migrator<'a> {
    fetcher: &'a EntityFetcher,
    options: MigrationOptions,
    predicate: Box<dyn InclusionPredicate + 'a>,
    sink: Arc<dyn MappingSink>,
}

impl<'a> Migrator<'a> {
    pub fn new(fetcher: &'a EntityFetcher, options: MigrationOptions) -> Self {
        Self {
            fetcher,
            options,
            predicate: Box::new(IncludeAll),
            sink: Arc::new(LogMappingSink::default()),
        }
    }

    pub fn with_predicate(mut self, predicate: impl InclusionPredicate + 'a) -> Self {
        self.predicate = Box::new(predicate);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn MappingSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn options(&self) -> &MigrationOptions {
        &self.options
    }

    /// Run every phase. The mapping reaches the sink whether or not the
    /// run succeeds.
    pub async fn run(&self) -> Result<MigrationReport> {
        let mut mapping = IdentifierMapping::new();
        let mut report = MigrationReport::default();

        let outcome = self.run_phases(&mut mapping, &mut report).await;
        self.sink.surface(&mapping);

        outcome?;
        report.mapping = mapping;
        report.log_summary();
        Ok(report)
    }

    async fn run_phases(
        &self,
        mapping: &mut IdentifierMapping,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let opts = &self.options;
        info!(
            source = %opts.source,
            target = %opts.target,
            dry_run = opts.dry_run,
            "Starting migration"
        );

        enter(MigrationPhase::Select);
        let issues = self.select(report).await?;

        enter(MigrationPhase::PrimeTarget);
        let target_milestones = self.prime_target(report).await?;

        enter(MigrationPhase::MapPipelines);
        let zenhub = self.map_pipelines().await?;

        if opts.dry_run {
            for issue in &issues {
                info!("Would copy {} ({})", issue.html_url, issue.title);
            }
            info!(count = issues.len(), "Dry run complete, nothing was written");
            return Ok(());
        }

        enter(MigrationPhase::Create);
        self.create_issues(&issues, &target_milestones, zenhub.as_ref(), mapping, report)
            .await?;

        enter(MigrationPhase::RewriteTarget);
        self.rewrite_target(mapping, report).await?;

        if let Some(zenhub) = &zenhub {
            enter(MigrationPhase::SecondaryMetadata);
            self.copy_metadata(&issues, zenhub, mapping, report).await?;
        }

        enter(MigrationPhase::CloseMirrored);
        self.close_mirrored(&issues, mapping, report).await?;

        if opts.patch_source {
            enter(MigrationPhase::PatchSource);
            self.patch_source(mapping, report).await?;
            self.close_source(&issues, mapping, report).await?;
        }

        Ok(())
    }

    async fn select(&self, report: &mut MigrationReport) -> Result<Vec<Issue>> {
        let opts = &self.options;
        let issues = self.fetcher.issues(&opts.source, opts.selection).await?;

        let mut selected = Vec::with_capacity(issues.len());
        for issue in issues {
            if issue.is_pull_request() {
                debug!(url = %issue.html_url, "Skipping pull request");
                continue;
            }
            if self.predicate.include(&issue) {
                selected.push(issue);
            } else {
                info!("Excluding issue {}.", issue.html_url);
                report.excluded += 1;
            }
        }

        report.selected = selected.len();
        info!(count = selected.len(), source = %opts.source, "Selected issues");
        Ok(selected)
    }

    /// Copy missing labels and milestones by name. Returns the target's
    /// milestones, including the ones just created.
    async fn prime_target(&self, report: &mut MigrationReport) -> Result<Vec<Milestone>> {
        let opts = &self.options;

        let source_labels = self.fetcher.labels(&opts.source).await?;
        let target_labels = self.fetcher.labels(&opts.target).await?;
        for label in &source_labels {
            if target_labels.iter().any(|l| l.name == label.name) {
                continue;
            }
            if opts.dry_run {
                info!("Would add label {}.", label.name);
                continue;
            }
            let created = self.fetcher.create_label(&opts.target, label).await;
            if tolerate(report, EntityKind::Label, &label.name, created)?.is_some() {
                info!("Added label {}.", label.name);
                report.labels_created += 1;
            }
        }

        let source_milestones = self
            .fetcher
            .milestones(&opts.source, StateFilter::All)
            .await?;
        let mut target_milestones = self
            .fetcher
            .milestones(&opts.target, StateFilter::All)
            .await?;
        for milestone in &source_milestones {
            if target_milestones.iter().any(|m| m.title == milestone.title) {
                continue;
            }
            if opts.dry_run {
                info!("Would add milestone {}.", milestone.title);
                continue;
            }
            let created = self
                .fetcher
                .create_milestone(&opts.target, &NewMilestone::from(milestone))
                .await;
            if let Some(created) = tolerate(report, EntityKind::Milestone, &milestone.title, created)? {
                info!("Added milestone {}.", created.title);
                report.milestones_created += 1;
                target_milestones.push(created);
            }
        }

        Ok(target_milestones)
    }

    async fn map_pipelines(&self) -> Result<Option<ZenhubContext>> {
        let opts = &self.options;
        if !opts.secondary_metadata {
            debug!("Secondary metadata disabled");
            return Ok(None);
        }
        let Some((source_id, target_id)) = opts.zenhub_repos else {
            debug!("No Zenhub repository ids configured");
            return Ok(None);
        };
        if !self.fetcher.has_zenhub() {
            warn!("Zenhub repository ids configured but no Zenhub token; skipping estimates, pipelines and epics");
            return Ok(None);
        }

        let source_board = self.fetcher.board(source_id).await?;
        let target_board = self.fetcher.board(target_id).await?;
        let pipelines = PipelineMap::build(&source_board, &target_board, &opts.pipeline_overrides);
        info!(
            mapped = pipelines.len(),
            unmatched = pipelines.unmatched().len(),
            "Pipeline map complete"
        );

        Ok(Some(ZenhubContext {
            source_id,
            target_id,
            source_board,
            pipelines,
        }))
    }

    async fn create_issues(
        &self,
        issues: &[Issue],
        target_milestones: &[Milestone],
        zenhub: Option<&ZenhubContext>,
        mapping: &mut IdentifierMapping,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let opts = &self.options;
        info!(
            "Starting to write {} issues to {}.",
            issues.len(),
            opts.target
        );

        for issue in issues {
            if mapping.contains(issue.number) {
                warn!(number = issue.number, "Source issue listed twice, skipping");
                continue;
            }

            let milestone = issue.milestone.as_ref().and_then(|wanted| {
                let found = target_milestones
                    .iter()
                    .find(|m| m.title == wanted.title)
                    .map(|m| m.number);
                if found.is_none() {
                    warn!(milestone = %wanted.title, url = %issue.html_url, "No target milestone, omitting it");
                }
                found
            });

            let payload = NewIssue {
                title: issue.title.clone(),
                body: issue_body(issue),
                assignees: issue.assignee_logins(),
                labels: issue.label_names(),
                milestone,
            };

            let created = self.fetcher.create_issue(&opts.target, &payload).await;
            let Some(created) = tolerate(report, EntityKind::Issue, &issue.html_url, created)? else {
                continue;
            };

            mapping.record(issue.number, created.number);
            report.issues_created += 1;
            info!("Copied {} as #{}.", issue.html_url, created.number);

            if let Some(zenhub) = zenhub {
                let events = self
                    .fetcher
                    .issue_events(zenhub.source_id, issue.number)
                    .await;
                if let Some(events) = tolerate(report, EntityKind::Issue, &issue.html_url, events)? {
                    if events.iter().any(|e| e.is_dependency()) {
                        warn!("Check for dependencies: {}.", created.html_url);
                        report.dependency_checks.push(created.number);
                    }
                }
            }

            let comments = self.fetcher.comments(&issue.comments_url).await;
            let Some(comments) = tolerate(report, EntityKind::Comment, &issue.comments_url, comments)?
            else {
                continue;
            };
            for comment in &comments {
                let copied = self
                    .fetcher
                    .create_comment(&created.comments_url, &comment_body(comment))
                    .await;
                if tolerate(report, EntityKind::Comment, &comment.url, copied)?.is_some() {
                    report.comments_copied += 1;
                }
            }
        }

        info!("Finished copying {} issue(s).", mapping.len());
        Ok(())
    }

    /// Re-read every created issue and point its references at the new
    /// repository
    async fn rewrite_target(
        &self,
        mapping: &IdentifierMapping,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let opts = &self.options;
        let rewriter = ReferenceRewriter::new(
            mapping,
            opts.source.repo.clone(),
            opts.source_issues_url(),
            opts.target_issues_url(),
            UnmappedPolicy::RedirectToSource,
        );

        for (source, target) in mapping.iter() {
            let fetched = self.fetcher.issue(&opts.target, target).await;
            let Some(issue) = tolerate(report, EntityKind::Issue, &target.to_string(), fetched)? else {
                continue;
            };

            let mut patched = false;
            if let Some(body) = rewriter.rewrite_changed(issue.body_text(), Some(source)) {
                let updated = self
                    .fetcher
                    .update_issue_body(&opts.target, target, &body)
                    .await;
                patched |= tolerate(report, EntityKind::Issue, &issue.html_url, updated)?.is_some();
            }

            let comments = self.fetcher.comments(&issue.comments_url).await;
            if let Some(comments) = tolerate(report, EntityKind::Comment, &issue.comments_url, comments)? {
                for comment in comments {
                    let Some(body) = rewriter.rewrite_changed(comment.body_text(), None) else {
                        continue;
                    };
                    let updated = self.fetcher.update_comment_body(&comment.url, &body).await;
                    patched |= tolerate(report, EntityKind::Comment, &comment.url, updated)?.is_some();
                }
            }

            if patched {
                info!("Patched issue reference(s) in {}.", issue.html_url);
                report.target_issues_patched += 1;
            }
        }

        Ok(())
    }

    async fn copy_metadata(
        &self,
        issues: &[Issue],
        zenhub: &ZenhubContext,
        mapping: &IdentifierMapping,
        report: &mut MigrationReport,
    ) -> Result<()> {
        self.copy_estimates(issues, zenhub, mapping, report).await?;
        self.assign_pipelines(zenhub, mapping, report).await?;
        self.define_epics(zenhub, mapping, report).await
    }

    async fn copy_estimates(
        &self,
        issues: &[Issue],
        zenhub: &ZenhubContext,
        mapping: &IdentifierMapping,
        report: &mut MigrationReport,
    ) -> Result<()> {
        info!("Now defining the estimates.");
        for issue in issues {
            let Some(target) = mapping.get(issue.number) else {
                continue;
            };
            let info = self
                .fetcher
                .zenhub_issue(zenhub.source_id, issue.number)
                .await;
            let Some(info) = tolerate(report, EntityKind::Estimate, &issue.html_url, info)? else {
                continue;
            };
            let Some(estimate) = info.estimate else {
                continue;
            };

            let set = self
                .fetcher
                .set_estimate(zenhub.target_id, target, estimate.value)
                .await;
            if tolerate(report, EntityKind::Estimate, &issue.html_url, set)?.is_some() {
                debug!(target, estimate = estimate.value, "Set estimate");
                report.estimates_set += 1;
            }
        }
        Ok(())
    }

    async fn assign_pipelines(
        &self,
        zenhub: &ZenhubContext,
        mapping: &IdentifierMapping,
        report: &mut MigrationReport,
    ) -> Result<()> {
        info!("Now, assigning issues to the correct pipeline.");
        for pipeline in &zenhub.source_board.pipelines {
            // New issues already land in the default pipeline
            if pipeline.name == self.options.default_pipeline {
                continue;
            }
            let Some(target_pipeline) = zenhub.pipelines.get(&pipeline.name) else {
                continue;
            };

            for entry in &pipeline.issues {
                let Some(target) = mapping.get(entry.issue_number) else {
                    continue;
                };
                let moved = self
                    .fetcher
                    .move_to_pipeline(zenhub.target_id, target, target_pipeline)
                    .await;
                if tolerate(report, EntityKind::Pipeline, &format!("#{}", target), moved)?.is_some() {
                    debug!(target, pipeline = %pipeline.name, "Assigned pipeline");
                    report.pipeline_moves += 1;
                }
            }
        }
        Ok(())
    }

    async fn define_epics(
        &self,
        zenhub: &ZenhubContext,
        mapping: &IdentifierMapping,
        report: &mut MigrationReport,
    ) -> Result<()> {
        info!("Now, defining epics.");
        let epics = self.fetcher.epics(zenhub.source_id).await?;

        for epic in epics {
            let Some(target) = mapping.get(epic.issue_number) else {
                debug!(epic = epic.issue_number, "Epic was not copied");
                continue;
            };

            let detail = self
                .fetcher
                .epic(zenhub.source_id, epic.issue_number)
                .await;
            let Some(detail) = tolerate(report, EntityKind::Epic, &format!("#{}", epic.issue_number), detail)?
            else {
                continue;
            };

            let mut included = Vec::new();
            let mut excluded = Vec::new();
            for child in &detail.issues {
                match mapping.get(child.issue_number) {
                    Some(mapped) if child.repo_id == zenhub.source_id => included.push(mapped),
                    _ => excluded.push(child.issue_number),
                }
            }

            let converted = self
                .fetcher
                .convert_to_epic(zenhub.target_id, target, &included)
                .await;
            if tolerate(report, EntityKind::Epic, &format!("#{}", target), converted)?.is_none() {
                warn!(
                    epic = target,
                    included = ?included,
                    excluded = ?excluded,
                    "Error creating epic in target repo"
                );
                continue;
            }

            info!("Created epic {} with issues {:?}.", target, included);
            if !excluded.is_empty() {
                warn!(
                    "The following issues were not copied from {} and cannot be added to epic {}: {:?}",
                    self.options.source, target, excluded
                );
            }
            report.epics.push(EpicOutcome {
                source: epic.issue_number,
                target,
                included,
                excluded,
            });
        }
        Ok(())
    }

    /// Close target issues whose source is closed, then the milestones.
    /// Milestones go last since a closed milestone refuses new issues.
    async fn close_mirrored(
        &self,
        issues: &[Issue],
        mapping: &IdentifierMapping,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let opts = &self.options;

        for issue in issues.iter().filter(|i| i.state == State::Closed) {
            let Some(target) = mapping.get(issue.number) else {
                continue;
            };
            let closed = self
                .fetcher
                .set_issue_state(&opts.target, target, State::Closed)
                .await;
            if tolerate(report, EntityKind::Issue, &issue.html_url, closed)?.is_some() {
                info!("Closed issue {}.", target);
                report.issues_closed += 1;
            }
        }

        let source_milestones = self
            .fetcher
            .milestones(&opts.source, StateFilter::All)
            .await?;
        let target_milestones = self
            .fetcher
            .milestones(&opts.target, StateFilter::All)
            .await?;

        for milestone in source_milestones.iter().filter(|m| m.state == State::Closed) {
            let found: Vec<&Milestone> = target_milestones
                .iter()
                .filter(|m| m.title == milestone.title)
                .collect();
            let [found] = found.as_slice() else {
                warn!(
                    "Error: {} instances found for milestone {}.",
                    found.len(),
                    milestone.title
                );
                report.record_error(
                    EntityKind::Milestone,
                    &milestone.title,
                    format!("{} instances found in {}", found.len(), opts.target),
                );
                continue;
            };
            if found.state == State::Closed {
                continue;
            }

            let closed = self
                .fetcher
                .set_milestone_state(&opts.target, found.number, State::Closed)
                .await;
            if tolerate(report, EntityKind::Milestone, &milestone.title, closed)?.is_some() {
                info!("Closed milestone {}.", milestone.title);
                report.milestones_closed += 1;
            }
        }

        Ok(())
    }

    /// Point references in the source repository at copied issues.
    /// References to issues that were not copied are left as written.
    async fn patch_source(
        &self,
        mapping: &IdentifierMapping,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let opts = &self.options;
        let rewriter = ReferenceRewriter::new(
            mapping,
            opts.source.repo.clone(),
            opts.source_issues_url(),
            opts.target_issues_url(),
            UnmappedPolicy::Keep,
        );

        let issues = self.fetcher.issues(&opts.source, StateFilter::All).await?;
        for issue in issues {
            let mut patched = false;
            if let Some(body) = rewriter.rewrite_changed(issue.body_text(), None) {
                let updated = self
                    .fetcher
                    .update_issue_body(&opts.source, issue.number, &body)
                    .await;
                patched |= tolerate(report, EntityKind::Issue, &issue.html_url, updated)?.is_some();
            }

            let comments = self.fetcher.comments(&issue.comments_url).await;
            if let Some(comments) = tolerate(report, EntityKind::Comment, &issue.comments_url, comments)? {
                for comment in comments {
                    let Some(body) = rewriter.rewrite_changed(comment.body_text(), None) else {
                        continue;
                    };
                    let updated = self.fetcher.update_comment_body(&comment.url, &body).await;
                    patched |= tolerate(report, EntityKind::Comment, &comment.url, updated)?.is_some();
                }
            }

            if patched {
                info!("Patched issue reference(s) in {}.", issue.html_url);
                report.source_issues_patched += 1;
            }
        }
        Ok(())
    }

    /// Close every copied source issue with a comment linking its mirror
    async fn close_source(
        &self,
        issues: &[Issue],
        mapping: &IdentifierMapping,
        report: &mut MigrationReport,
    ) -> Result<()> {
        let opts = &self.options;

        for issue in issues {
            let Some(target) = mapping.get(issue.number) else {
                continue;
            };

            let notice = moved_notice(&opts.target.issue_web_url(&opts.web_url, target));
            let commented = self
                .fetcher
                .create_comment(&issue.comments_url, &notice)
                .await;
            tolerate(report, EntityKind::Comment, &issue.html_url, commented)?;

            if issue.state == State::Closed {
                continue;
            }
            let closed = self
                .fetcher
                .set_issue_state(&opts.source, issue.number, State::Closed)
                .await;
            if tolerate(report, EntityKind::Issue, &issue.html_url, closed)?.is_some() {
                info!("Closed source issue {}.", issue.number);
                report.source_issues_closed += 1;
            }
        }
        Ok(())
    }
}

fn enter(phase: MigrationPhase) {
    info!(phase = ?phase, "{}", phase);
}

/// Record a per-entity failure and carry on; pass anything else up
fn tolerate<T>(
    report: &mut MigrationReport,
    kind: EntityKind,
    entity: &str,
    result: Result<T>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_per_entity() => {
            warn!(kind = ?kind, entity, error = %e, "Skipping after error");
            report.record_error(kind, entity, e.to_string());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
