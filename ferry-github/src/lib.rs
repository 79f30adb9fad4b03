//! Ferry GitHub - GitHub and Zenhub access for Ferry
//!
//! This crate provides a rate-limit-aware client for paginated JSON APIs,
//! typed fetchers for issues, comments, labels, milestones and Zenhub board
//! data, and the engine that migrates issues between repositories.

mod client;
mod clock;
mod error;
mod fetcher;
mod mapping;
mod migrate;
mod models;
mod paging;
mod repo;
mod rewrite;
mod transport;
mod zenhub;

#[cfg(test)]
mod testing;

pub use client::{ApiClient, ClientConfig, RateLimitStyle};
pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
pub use fetcher::{EntityFetcher, UserCache};
pub use mapping::{IdentifierMapping, LogMappingSink, MappingSink};
pub use migrate::{
    comment_body, issue_body, moved_notice, EntityError, EntityKind, EpicOutcome, ExcludeLabels,
    IncludeAll, InclusionPredicate, MigrationOptions, MigrationPhase, MigrationReport, Migrator,
    PipelineMap,
};
pub use models::{
    Comment, Commit, CommitAuthor, CommitDetail, Issue, Label, Milestone, NewIssue, NewMilestone,
    PullRequest, PullRequestLink, State, StateFilter, User,
};
pub use paging::{FetchOptions, ListBody, LogProgress, ProgressSink, SilentProgress};
pub use repo::RepoRef;
pub use rewrite::{referenced_numbers, ReferenceRewriter, UnmappedPolicy};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError};
pub use zenhub::{
    Board, EpicDetail, EpicList, EpicRef, Estimate, IssueEvent, Pipeline, PipelineIssue,
    PipelineRef, ZenhubIssue, DEFAULT_PIPELINE,
};
