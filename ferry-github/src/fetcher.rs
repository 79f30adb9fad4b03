//! Typed reads and writes over the paginated client
//!
//! Each method fixes the endpoint and the default query for one resource
//! kind. No migration logic lives here.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::models::{
    decode, decode_all, Comment, Commit, Issue, Label, Milestone, NewIssue, NewMilestone,
    PullRequest, State, StateFilter, User,
};
use crate::paging::FetchOptions;
use crate::repo::RepoRef;
use crate::{Error, Result};

/// Run-scoped cache of user lookups. Entries are never evicted.
#[derive(Debug, Default)]
pub struct UserCache {
    users: Mutex<HashMap<String, User>>,
}

impl UserCache {
    pub fn get(&self, login: &str) -> Option<User> {
        self.lock().get(login).cloned()
    }

    pub fn insert(&self, user: User) {
        self.lock().insert(user.login.clone(), user);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, User>> {
        // A poisoned map still holds valid entries
        self.users
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Entity-level access to GitHub and, when configured, Zenhub
pub struct EntityFetcher {
    pub(crate) github: ApiClient,
    pub(crate) zenhub: Option<ApiClient>,
    per_page: u32,
    users: UserCache,
}

impl EntityFetcher {
    pub fn new(github: ApiClient, zenhub: Option<ApiClient>, per_page: u32) -> Self {
        Self {
            github,
            zenhub,
            per_page: per_page.clamp(1, 100),
            users: UserCache::default(),
        }
    }

    pub fn github(&self) -> &ApiClient {
        &self.github
    }

    pub fn has_zenhub(&self) -> bool {
        self.zenhub.is_some()
    }

    pub fn user_cache(&self) -> &UserCache {
        &self.users
    }

    fn per_page(&self) -> (&'static str, String) {
        ("per_page", self.per_page.to_string())
    }

    /// Issues of a repository, oldest first. Pull requests are included;
    /// callers filter with [`Issue::is_pull_request`].
    pub async fn issues(&self, repo: &RepoRef, state: StateFilter) -> Result<Vec<Issue>> {
        let values = self
            .github
            .fetch(
                &format!("{}/issues", repo.api_path()),
                &[
                    ("state", state.as_str().to_string()),
                    ("direction", "asc".to_string()),
                    self.per_page(),
                ],
                FetchOptions::all(),
            )
            .await?;
        debug!(repo = %repo, count = values.len(), "Fetched issues");
        decode_all("issue", values)
    }

    pub async fn issue(&self, repo: &RepoRef, number: u64) -> Result<Issue> {
        let value = self
            .github
            .get(&format!("{}/issues/{}", repo.api_path(), number))
            .await?;
        decode(&format!("issue {}#{}", repo, number), value)
    }

    /// All comments behind an issue's `comments_url`, oldest first
    pub async fn comments(&self, comments_url: &str) -> Result<Vec<Comment>> {
        let values = self
            .github
            .fetch(comments_url, &[self.per_page()], FetchOptions::all())
            .await?;
        decode_all("comment", values)
    }

    pub async fn labels(&self, repo: &RepoRef) -> Result<Vec<Label>> {
        let values = self
            .github
            .fetch(
                &format!("{}/labels", repo.api_path()),
                &[self.per_page()],
                FetchOptions::all(),
            )
            .await?;
        decode_all("label", values)
    }

    pub async fn milestones(&self, repo: &RepoRef, state: StateFilter) -> Result<Vec<Milestone>> {
        let values = self
            .github
            .fetch(
                &format!("{}/milestones", repo.api_path()),
                &[("state", state.as_str().to_string()), self.per_page()],
                FetchOptions::all(),
            )
            .await?;
        decode_all("milestone", values)
    }

    pub async fn pulls(&self, repo: &RepoRef, state: StateFilter) -> Result<Vec<PullRequest>> {
        let values = self
            .github
            .fetch(
                &format!("{}/pulls", repo.api_path()),
                &[("state", state.as_str().to_string()), self.per_page()],
                FetchOptions::all(),
            )
            .await?;
        decode_all("pull request", values)
    }

    /// Commits on the default branch, optionally limited to an ISO 8601
    /// window. An empty repository yields no commits.
    pub async fn commits(
        &self,
        repo: &RepoRef,
        since: Option<&str>,
        until: Option<&str>,
        options: FetchOptions,
    ) -> Result<Vec<Commit>> {
        let mut query = vec![self.per_page()];
        if let Some(since) = since {
            query.push(("since", since.to_string()));
        }
        if let Some(until) = until {
            query.push(("until", until.to_string()));
        }

        let values = self
            .github
            .fetch(&format!("{}/commits", repo.api_path()), &query, options)
            .await?;
        decode_all("commit", values)
    }

    /// Look a user up, answering repeated logins from the cache
    pub async fn user(&self, login: &str) -> Result<User> {
        if let Some(user) = self.users.get(login) {
            return Ok(user);
        }

        let value = self.github.get(&format!("users/{}", login)).await?;
        let user: User = decode(&format!("user {}", login), value)?;
        self.users.insert(user.clone());
        Ok(user)
    }

    pub async fn create_label(&self, repo: &RepoRef, label: &Label) -> Result<Label> {
        let value = self
            .github
            .post(
                &format!("{}/labels", repo.api_path()),
                &json!({ "name": label.name, "color": label.color }),
            )
            .await?;
        decode("created label", value)
    }

    pub async fn create_milestone(
        &self,
        repo: &RepoRef,
        milestone: &NewMilestone,
    ) -> Result<Milestone> {
        let value = self
            .github
            .post(
                &format!("{}/milestones", repo.api_path()),
                &to_value(milestone)?,
            )
            .await?;
        decode("created milestone", value)
    }

    pub async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue> {
        let value = self
            .github
            .post(&format!("{}/issues", repo.api_path()), &to_value(issue)?)
            .await?;
        decode("created issue", value)
    }

    pub async fn create_comment(&self, comments_url: &str, body: &str) -> Result<Comment> {
        let value = self
            .github
            .post(comments_url, &json!({ "body": body }))
            .await?;
        decode("created comment", value)
    }

    pub async fn update_issue_body(&self, repo: &RepoRef, number: u64, body: &str) -> Result<()> {
        self.github
            .patch(
                &format!("{}/issues/{}", repo.api_path(), number),
                &json!({ "body": body }),
            )
            .await?;
        Ok(())
    }

    /// Replace a comment's body; `comment_url` is the comment's API URL
    pub async fn update_comment_body(&self, comment_url: &str, body: &str) -> Result<()> {
        self.github
            .patch(comment_url, &json!({ "body": body }))
            .await?;
        Ok(())
    }

    pub async fn set_issue_state(&self, repo: &RepoRef, number: u64, state: State) -> Result<()> {
        self.github
            .patch(
                &format!("{}/issues/{}", repo.api_path(), number),
                &json!({ "state": state.as_str() }),
            )
            .await?;
        Ok(())
    }

    pub async fn set_milestone_state(
        &self,
        repo: &RepoRef,
        number: u64,
        state: State,
    ) -> Result<()> {
        self.github
            .patch(
                &format!("{}/milestones/{}", repo.api_path(), number),
                &json!({ "state": state.as_str() }),
            )
            .await?;
        Ok(())
    }

    pub(crate) fn zenhub(&self) -> Result<&ApiClient> {
        self.zenhub
            .as_ref()
            .ok_or_else(|| Error::Config("Zenhub is not configured".to_string()))
    }
}

fn to_value<T: serde::Serialize>(payload: &T) -> Result<serde_json::Value> {
    serde_json::to_value(payload).map_err(|e| Error::decode("request payload", e))
}
