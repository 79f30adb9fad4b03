//! Repository coordinates

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// An `org/repo` pair on GitHub
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub org: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(org: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            repo: repo.into(),
        }
    }

    /// Parse `org/repo`, an HTTPS URL or an SSH remote
    ///
    /// Supported formats:
    /// - `org/repo`
    /// - `https://github.com/org/repo` (trailing path segments are ignored)
    /// - `git@github.com:org/repo.git`
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.starts_with("https://") || input.starts_with("http://") {
            let url = url::Url::parse(input).map_err(|e| Error::Parse(e.to_string()))?;
            let path = url.path().trim_start_matches('/').trim_end_matches(".git");
            let mut parts = path.split('/').filter(|p| !p.is_empty());
            return match (parts.next(), parts.next()) {
                (Some(org), Some(repo)) => Ok(Self::new(org, repo)),
                _ => Err(Error::Parse(format!("Invalid repository URL path: {}", path))),
            };
        }

        if input.starts_with("git@") {
            let path = input
                .split_once(':')
                .map(|(_, path)| path.trim_end_matches(".git"))
                .ok_or_else(|| Error::Parse(format!("Invalid SSH remote: {}", input)))?;
            return Self::parse_pair(path)
                .ok_or_else(|| Error::Parse(format!("Invalid SSH remote: {}", input)));
        }

        Self::parse_pair(input).ok_or_else(|| {
            Error::Parse(format!(
                "Invalid repository format: {}. Expected org/repo",
                input
            ))
        })
    }

    fn parse_pair(value: &str) -> Option<Self> {
        let (org, repo) = value.split_once('/')?;
        let repo = repo.trim_end_matches(".git");
        if org.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self::new(org, repo))
    }

    /// REST path of the repository, relative to the API root
    pub fn api_path(&self) -> String {
        format!("repos/{}/{}", self.org, self.repo)
    }

    /// Browser URL of the repository's issue list
    pub fn issues_web_url(&self, web_url: &str) -> String {
        format!(
            "{}/{}/{}/issues",
            web_url.trim_end_matches('/'),
            self.org,
            self.repo
        )
    }

    /// Browser URL of one issue
    pub fn issue_web_url(&self, web_url: &str, number: u64) -> String {
        format!("{}/{}", self.issues_web_url(web_url), number)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.repo)
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shorthand() {
        let repo = RepoRef::parse("acme/backlog").unwrap();
        assert_eq!(repo, RepoRef::new("acme", "backlog"));
        assert_eq!(repo.to_string(), "acme/backlog");
    }

    #[test]
    fn test_parse_https_url() {
        let repo = RepoRef::parse("https://github.com/acme/backlog").unwrap();
        assert_eq!(repo, RepoRef::new("acme", "backlog"));

        let repo = RepoRef::parse("https://github.com/acme/backlog.git").unwrap();
        assert_eq!(repo.repo, "backlog");

        let repo = RepoRef::parse("https://ghe.example.com/acme/backlog/issues/12").unwrap();
        assert_eq!(repo, RepoRef::new("acme", "backlog"));
    }

    #[test]
    fn test_parse_ssh_remote() {
        let repo = RepoRef::parse("git@github.com:acme/backlog.git").unwrap();
        assert_eq!(repo, RepoRef::new("acme", "backlog"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(RepoRef::parse("backlog").is_err());
        assert!(RepoRef::parse("acme/").is_err());
        assert!(RepoRef::parse("a/b/c").is_err());
        assert!(RepoRef::parse("https://github.com/acme").is_err());
    }

    #[test]
    fn test_urls() {
        let repo = RepoRef::new("acme", "backlog");
        assert_eq!(repo.api_path(), "repos/acme/backlog");
        assert_eq!(
            repo.issues_web_url("https://github.com/"),
            "https://github.com/acme/backlog/issues"
        );
        assert_eq!(
            repo.issue_web_url("https://github.com", 9),
            "https://github.com/acme/backlog/issues/9"
        );
    }
}
