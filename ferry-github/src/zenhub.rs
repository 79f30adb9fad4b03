//! Zenhub board, estimate and epic access
//!
//! Zenhub keys repositories by GitHub's numeric repository id and issues
//! by their GitHub issue number.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::fetcher::EntityFetcher;
use crate::models::decode;
use crate::Result;

/// Name of the column every new issue lands in
pub const DEFAULT_PIPELINE: &str = "New Issues";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineIssue {
    pub issue_number: u64,
    #[serde(default)]
    pub estimate: Option<Estimate>,
    #[serde(default)]
    pub is_epic: bool,
}

/// One board column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub issues: Vec<PipelineIssue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
}

impl Board {
    pub fn pipeline_named(&self, name: &str) -> Vec<&Pipeline> {
        self.pipelines.iter().filter(|p| p.name == name).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRef {
    #[serde(default)]
    pub pipeline_id: Option<String>,
    pub name: String,
}

/// Zenhub data attached to one issue
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZenhubIssue {
    #[serde(default)]
    pub estimate: Option<Estimate>,
    #[serde(default)]
    pub pipeline: Option<PipelineRef>,
    #[serde(default)]
    pub is_epic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueEvent {
    #[serde(rename = "type")]
    pub kind: String,
}

impl IssueEvent {
    /// True for events that add a blocking relationship
    pub fn is_dependency(&self) -> bool {
        matches!(self.kind.as_str(), "addBlocking" | "addBlockedBy")
    }
}

/// Issue reference inside an epic listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicRef {
    pub issue_number: u64,
    pub repo_id: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EpicList {
    #[serde(default)]
    pub epic_issues: Vec<EpicRef>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EpicDetail {
    #[serde(default)]
    pub issues: Vec<EpicRef>,
}

impl EntityFetcher {
    pub async fn board(&self, repo_id: u64) -> Result<Board> {
        let value = self
            .zenhub()?
            .get(&format!("p1/repositories/{}/board", repo_id))
            .await?;
        decode(&format!("board of repository {}", repo_id), value)
    }

    pub async fn epics(&self, repo_id: u64) -> Result<Vec<EpicRef>> {
        let value = self
            .zenhub()?
            .get(&format!("p1/repositories/{}/epics", repo_id))
            .await?;
        let list: EpicList = decode(&format!("epics of repository {}", repo_id), value)?;
        Ok(list.epic_issues)
    }

    pub async fn epic(&self, repo_id: u64, number: u64) -> Result<EpicDetail> {
        let value = self
            .zenhub()?
            .get(&format!("p1/repositories/{}/epics/{}", repo_id, number))
            .await?;
        decode(&format!("epic {}", number), value)
    }

    pub async fn zenhub_issue(&self, repo_id: u64, number: u64) -> Result<ZenhubIssue> {
        let value = self
            .zenhub()?
            .get(&format!("p1/repositories/{}/issues/{}", repo_id, number))
            .await?;
        decode(&format!("zenhub issue {}", number), value)
    }

    pub async fn issue_events(&self, repo_id: u64, number: u64) -> Result<Vec<IssueEvent>> {
        let value = self
            .zenhub()?
            .get(&format!(
                "p1/repositories/{}/issues/{}/events",
                repo_id, number
            ))
            .await?;
        decode(&format!("events of issue {}", number), value)
    }

    pub async fn set_estimate(&self, repo_id: u64, number: u64, estimate: f64) -> Result<()> {
        self.zenhub()?
            .put(
                &format!("p1/repositories/{}/issues/{}/estimate", repo_id, number),
                &json!({ "estimate": estimate }),
            )
            .await?;
        Ok(())
    }

    /// Move an issue to the bottom of a pipeline
    pub async fn move_to_pipeline(
        &self,
        repo_id: u64,
        number: u64,
        pipeline_id: &str,
    ) -> Result<()> {
        self.zenhub()?
            .post(
                &format!("p1/repositories/{}/issues/{}/moves", repo_id, number),
                &json!({ "pipeline_id": pipeline_id, "position": "bottom" }),
            )
            .await?;
        Ok(())
    }

    /// Turn an issue into an epic owning `children` of the same repository
    pub async fn convert_to_epic(&self, repo_id: u64, number: u64, children: &[u64]) -> Result<()> {
        let issues: Vec<EpicRef> = children
            .iter()
            .map(|&issue_number| EpicRef {
                issue_number,
                repo_id,
            })
            .collect();
        self.zenhub()?
            .post(
                &format!(
                    "p1/repositories/{}/issues/{}/convert_to_epic",
                    repo_id, number
                ),
                &json!({ "issues": issues }),
            )
            .await?;
        Ok(())
    }
}
