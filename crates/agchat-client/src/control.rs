use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::transport::Transport;

/// Client for the service control plane: agent/knowledge-base listings and
/// ingestion jobs.
pub struct ControlPlaneClient {
    transport: Transport,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseSummary {
    pub knowledge_base_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub agent_id: String,
    pub agent_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAliasSummary {
    pub agent_alias_id: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceSummary {
    pub data_source_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestionJobStatus {
    Starting,
    InProgress,
    Complete,
    Failed,
    #[serde(other)]
    Unknown,
}

impl IngestionJobStatus {
    fn is_terminal(&self) -> bool {
        matches!(self, IngestionJobStatus::Complete | IngestionJobStatus::Failed)
    }
}

impl fmt::Display for IngestionJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestionJobStatus::Starting => write!(f, "STARTING"),
            IngestionJobStatus::InProgress => write!(f, "IN_PROGRESS"),
            IngestionJobStatus::Complete => write!(f, "COMPLETE"),
            IngestionJobStatus::Failed => write!(f, "FAILED"),
            IngestionJobStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionJobSummary {
    #[serde(default)]
    pub ingestion_job_id: Option<String>,
    pub status: IngestionJobStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// List envelopes, matching the service's response shapes.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeBaseList {
    #[serde(default)]
    knowledge_base_summaries: Vec<KnowledgeBaseSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentList {
    #[serde(default)]
    agent_summaries: Vec<AgentSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentAliasList {
    #[serde(default)]
    agent_alias_summaries: Vec<AgentAliasSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataSourceList {
    #[serde(default)]
    data_source_summaries: Vec<DataSourceSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestionJobList {
    #[serde(default)]
    ingestion_job_summaries: Vec<IngestionJobSummary>,
}

/// Terminal state of one ingestion sync run.
///
/// Every variant except `Completed` is a user-visible failure state, but
/// none of them poison the session — the user may fix the cause and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed,
    Failed,
    NoDataSource,
    NoIngestionJobs,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Completed => write!(f, "Sync completed successfully"),
            SyncOutcome::Failed => write!(f, "Sync failed"),
            SyncOutcome::NoDataSource => write!(f, "No data source found for ingestion"),
            SyncOutcome::NoIngestionJobs => write!(f, "No ingestion jobs found after sync"),
        }
    }
}

impl ControlPlaneClient {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn list_knowledge_bases(&self) -> Result<Vec<KnowledgeBaseSummary>> {
        let response = Transport::check_status(self.transport.get("/knowledge-bases").send()?)?;
        let list: KnowledgeBaseList = response.json()?;
        Ok(list.knowledge_base_summaries)
    }

    pub fn list_agents(&self) -> Result<Vec<AgentSummary>> {
        let response = Transport::check_status(self.transport.get("/agents").send()?)?;
        let list: AgentList = response.json()?;
        Ok(list.agent_summaries)
    }

    pub fn list_agent_aliases(&self, agent_id: &str) -> Result<Vec<AgentAliasSummary>> {
        let path = format!("/agents/{}/aliases", agent_id);
        let response = Transport::check_status(self.transport.get(&path).send()?)?;
        let list: AgentAliasList = response.json()?;
        Ok(list.agent_alias_summaries)
    }

    pub fn list_data_sources(&self, knowledge_base_id: &str) -> Result<Vec<DataSourceSummary>> {
        let path = format!("/knowledge-bases/{}/data-sources", knowledge_base_id);
        let response = Transport::check_status(self.transport.get(&path).send()?)?;
        let list: DataSourceList = response.json()?;
        Ok(list.data_source_summaries)
    }

    pub fn start_ingestion_job(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<()> {
        let path = format!(
            "/knowledge-bases/{}/data-sources/{}/ingestion-jobs",
            knowledge_base_id, data_source_id
        );
        Transport::check_status(self.transport.post(&path).send()?)?;
        Ok(())
    }

    pub fn list_ingestion_jobs(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<Vec<IngestionJobSummary>> {
        let path = format!(
            "/knowledge-bases/{}/data-sources/{}/ingestion-jobs",
            knowledge_base_id, data_source_id
        );
        let response = Transport::check_status(self.transport.get(&path).send()?)?;
        let list: IngestionJobList = response.json()?;
        Ok(list.ingestion_job_summaries)
    }

    /// Resolve a knowledge base by its configured name.
    pub fn find_knowledge_base(&self, name: &str) -> Result<Option<KnowledgeBaseSummary>> {
        Ok(self
            .list_knowledge_bases()?
            .into_iter()
            .find(|kb| kb.name == name))
    }

    /// Resolve an agent by name together with its most recently updated
    /// alias. Returns None when either lookup comes up empty.
    pub fn find_agent(&self, name: &str) -> Result<Option<(AgentSummary, AgentAliasSummary)>> {
        let Some(agent) = self
            .list_agents()?
            .into_iter()
            .find(|a| a.agent_name == name)
        else {
            return Ok(None);
        };

        let mut aliases = self.list_agent_aliases(&agent.agent_id)?;
        aliases.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        Ok(aliases.into_iter().next().map(|alias| (agent, alias)))
    }

    /// Re-index the knowledge base: start an ingestion job on its first
    /// data source, then poll until the latest job reaches a terminal
    /// state.
    ///
    /// Blocks the calling thread between polls. There is no in-session
    /// cancellation — the poll loop runs until the job terminates or the
    /// process does. `on_poll` is invoked once per poll round with the
    /// latest observed status, so the UI can show progress.
    pub fn sync_knowledge_base(
        &self,
        knowledge_base_id: &str,
        poll_interval: Duration,
        mut on_poll: impl FnMut(IngestionJobStatus),
    ) -> Result<SyncOutcome> {
        let data_sources = self.list_data_sources(knowledge_base_id)?;
        let Some(source) = data_sources.first() else {
            return Ok(SyncOutcome::NoDataSource);
        };

        self.start_ingestion_job(knowledge_base_id, &source.data_source_id)?;

        loop {
            let jobs = self.list_ingestion_jobs(knowledge_base_id, &source.data_source_id)?;
            let Some(latest) = jobs.first() else {
                return Ok(SyncOutcome::NoIngestionJobs);
            };

            on_poll(latest.status);

            if latest.status.is_terminal() {
                return Ok(match latest.status {
                    IngestionJobStatus::Complete => SyncOutcome::Completed,
                    _ => SyncOutcome::Failed,
                });
            }

            std::thread::sleep(poll_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_wire_spelling() {
        let status: IngestionJobStatus = serde_json::from_str("\"COMPLETE\"").unwrap();
        assert_eq!(status, IngestionJobStatus::Complete);
        let status: IngestionJobStatus = serde_json::from_str("\"IN_PROGRESS\"").unwrap();
        assert_eq!(status, IngestionJobStatus::InProgress);
        // Unrecognized statuses degrade instead of failing the poll loop
        let status: IngestionJobStatus = serde_json::from_str("\"SOMETHING_NEW\"").unwrap();
        assert_eq!(status, IngestionJobStatus::Unknown);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(IngestionJobStatus::Complete.is_terminal());
        assert!(IngestionJobStatus::Failed.is_terminal());
        assert!(!IngestionJobStatus::Starting.is_terminal());
        assert!(!IngestionJobStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_list_envelopes_tolerate_missing_fields() {
        let list: IngestionJobList = serde_json::from_str("{}").unwrap();
        assert!(list.ingestion_job_summaries.is_empty());

        let list: KnowledgeBaseList = serde_json::from_str(
            r#"{"knowledgeBaseSummaries": [{"knowledgeBaseId": "kb-1", "name": "docs"}]}"#,
        )
        .unwrap();
        assert_eq!(list.knowledge_base_summaries[0].knowledge_base_id, "kb-1");
    }
}
