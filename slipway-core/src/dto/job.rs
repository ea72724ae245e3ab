//! Job DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::job::{self, Job};

/// Request to create a new job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    pub repo: String,
    pub branch: Option<String>,
    pub config: Option<HashMap<String, String>>,
    pub script: Option<String>,
    pub notify: Vec<String>,
    pub restarted_from: Option<Uuid>,
}

impl CreateJob {
    /// Request with only a repo set; everything else takes defaults.
    pub fn for_repo(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: None,
            config: None,
            script: None,
            notify: vec![],
            restarted_from: None,
        }
    }

    /// Request cloning `job`'s static configuration for a fresh run.
    ///
    /// Run-time state (output, exit status) is never carried over.
    pub fn restart_of(job: &Job) -> Self {
        Self {
            repo: job.repo.clone(),
            branch: Some(job.branch.clone()),
            config: Some(job.config.clone()),
            script: job.script.clone(),
            notify: job.notify.clone(),
            restarted_from: Some(job.id),
        }
    }

    /// Builds the initial record, applying field defaults.
    ///
    /// The id is assigned by the persistence layer, never by the caller.
    pub fn into_job(self, id: Uuid) -> Job {
        Job {
            id,
            repo: self.repo,
            branch: self
                .branch
                .unwrap_or_else(|| job::DEFAULT_BRANCH.to_string()),
            config: self.config.unwrap_or_else(job::default_config),
            script: self.script,
            output: String::new(),
            exit_status: None,
            notify: self.notify,
            created_at: chrono::Utc::now(),
            restarted_from: self.restarted_from,
        }
    }
}

/// Presentation view of a job
///
/// `output` can be arbitrarily large, so summary views omit it unless the
/// caller asks for it explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobView {
    pub id: Uuid,
    pub repo: String,
    pub branch: String,
    pub config: HashMap<String, String>,
    pub exit_status: Option<i32>,
    pub done: bool,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl JobView {
    pub fn from_job(job: &Job, include_output: bool) -> Self {
        Self {
            id: job.id,
            repo: job.repo.clone(),
            branch: job.branch.clone(),
            config: job.config.clone(),
            exit_status: job.exit_status,
            done: job.done(),
            success: job.success(),
            output: include_output.then(|| job.output.clone()),
        }
    }
}
