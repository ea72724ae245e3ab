//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Prefix of the per-job live-update channel name.
const CHANNEL_PREFIX: &str = "private-job-";

/// Branch used when a job request does not name one.
pub const DEFAULT_BRANCH: &str = "master";

/// Environment applied when a job request carries no config.
pub fn default_config() -> HashMap<String, String> {
    HashMap::from([("ENVIRONMENT".to_string(), "production".to_string())])
}

/// Deploy job record
///
/// Structure shared between the store (persists) and the lifecycle services
/// (mutate via field-level updates). A job is created running, accumulates
/// output while its script executes, and becomes terminal when an exit
/// status is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub repo: String,
    pub branch: String,
    /// Environment passed to the deploy script.
    pub config: HashMap<String, String>,
    /// Script body; `None` falls back to the process-wide default at read time.
    pub script: Option<String>,
    /// Append-only output buffer; prior bytes are never rewritten.
    pub output: String,
    /// Absent while running; written exactly once on completion.
    pub exit_status: Option<i32>,
    /// Targets that receive the completion summary.
    pub notify: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Id of the job this one was restarted from, if any. Lookup only; the
    /// records share no run-time state.
    pub restarted_from: Option<Uuid>,
}

/// Process-wide fallbacks, threaded explicitly into read paths rather than
/// read from ambient global state.
#[derive(Debug, Clone)]
pub struct Defaults {
    /// Script used by jobs that never set their own.
    pub script: String,
}

impl Job {
    /// Whether the job has completed.
    pub fn done(&self) -> bool {
        self.exit_status.is_some()
    }

    /// Whether the job completed with exit status 0.
    pub fn success(&self) -> bool {
        self.exit_status == Some(0)
    }

    /// Channel where this job's live updates are published.
    pub fn channel(&self) -> String {
        format!("{}{}", CHANNEL_PREFIX, self.id)
    }

    /// The script to run, falling back to the process-wide default.
    ///
    /// The fallback is resolved at read time, not stored, so a changed
    /// default applies to every job that never set its own script.
    pub fn script_or_default<'a>(&'a self, defaults: &'a Defaults) -> &'a str {
        match self.script.as_deref() {
            Some(script) if !script.is_empty() => script,
            _ => &defaults.script,
        }
    }
}
