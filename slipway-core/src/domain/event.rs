//! Live-update event types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload published on a job's channel
///
/// Observers receive either an output increment or the final summary, so
/// they can render progress without re-reading the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobEvent {
    /// An increment of process output, not the whole buffer.
    Output { chunk: String },
    /// Terminal summary, emitted once when the job completes.
    Completed(CompletionSummary),
}

/// Final state of a completed job
///
/// Handed to live observers and to each configured notification target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub job_id: Uuid,
    pub success: bool,
    pub exit_status: i32,
    pub output: String,
}
