//! Job Service
//!
//! Business logic for the deploy-job lifecycle: output accumulation while
//! the script runs, a single terminal completion, and restarts that clone a
//! job's static configuration into a fresh record.

use slipway_core::domain::event::{CompletionSummary, JobEvent};
use slipway_core::domain::job::Job;
use slipway_core::dto::job::CreateJob;
use uuid::Uuid;

use crate::error::Result;
use crate::repository::JobStore;
use crate::service::broadcast::Publisher;
use crate::service::notify::{self, Notifier};

/// Create and persist a new job
pub async fn create_job(store: &dyn JobStore, req: CreateJob) -> Result<Job> {
    let job = store.create(req).await?;

    tracing::info!("Job created: {} for repo: {}", job.id, job.repo);

    Ok(job)
}

/// Get a job by ID
pub async fn get_job(store: &dyn JobStore, id: Uuid) -> Result<Job> {
    store.get(id).await
}

/// Append a chunk of process output to a job
///
/// The chunk is persisted first, then broadcast on the job's channel so
/// observers can render incrementally without re-reading the full record.
/// Broadcast failures are logged and never fail the append; a persistence
/// failure surfaces to the caller untouched, and any retry belongs to the
/// caller.
///
/// Chunks arriving after completion are still accepted: draining a process
/// pipe after exit is normal and must not contest the terminal status.
pub async fn append_output(
    store: &dyn JobStore,
    publisher: &dyn Publisher,
    id: Uuid,
    chunk: &str,
) -> Result<Job> {
    let job = store.append_output(id, chunk).await?;

    let event = JobEvent::Output {
        chunk: chunk.to_string(),
    };
    if let Err(err) = publisher.publish(&job.channel(), event).await {
        tracing::warn!("Failed to broadcast output for job {}: {}", id, err);
    }

    tracing::debug!("Appended {} bytes of output to job {}", chunk.len(), id);

    Ok(job)
}

/// Complete a job with the exit status of its process
///
/// The exit status is written exactly once; a second completion attempt
/// fails with `AlreadyCompleted` and leaves the recorded value alone. Once
/// the status is persisted the completion is committed: the summary
/// broadcast and the per-target notifications that follow are best-effort
/// and never roll it back.
pub async fn complete_job(
    store: &dyn JobStore,
    publisher: &dyn Publisher,
    notifier: &dyn Notifier,
    id: Uuid,
    exit_status: i32,
) -> Result<Job> {
    let job = store.record_exit_status(id, exit_status).await?;

    let summary = CompletionSummary {
        job_id: job.id,
        success: job.success(),
        exit_status,
        output: job.output.clone(),
    };

    let event = JobEvent::Completed(summary.clone());
    if let Err(err) = publisher.publish(&job.channel(), event).await {
        tracing::warn!("Failed to broadcast completion for job {}: {}", id, err);
    }

    notify::notify_all(notifier, &job.notify, &summary).await;

    tracing::info!("Job {} completed with exit status: {}", id, exit_status);

    Ok(job)
}

/// Restart a job
///
/// Creates a sibling record from the source job's static configuration
/// (repo, branch, config, script, notify) with fresh run-time state and a
/// new id. The source record is left untouched; restarting a still-running
/// job is allowed and simply yields a second, independent run.
pub async fn restart_job(store: &dyn JobStore, id: Uuid) -> Result<Job> {
    let source = store.get(id).await?;
    let job = store.create(CreateJob::restart_of(&source)).await?;

    tracing::info!("Job {} restarted as {}", id, job.id);

    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryJobStore;
    use crate::service::broadcast::ChannelPublisher;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct RecordingNotifier {
        delivered: Mutex<Vec<(String, CompletionSummary)>>,
        failing: Option<String>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
                failing: None,
            }
        }

        fn failing_on(target: &str) -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
                failing: Some(target.to_string()),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, target: &str, summary: &CompletionSummary) -> anyhow::Result<()> {
            if self.failing.as_deref() == Some(target) {
                anyhow::bail!("target unreachable");
            }
            self.delivered
                .lock()
                .unwrap()
                .push((target.to_string(), summary.clone()));
            Ok(())
        }
    }

    fn deploy_request() -> CreateJob {
        CreateJob {
            repo: "acme/site".to_string(),
            branch: None,
            config: None,
            script: Some("bin/deploy".to_string()),
            notify: vec![],
            restarted_from: None,
        }
    }

    #[tokio::test]
    async fn test_append_accumulates_chunks_in_order() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();
        let job = create_job(&store, deploy_request()).await.unwrap();

        append_output(&store, &publisher, job.id, "one ").await.unwrap();
        append_output(&store, &publisher, job.id, "").await.unwrap();
        let job = append_output(&store, &publisher, job.id, "two").await.unwrap();

        assert_eq!(job.output, "one two");
    }

    #[tokio::test]
    async fn test_append_broadcasts_each_chunk() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();
        let job = create_job(&store, deploy_request()).await.unwrap();
        let mut rx = publisher.subscribe(&job.channel());

        append_output(&store, &publisher, job.id, "first\n").await.unwrap();
        append_output(&store, &publisher, job.id, "second\n").await.unwrap();

        for expected in ["first\n", "second\n"] {
            match rx.recv().await.unwrap() {
                JobEvent::Output { chunk } => assert_eq!(chunk, expected),
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_append_to_unknown_job() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();

        let err = append_output(&store, &publisher, Uuid::new_v4(), "chunk")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_complete_makes_job_terminal() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();
        let notifier = RecordingNotifier::new();
        let job = create_job(&store, deploy_request()).await.unwrap();
        let mut rx = publisher.subscribe(&job.channel());

        append_output(&store, &publisher, job.id, "deployed\n").await.unwrap();
        let job = complete_job(&store, &publisher, &notifier, job.id, 0)
            .await
            .unwrap();

        assert!(job.done());
        assert!(job.success());
        assert_eq!(job.exit_status, Some(0));

        // Chunk first, then exactly one completion summary.
        assert!(matches!(rx.recv().await.unwrap(), JobEvent::Output { .. }));
        match rx.recv().await.unwrap() {
            JobEvent::Completed(summary) => {
                assert_eq!(summary.job_id, job.id);
                assert!(summary.success);
                assert_eq!(summary.output, "deployed\n");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_a_failure() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();
        let notifier = RecordingNotifier::new();
        let job = create_job(&store, deploy_request()).await.unwrap();

        let job = complete_job(&store, &publisher, &notifier, job.id, 2)
            .await
            .unwrap();

        assert!(job.done());
        assert!(!job.success());
    }

    #[tokio::test]
    async fn test_double_completion_never_overwrites() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();
        let notifier = RecordingNotifier::new();
        let job = create_job(&store, deploy_request()).await.unwrap();

        complete_job(&store, &publisher, &notifier, job.id, 0)
            .await
            .unwrap();
        let err = complete_job(&store, &publisher, &notifier, job.id, 1)
            .await
            .unwrap_err();

        assert!(err.is_already_completed());
        let job = get_job(&store, job.id).await.unwrap();
        assert_eq!(job.exit_status, Some(0));
    }

    #[tokio::test]
    async fn test_complete_unknown_job() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();
        let notifier = RecordingNotifier::new();

        let err = complete_job(&store, &publisher, &notifier, Uuid::new_v4(), 0)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_append_after_completion_is_accepted() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();
        let notifier = RecordingNotifier::new();
        let job = create_job(&store, deploy_request()).await.unwrap();

        append_output(&store, &publisher, job.id, "running\n").await.unwrap();
        complete_job(&store, &publisher, &notifier, job.id, 0)
            .await
            .unwrap();

        // Trailing pipe drain after process exit.
        let job = append_output(&store, &publisher, job.id, "tail\n").await.unwrap();

        assert_eq!(job.output, "running\ntail\n");
        assert_eq!(job.exit_status, Some(0));
    }

    #[tokio::test]
    async fn test_complete_notifies_each_target_once() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();
        let notifier = RecordingNotifier::new();

        let mut req = deploy_request();
        req.notify = vec!["first".to_string(), "second".to_string()];
        let job = create_job(&store, req).await.unwrap();

        complete_job(&store, &publisher, &notifier, job.id, 0)
            .await
            .unwrap();

        let delivered = notifier.delivered.lock().unwrap();
        let targets: Vec<&str> = delivered.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(targets, vec!["first", "second"]);
        assert!(delivered.iter().all(|(_, s)| s.success));
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_completion() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();
        let notifier = RecordingNotifier::failing_on("first");

        let mut req = deploy_request();
        req.notify = vec!["first".to_string(), "second".to_string()];
        let job = create_job(&store, req).await.unwrap();

        let job = complete_job(&store, &publisher, &notifier, job.id, 0)
            .await
            .unwrap();

        assert!(job.done());
        let delivered = notifier.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, "second");
    }

    #[tokio::test]
    async fn test_restart_clones_static_configuration() {
        let store = InMemoryJobStore::new();
        let publisher = ChannelPublisher::new();
        let notifier = RecordingNotifier::new();

        let req = CreateJob {
            repo: "r".to_string(),
            branch: Some("b".to_string()),
            config: Some(HashMap::from([("K".to_string(), "V".to_string())])),
            script: Some("s".to_string()),
            notify: vec!["t".to_string()],
            restarted_from: None,
        };
        let source = create_job(&store, req).await.unwrap();
        append_output(&store, &publisher, source.id, "old output").await.unwrap();
        complete_job(&store, &publisher, &notifier, source.id, 1)
            .await
            .unwrap();

        let restarted = restart_job(&store, source.id).await.unwrap();

        assert_ne!(restarted.id, source.id);
        assert_eq!(restarted.repo, "r");
        assert_eq!(restarted.branch, "b");
        assert_eq!(restarted.config.get("K"), Some(&"V".to_string()));
        assert_eq!(restarted.script.as_deref(), Some("s"));
        assert_eq!(restarted.notify, vec!["t"]);
        assert!(restarted.output.is_empty());
        assert!(restarted.exit_status.is_none());
        assert_eq!(restarted.restarted_from, Some(source.id));

        // The source keeps its own run-time state.
        let source = get_job(&store, source.id).await.unwrap();
        assert_eq!(source.output, "old output");
        assert_eq!(source.exit_status, Some(1));
    }

    #[tokio::test]
    async fn test_restart_of_running_job_creates_a_sibling() {
        let store = InMemoryJobStore::new();
        let job = create_job(&store, deploy_request()).await.unwrap();

        let sibling = restart_job(&store, job.id).await.unwrap();

        assert_ne!(sibling.id, job.id);
        let job = get_job(&store, job.id).await.unwrap();
        assert!(!job.done());
    }

    #[tokio::test]
    async fn test_restart_unknown_job() {
        let store = InMemoryJobStore::new();

        let err = restart_job(&store, Uuid::new_v4()).await.unwrap_err();

        assert!(err.is_not_found());
    }
}
