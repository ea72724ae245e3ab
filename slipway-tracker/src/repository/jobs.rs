//! Jobs repository
//!
//! Handles persistence of job records:
//! - Creating records and assigning their ids
//! - Reading records back
//! - Appending output increments
//! - Recording the terminal exit status, exactly once

use async_trait::async_trait;
use slipway_core::domain::job::Job;
use slipway_core::dto::job::CreateJob;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

use crate::error::{Result, TrackerError};

/// Repository trait for job persistence
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Creates and persists a new job record
    ///
    /// The store assigns the id; callers never pick one.
    async fn create(&self, req: CreateJob) -> Result<Job>;

    /// Reads a job back by id
    async fn get(&self, id: Uuid) -> Result<Job>;

    /// Appends `chunk` to the job's output buffer
    ///
    /// Output is append-only: prior bytes are never rewritten and the
    /// buffer never shrinks. Returns the updated record.
    async fn append_output(&self, id: Uuid, chunk: &str) -> Result<Job>;

    /// Records the exit status, exactly once
    ///
    /// The write is a guarded check-and-set: a second call fails with
    /// `AlreadyCompleted` and leaves the first value in place.
    async fn record_exit_status(&self, id: Uuid, exit_status: i32) -> Result<Job>;
}

/// In-memory implementation of JobStore
///
/// Each record sits behind its own lock, so appenders working on different
/// jobs never contend; the outer map lock is held only long enough to find
/// the entry.
#[derive(Clone, Default)]
pub struct InMemoryJobStore {
    jobs: Arc<RwLock<HashMap<Uuid, Arc<Mutex<Job>>>>>,
}

impl InMemoryJobStore {
    /// Creates a new empty in-memory job store
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, id: Uuid) -> Result<Arc<Mutex<Job>>> {
        let jobs = self.jobs.read().map_err(|_| poisoned())?;
        jobs.get(&id).cloned().ok_or(TrackerError::NotFound(id))
    }
}

fn poisoned() -> TrackerError {
    TrackerError::Persistence("job store lock poisoned".to_string())
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, req: CreateJob) -> Result<Job> {
        let job = req.into_job(Uuid::new_v4());

        let mut jobs = self.jobs.write().map_err(|_| poisoned())?;
        jobs.insert(job.id, Arc::new(Mutex::new(job.clone())));

        Ok(job)
    }

    async fn get(&self, id: Uuid) -> Result<Job> {
        let entry = self.entry(id)?;
        let job = entry.lock().map_err(|_| poisoned())?;

        Ok(job.clone())
    }

    async fn append_output(&self, id: Uuid, chunk: &str) -> Result<Job> {
        let entry = self.entry(id)?;
        let mut job = entry.lock().map_err(|_| poisoned())?;
        job.output.push_str(chunk);

        Ok(job.clone())
    }

    async fn record_exit_status(&self, id: Uuid, exit_status: i32) -> Result<Job> {
        let entry = self.entry(id)?;
        let mut job = entry.lock().map_err(|_| poisoned())?;

        // Check-and-set under the record lock; the first writer wins.
        if job.exit_status.is_some() {
            return Err(TrackerError::AlreadyCompleted(id));
        }
        job.exit_status = Some(exit_status);

        Ok(job.clone())
    }
}

/// Postgres implementation of JobStore
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    /// Creates a job store backed by the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, req: CreateJob) -> Result<Job> {
        let job = req.into_job(Uuid::new_v4());

        let config = serde_json::to_value(&job.config)
            .map_err(|err| TrackerError::Persistence(err.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO jobs (id, repo, branch, config, script, output,
                              exit_status, notify, created_at, restarted_from)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(job.id)
        .bind(&job.repo)
        .bind(&job.branch)
        .bind(config)
        .bind(&job.script)
        .bind(&job.output)
        .bind(job.exit_status)
        .bind(&job.notify)
        .bind(job.created_at)
        .bind(job.restarted_from)
        .execute(&self.pool)
        .await?;

        Ok(job)
    }

    async fn get(&self, id: Uuid) -> Result<Job> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, repo, branch, config, script, output,
                   exit_status, notify, created_at, restarted_from
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(TrackerError::NotFound(id)),
        }
    }

    async fn append_output(&self, id: Uuid, chunk: &str) -> Result<Job> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET output = output || $2
            WHERE id = $1
            RETURNING id, repo, branch, config, script, output,
                      exit_status, notify, created_at, restarted_from
            "#,
        )
        .bind(id)
        .bind(chunk)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(TrackerError::NotFound(id)),
        }
    }

    async fn record_exit_status(&self, id: Uuid, exit_status: i32) -> Result<Job> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            UPDATE jobs
            SET exit_status = $2
            WHERE id = $1 AND exit_status IS NULL
            RETURNING id, repo, branch, config, script, output,
                      exit_status, notify, created_at, restarted_from
            "#,
        )
        .bind(id)
        .bind(exit_status)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.try_into(),
            // The guarded update matched nothing: either the job does not
            // exist or it already has an exit status.
            None => match self.get(id).await {
                Ok(_) => Err(TrackerError::AlreadyCompleted(id)),
                Err(err) => Err(err),
            },
        }
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    repo: String,
    branch: String,
    config: serde_json::Value,
    script: Option<String>,
    output: String,
    exit_status: Option<i32>,
    notify: Vec<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    restarted_from: Option<Uuid>,
}

impl TryFrom<JobRow> for Job {
    type Error = TrackerError;

    fn try_from(row: JobRow) -> Result<Job> {
        // A config column that no longer decodes is a corrupted record, not
        // a job with an empty environment.
        let config = serde_json::from_value(row.config)
            .map_err(|err| TrackerError::Persistence(err.to_string()))?;

        Ok(Job {
            id: row.id,
            repo: row.repo,
            branch: row.branch,
            config,
            script: row.script,
            output: row.output,
            exit_status: row.exit_status,
            notify: row.notify,
            created_at: row.created_at,
            restarted_from: row.restarted_from,
        })
    }
}
