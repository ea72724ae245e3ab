//! Slipway Tracker
//!
//! Lifecycle engine for deploy jobs. A job is created running, accumulates
//! process output through repeated appends, and turns terminal exactly once
//! when its exit status is recorded. The tracker persists records through
//! the `JobStore` seam, streams output increments to live observers, and
//! fans completion notices out to configured targets.
//!
//! # Example
//!
//! ```no_run
//! use slipway_core::dto::job::CreateJob;
//! use slipway_tracker::repository::InMemoryJobStore;
//! use slipway_tracker::service::broadcast::ChannelPublisher;
//! use slipway_tracker::service::notify::WebhookNotifier;
//! use slipway_tracker::service::job;
//!
//! #[tokio::main]
//! async fn main() -> slipway_tracker::Result<()> {
//!     let store = InMemoryJobStore::new();
//!     let publisher = ChannelPublisher::new();
//!     let notifier = WebhookNotifier::new();
//!
//!     let created = job::create_job(&store, CreateJob::for_repo("acme/site")).await?;
//!     job::append_output(&store, &publisher, created.id, "cloning...\n").await?;
//!     let done = job::complete_job(&store, &publisher, &notifier, created.id, 0).await?;
//!
//!     assert!(done.success());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod repository;
pub mod service;

pub use error::{Result, TrackerError};
