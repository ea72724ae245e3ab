//! Completion notification
//!
//! Delivers a completed job's summary to each of its configured targets.
//! Delivery is best-effort per target: a failed attempt is logged and the
//! remaining targets still get theirs.

use anyhow::Context;
use async_trait::async_trait;
use slipway_core::domain::event::CompletionSummary;

/// Dispatcher trait for delivering completion notices
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `summary` to a single target
    async fn deliver(&self, target: &str, summary: &CompletionSummary) -> anyhow::Result<()>;
}

/// Attempts delivery to every target, capturing errors per attempt
///
/// Failures never propagate: the completion they report is already durable.
pub async fn notify_all(notifier: &dyn Notifier, targets: &[String], summary: &CompletionSummary) {
    for target in targets {
        if let Err(err) = notifier.deliver(target, summary).await {
            tracing::warn!(
                "Failed to notify {} for job {}: {}",
                target,
                summary.job_id,
                err
            );
        }
    }
}

/// HTTP implementation of Notifier
///
/// Treats each target as a webhook URL and POSTs the summary as JSON.
#[derive(Clone, Default)]
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Creates a new webhook notifier
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, target: &str, summary: &CompletionSummary) -> anyhow::Result<()> {
        let response = self
            .client
            .post(target)
            .json(summary)
            .send()
            .await
            .context("Failed to send completion notice")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Target {} rejected notice: {} - {}", target, status, body);
        }

        Ok(())
    }
}
