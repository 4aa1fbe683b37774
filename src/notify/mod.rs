//! Push notification sinks
//!
//! The scheduled workflow hands its finished report to a [`PushSink`]. Sink
//! failures stop at [`deliver`]: they are logged and reported as `false`,
//! never propagated into the workflow.

pub mod pushplus;

use async_trait::async_trait;
use tracing::{error, info};

pub use pushplus::PushPlusClient;

/// Push errors
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("Push rejected (code {code}): {message}")]
    Rejected { code: i64, message: String },
}

/// Destination for a finished report.
#[async_trait]
pub trait PushSink: Send + Sync {
    async fn push(&self, title: &str, content: &str) -> Result<(), NotifyError>;

    /// Human-readable name for logging (e.g. "PushPlus", "log").
    fn sink_name(&self) -> &str;
}

/// Push a report, absorbing any failure.
///
/// Returns `true` when the sink accepted the report.
pub async fn deliver(sink: &dyn PushSink, title: &str, content: &str) -> bool {
    match sink.push(title, content).await {
        Ok(()) => {
            info!(sink = sink.sink_name(), title = %title, "Report pushed");
            true
        }
        Err(e) => {
            error!(sink = sink.sink_name(), title = %title, error = %e, "Report push failed");
            false
        }
    }
}

/// Sink used when no push credential is configured: the report goes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl PushSink for LogSink {
    async fn push(&self, title: &str, content: &str) -> Result<(), NotifyError> {
        info!(title = %title, chars = content.len(), "Push disabled, report follows");
        info!("\n{}", content);
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "log"
    }
}
