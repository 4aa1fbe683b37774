//! Market collaborators: benchmark history and per-instrument analysis.
//!
//! Both are external capabilities. The workflow only sees the two traits
//! below; [`http`] provides reqwest-backed implementations that talk to the
//! market data sidecar.

pub mod http;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::types::{BenchmarkPoint, BenchmarkSeries};

pub use http::{HttpAnalyzer, HttpMarketContext};

/// Market context errors
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("Benchmark history is empty")]
    EmptyHistory,
}

/// Per-instrument analysis errors.
///
/// Any of these becomes a `{code, error}` entry; none aborts a batch.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Analyzer returned status {0}")]
    ServerError(reqwest::StatusCode),
    #[error("{0}")]
    Rejected(String),
    #[error("Malformed analyzer reply: {0}")]
    Malformed(String),
}

/// Source of the market-wide benchmark history.
#[async_trait]
pub trait MarketContextProvider: Send + Sync {
    /// Fetch the benchmark history, oldest first.
    ///
    /// An empty vector means "no data available".
    async fn fetch_history(&self) -> Result<Vec<BenchmarkPoint>, MarketError>;
}

/// Opaque per-instrument advisory capability.
#[async_trait]
pub trait InstrumentAnalyzer: Send + Sync {
    /// Produce advisory text for `code` against the shared benchmark axis.
    async fn analyze(&self, code: &str, series: &BenchmarkSeries) -> Result<String, AnalysisError>;
}

/// Fetch the benchmark history and enforce the non-empty precondition.
///
/// Transport failures and an empty history are both "context unavailable".
/// The error is logged here so callers only decide how to surface it.
pub async fn load_benchmark(
    provider: &dyn MarketContextProvider,
) -> Result<BenchmarkSeries, MarketError> {
    let points = provider.fetch_history().await.map_err(|e| {
        error!(error = %e, "Failed to fetch benchmark history");
        e
    })?;

    BenchmarkSeries::new(points).ok_or_else(|| {
        warn!("Benchmark history is empty");
        MarketError::EmptyHistory
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct Fixed(Vec<BenchmarkPoint>);

    #[async_trait]
    impl MarketContextProvider for Fixed {
        async fn fetch_history(&self) -> Result<Vec<BenchmarkPoint>, MarketError> {
            Ok(self.0.clone())
        }
    }

    struct Down;

    #[async_trait]
    impl MarketContextProvider for Down {
        async fn fetch_history(&self) -> Result<Vec<BenchmarkPoint>, MarketError> {
            Err(MarketError::ServerError(reqwest::StatusCode::BAD_GATEWAY))
        }
    }

    #[tokio::test]
    async fn test_load_benchmark_ok() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let series = load_benchmark(&Fixed(vec![BenchmarkPoint::on(date)])).await.unwrap();
        assert_eq!(series.trading_date(), date);
    }

    #[tokio::test]
    async fn test_load_benchmark_empty_is_unavailable() {
        let err = load_benchmark(&Fixed(Vec::new())).await.unwrap_err();
        assert!(matches!(err, MarketError::EmptyHistory));
    }

    #[tokio::test]
    async fn test_load_benchmark_transport_error_is_unavailable() {
        let err = load_benchmark(&Down).await.unwrap_err();
        assert!(matches!(err, MarketError::ServerError(_)));
    }
}
