//! HTTP clients for the market data sidecar.
//!
//! - `GET  {context_url}` → JSON array of benchmark points, oldest first
//! - `POST {analyzer_url}` with `{code, benchmark}` → `{advice}` or `{error}`

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AnalysisError, InstrumentAnalyzer, MarketContextProvider, MarketError};
use crate::config::MarketConfig;
use crate::types::{BenchmarkPoint, BenchmarkSeries};

fn build_http(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Benchmark history over HTTP.
#[derive(Clone)]
pub struct HttpMarketContext {
    http: reqwest::Client,
    url: String,
}

impl HttpMarketContext {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: build_http(timeout_secs)?,
            url: url.to_string(),
        })
    }

    pub fn from_config(config: &MarketConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.context_url, config.timeout_secs)
    }

    /// Get URL for logging
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MarketContextProvider for HttpMarketContext {
    async fn fetch_history(&self) -> Result<Vec<BenchmarkPoint>, MarketError> {
        let resp = self.http.get(&self.url).send().await?;

        match resp.status() {
            reqwest::StatusCode::OK => Ok(resp.json::<Vec<BenchmarkPoint>>().await?),
            // The sidecar answers 204 when the exchange has not published yet.
            reqwest::StatusCode::NO_CONTENT => Ok(Vec::new()),
            status => Err(MarketError::ServerError(status)),
        }
    }
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    code: &'a str,
    benchmark: &'a BenchmarkSeries,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnalyzeReply {
    Advice { advice: String },
    Error { error: String },
}

/// Instrument analyzer over HTTP.
#[derive(Clone)]
pub struct HttpAnalyzer {
    http: reqwest::Client,
    url: String,
}

impl HttpAnalyzer {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: build_http(timeout_secs)?,
            url: url.to_string(),
        })
    }

    pub fn from_config(config: &MarketConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.analyzer_url, config.timeout_secs)
    }

    /// Get URL for logging
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl InstrumentAnalyzer for HttpAnalyzer {
    async fn analyze(&self, code: &str, series: &BenchmarkSeries) -> Result<String, AnalysisError> {
        let resp = self
            .http
            .post(&self.url)
            .json(&AnalyzeRequest {
                code,
                benchmark: series,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AnalysisError::ServerError(resp.status()));
        }

        let body = resp.bytes().await?;
        match serde_json::from_slice::<AnalyzeReply>(&body) {
            Ok(AnalyzeReply::Advice { advice }) => Ok(advice),
            Ok(AnalyzeReply::Error { error }) => Err(AnalysisError::Rejected(error)),
            Err(e) => Err(AnalysisError::Malformed(e.to_string())),
        }
    }
}
