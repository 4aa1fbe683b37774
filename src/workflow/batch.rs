//! Batch Processor - sequential, paced, failure-isolated analysis
//!
//! Codes are analyzed strictly one after another. The analyzer and its
//! upstream quote sources enforce request-frequency limits, so calls never
//! overlap and a fixed pacing delay separates consecutive calls.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::market::InstrumentAnalyzer;
use crate::types::{AnalysisResult, BenchmarkSeries};

/// Runs the analyzer over an ordered list of codes.
#[derive(Clone)]
pub struct BatchProcessor {
    analyzer: Arc<dyn InstrumentAnalyzer>,
    delay: Duration,
}

impl BatchProcessor {
    pub fn new(analyzer: Arc<dyn InstrumentAnalyzer>, delay: Duration) -> Self {
        Self { analyzer, delay }
    }

    /// Pacing interval between consecutive analyzer calls.
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Analyze every code in order.
    ///
    /// The output has exactly one entry per input code, in input order. A
    /// failed code becomes an `Failed` entry and the batch moves on.
    pub async fn process(&self, codes: &[String], series: &BenchmarkSeries) -> Vec<AnalysisResult> {
        let mut results = Vec::with_capacity(codes.len());

        for (i, code) in codes.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            info!(code = %code, position = i + 1, total = codes.len(), "Analyzing instrument");

            let result = match self.analyzer.analyze(code, series).await {
                Ok(advice) => AnalysisResult::advice(code.as_str(), advice),
                Err(e) => {
                    error!(code = %code, error = %e, "Instrument analysis failed");
                    AnalysisResult::failed(code.as_str(), e.to_string())
                }
            };
            results.push(result);
        }

        results
    }
}
