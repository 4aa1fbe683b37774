//! Market context types: BenchmarkPoint, BenchmarkSeries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One bar of the market-wide benchmark index.
///
/// Only `date` is read by the report workflow. Every other field the provider
/// sent, named or not, is forwarded to the analyzer untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkPoint {
    /// Trading date of the bar
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Provider fields without a named slot (`amount`, `pct_chg`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BenchmarkPoint {
    /// A point carrying only its date.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            extra: Map::new(),
        }
    }
}

/// Non-empty, chronologically ordered benchmark history.
///
/// The last point is the most recent trading date. An empty history cannot
/// be represented, so every holder of a `BenchmarkSeries` can rely on
/// [`BenchmarkSeries::trading_date`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BenchmarkSeries {
    points: Vec<BenchmarkPoint>,
}

impl BenchmarkSeries {
    /// Wrap provider output. Returns `None` for an empty history.
    pub fn new(points: Vec<BenchmarkPoint>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self { points })
        }
    }

    /// The most recent point.
    pub fn latest(&self) -> &BenchmarkPoint {
        // Non-empty by construction.
        &self.points[self.points.len() - 1]
    }

    /// Date of record for a report built on this series.
    pub fn trading_date(&self) -> NaiveDate {
        self.latest().date
    }

    pub fn points(&self) -> &[BenchmarkPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
