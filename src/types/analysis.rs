//! Per-instrument analysis outcome

use serde::{Deserialize, Serialize};

/// Outcome of analyzing one instrument code within a run.
///
/// Serialized untagged so the wire shape is either `{code, advice}` or
/// `{code, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    /// The analyzer produced advisory text.
    Advice { code: String, advice: String },
    /// The analyzer failed for this code; the batch carried on.
    Failed { code: String, error: String },
}

impl AnalysisResult {
    pub fn advice(code: impl Into<String>, advice: impl Into<String>) -> Self {
        Self::Advice {
            code: code.into(),
            advice: advice.into(),
        }
    }

    pub fn failed(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Failed {
            code: code.into(),
            error: error.into(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Advice { code, .. } | Self::Failed { code, .. } => code,
        }
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
