//! Core data types shared by the workflow, the API and the collaborators.

mod analysis;
mod market;

pub use analysis::AnalysisResult;
pub use market::{BenchmarkPoint, BenchmarkSeries};
