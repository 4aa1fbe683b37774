//! AiStock Advisor: watch-list advisory reports
//!
//! Combines a market-wide benchmark history with per-instrument analysis and
//! delivers the result as a pushed briefing or a synchronous HTTP response.
//!
//! ## Architecture
//!
//! - **Session Classifier**: pre-market / intraday / post-market framing
//! - **Batch Processor**: sequential, paced, failure-isolated analysis
//! - **Report Assembler**: markdown briefing with a fixed disclaimer
//! - **Scheduled Adapter**: weekly trigger → report → PushPlus
//! - **On-Demand Adapter**: `POST /analyze` → JSON results

pub mod api;
pub mod config;
pub mod market;
pub mod notify;
pub mod session;
pub mod types;
pub mod workflow;

// Re-export configuration
pub use config::AdvisorConfig;

// Re-export commonly used types
pub use types::{AnalysisResult, BenchmarkPoint, BenchmarkSeries};

// Re-export collaborator seams
pub use market::{InstrumentAnalyzer, MarketContextProvider};
pub use notify::PushSink;
pub use session::{classify, Clock, SessionLabel};

// Re-export workflow components
pub use workflow::{BatchProcessor, RunOutcome, ScheduledWorkflow, WeeklySchedule};
