//! Report orchestration workflow
//!
//! - [`batch`]: sequential, paced analysis of a code list
//! - [`report`]: markdown assembly of the pushed briefing
//! - [`scheduled`]: the scheduled adapter (benchmark → session → batch → report → push)
//! - [`schedule`]: the weekly trigger driving the scheduled adapter
//!
//! The on-demand adapter lives in `api::handlers` and reuses [`batch`].

pub mod batch;
pub mod report;
pub mod schedule;
pub mod scheduled;

pub use batch::BatchProcessor;
pub use report::{assemble, report_title};
pub use schedule::{run_scheduler, WeeklySchedule};
pub use scheduled::{RunOutcome, ScheduledWorkflow, WorkflowState};
