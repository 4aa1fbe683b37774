//! Scheduled Adapter - assemble the watch-list briefing and push it
//!
//! State machine: `Idle --trigger--> Running --complete/abort--> Idle`.
//! A trigger that arrives while a run is in progress is skipped. There is no
//! failed state: every failure inside a run is logged and absorbed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use super::batch::BatchProcessor;
use super::report::{assemble, report_title};
use crate::config::AdvisorConfig;
use crate::market::{load_benchmark, MarketContextProvider};
use crate::notify::{deliver, PushSink};
use crate::session::{classify, Clock};

/// Adapter state as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Running,
}

/// What a single trigger produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A report was assembled and handed to the sink.
    Delivered {
        trading_date: NaiveDate,
        /// Instrument sections in the report.
        sections: usize,
        /// Sections whose analysis failed.
        failures: usize,
        /// Whether the sink accepted the report.
        pushed: bool,
    },
    /// The benchmark history was unavailable; nothing was analyzed or sent.
    Aborted,
    /// Another run was still in progress.
    Skipped,
}

/// Resets the run-lock when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The scheduled briefing workflow.
pub struct ScheduledWorkflow {
    config: Arc<AdvisorConfig>,
    market: Arc<dyn MarketContextProvider>,
    processor: BatchProcessor,
    sink: Arc<dyn PushSink>,
    clock: Arc<dyn Clock>,
    running: AtomicBool,
}

impl ScheduledWorkflow {
    pub fn new(
        config: Arc<AdvisorConfig>,
        market: Arc<dyn MarketContextProvider>,
        processor: BatchProcessor,
        sink: Arc<dyn PushSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            market,
            processor,
            sink,
            clock,
            running: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> WorkflowState {
        if self.running.load(Ordering::Acquire) {
            WorkflowState::Running
        } else {
            WorkflowState::Idle
        }
    }

    /// Handle one trigger.
    pub async fn run_once(&self) -> RunOutcome {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Previous scheduled run still in progress, skipping this trigger");
            return RunOutcome::Skipped;
        }
        let _guard = RunGuard(&self.running);

        let started = self.clock.now();
        info!(at = %started.format("%Y-%m-%d %H:%M:%S"), "Starting advisory workflow");

        let Ok(series) = load_benchmark(self.market.as_ref()).await else {
            error!("Benchmark history unavailable, aborting run");
            return RunOutcome::Aborted;
        };

        let trading_date = series.trading_date();
        let session = classify(&started);
        info!(trading_date = %trading_date, session = %session, codes = self.config.watch_list.len(), "Benchmark loaded");

        let results = self.processor.process(&self.config.watch_list, &series).await;
        let failures = results.iter().filter(|r| r.is_failure()).count();

        // Generated-at and the session note describe the same instant.
        let report = assemble(trading_date, &started, session, &results);
        let pushed = deliver(self.sink.as_ref(), &report_title(trading_date), &report).await;

        info!(
            trading_date = %trading_date,
            sections = results.len(),
            failures,
            pushed,
            "Advisory workflow complete"
        );

        RunOutcome::Delivered {
            trading_date,
            sections: results.len(),
            failures,
            pushed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{AnalysisError, InstrumentAnalyzer, MarketError};
    use crate::notify::NotifyError;
    use crate::session::{FixedClock, SessionLabel};
    use crate::types::{BenchmarkPoint, BenchmarkSeries};
    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    struct History(Vec<BenchmarkPoint>);

    #[async_trait]
    impl MarketContextProvider for History {
        async fn fetch_history(&self) -> Result<Vec<BenchmarkPoint>, MarketError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
        pause: Duration,
    }

    #[async_trait]
    impl InstrumentAnalyzer for Echo {
        async fn analyze(&self, code: &str, _s: &BenchmarkSeries) -> Result<String, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            Ok(format!("advice for {code}"))
        }
    }

    #[derive(Default)]
    struct Recorder {
        pushes: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl PushSink for Recorder {
        async fn push(&self, title: &str, content: &str) -> Result<(), NotifyError> {
            self.pushes
                .lock()
                .unwrap()
                .push((title.to_string(), content.to_string()));
            if self.fail {
                Err(NotifyError::Rejected {
                    code: 500,
                    message: "down".to_string(),
                })
            } else {
                Ok(())
            }
        }

        fn sink_name(&self) -> &str {
            "recorder"
        }
    }

    fn clock(hour: u32) -> Arc<FixedClock> {
        Arc::new(FixedClock(
            FixedOffset::east_opt(8 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 5, 2, hour, 0, 0)
                .unwrap(),
        ))
    }

    fn may_day() -> Vec<BenchmarkPoint> {
        vec![
            BenchmarkPoint::on(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()),
            BenchmarkPoint::on(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
        ]
    }

    fn workflow(
        history: Vec<BenchmarkPoint>,
        analyzer: Arc<Echo>,
        sink: Arc<Recorder>,
        hour: u32,
    ) -> ScheduledWorkflow {
        let config = AdvisorConfig {
            watch_list: vec!["AAA".to_string(), "BBB".to_string()],
            ..AdvisorConfig::default()
        };
        ScheduledWorkflow::new(
            Arc::new(config),
            Arc::new(History(history)),
            BatchProcessor::new(analyzer, Duration::ZERO),
            sink,
            clock(hour),
        )
    }

    #[tokio::test]
    async fn test_pre_market_report_is_pushed() {
        let analyzer = Arc::new(Echo::default());
        let sink = Arc::new(Recorder::default());
        let wf = workflow(may_day(), analyzer.clone(), sink.clone(), 8);

        let outcome = wf.run_once().await;

        assert_eq!(
            outcome,
            RunOutcome::Delivered {
                trading_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                sections: 2,
                failures: 0,
                pushed: true,
            }
        );
        let pushes = sink.pushes.lock().unwrap();
        assert_eq!(pushes.len(), 1);
        let (title, content) = &pushes[0];
        assert_eq!(title, "2024-05-01 AI advisory report");
        assert!(content.contains("2024-05-01"));
        assert!(content.contains(SessionLabel::PreMarket.note()));
        assert!(content.contains("advice for AAA"));
        assert!(content.contains("advice for BBB"));
        assert_eq!(wf.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_empty_history_aborts_without_calls() {
        let analyzer = Arc::new(Echo::default());
        let sink = Arc::new(Recorder::default());
        let wf = workflow(Vec::new(), analyzer.clone(), sink.clone(), 16);

        assert_eq!(wf.run_once().await, RunOutcome::Aborted);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
        assert!(sink.pushes.lock().unwrap().is_empty());
        assert_eq!(wf.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_push_failure_is_absorbed() {
        let analyzer = Arc::new(Echo::default());
        let sink = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let wf = workflow(may_day(), analyzer, sink, 16);

        match wf.run_once().await {
            RunOutcome::Delivered { pushed, sections, .. } => {
                assert!(!pushed);
                assert_eq!(sections, 2);
            }
            other => panic!("expected Delivered, got {other:?}"),
        }
        assert_eq!(wf.state(), WorkflowState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_trigger_is_skipped() {
        let analyzer = Arc::new(Echo {
            pause: Duration::from_secs(5),
            ..Echo::default()
        });
        let sink = Arc::new(Recorder::default());
        let wf = Arc::new(workflow(may_day(), analyzer.clone(), sink.clone(), 16));

        let first = tokio::spawn({
            let wf = Arc::clone(&wf);
            async move { wf.run_once().await }
        });
        // Let the first run reach the analyzer.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(wf.state(), WorkflowState::Running);

        assert_eq!(wf.run_once().await, RunOutcome::Skipped);

        let outcome = first.await.unwrap();
        assert!(matches!(outcome, RunOutcome::Delivered { .. }));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
        assert_eq!(sink.pushes.lock().unwrap().len(), 1);
        assert_eq!(wf.state(), WorkflowState::Idle);
    }
}
