//! AiStock Advisor - watch-list advisory service
//!
//! Pushes a markdown briefing for the configured watch-list every weekday
//! after the close, and serves on-demand batch analysis over HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Serve HTTP and run the weekly schedule
//! cargo run --release
//!
//! # Run the scheduled workflow once and exit
//! cargo run --release -- --once
//!
//! # HTTP only, custom config
//! cargo run --release -- --config ./advisor.toml --no-schedule
//! ```
//!
//! # Environment Variables
//!
//! - `ADVISOR_CONFIG`: Path to the TOML config (default: ./advisor.toml)
//! - `ADVISOR_SERVER_ADDR`: HTTP bind address (default: 0.0.0.0:3000)
//! - `PUSHPLUS_TOKEN`: PushPlus token; unset logs the report instead of pushing
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use aistock_advisor::api::{create_app, ApiState};
use aistock_advisor::config::AdvisorConfig;
use aistock_advisor::market::{HttpAnalyzer, HttpMarketContext, InstrumentAnalyzer, MarketContextProvider};
use aistock_advisor::notify::{LogSink, PushPlusClient, PushSink};
use aistock_advisor::session::{Clock, SystemClock};
use aistock_advisor::workflow::{run_scheduler, BatchProcessor, RunOutcome, ScheduledWorkflow, WeeklySchedule};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "aistock-advisor")]
#[command(about = "Watch-list advisory reports: scheduled push briefings and on-demand analysis")]
#[command(version)]
struct CliArgs {
    /// Path to the TOML config file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the server address (default: "0.0.0.0:3000")
    #[arg(short, long, value_name = "HOST:PORT")]
    addr: Option<String>,

    /// Run the scheduled workflow once, then exit (no HTTP server)
    #[arg(long)]
    once: bool,

    /// Serve HTTP only; arm neither the weekly schedule nor the start-up run
    #[arg(long)]
    no_schedule: bool,
}

// ============================================================================
// Task Names for Supervisor Logging
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
    Scheduler,
    StartupRun,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::HttpServer => write!(f, "HttpServer"),
            TaskName::Scheduler => write!(f, "Scheduler"),
            TaskName::StartupRun => write!(f, "StartupRun"),
        }
    }
}

/// Workflow tasks to spawn next to the HTTP server.
///
/// `--no-schedule` serves HTTP only: neither the weekly trigger nor the
/// start-up run is armed.
fn plan_workflow_tasks(no_schedule: bool, run_on_start: bool) -> Vec<TaskName> {
    if no_schedule {
        return Vec::new();
    }
    let mut tasks = vec![TaskName::Scheduler];
    if run_on_start {
        tasks.push(TaskName::StartupRun);
    }
    tasks
}

// ============================================================================
// Wiring
// ============================================================================

/// Outcome of loading `.env` at start-up.
#[derive(Debug)]
enum EnvFile {
    Loaded(PathBuf),
    Missing,
    Invalid(String),
}

impl EnvFile {
    fn from_result(result: Result<PathBuf, dotenvy::Error>) -> Self {
        match result {
            Ok(path) => Self::Loaded(path),
            Err(e) if e.not_found() => Self::Missing,
            Err(e) => Self::Invalid(e.to_string()),
        }
    }

    fn log(&self) {
        match self {
            Self::Loaded(path) => info!("✓ Environment loaded from {}", path.display()),
            Self::Missing => debug!("No .env file found, using the process environment only"),
            Self::Invalid(e) => warn!("Ignoring unreadable .env file: {}", e),
        }
    }
}


/// Collaborators shared by both adapters.
struct Services {
    market: Arc<dyn MarketContextProvider>,
    analyzer: Arc<dyn InstrumentAnalyzer>,
    sink: Arc<dyn PushSink>,
    clock: Arc<dyn Clock>,
}

fn build_services(config: &AdvisorConfig) -> Result<Services> {
    let market = HttpMarketContext::from_config(&config.market)
        .context("Failed to build market context client")?;
    info!("✓ Market context: {}", market.url());

    let analyzer = HttpAnalyzer::from_config(&config.market)
        .context("Failed to build analyzer client")?;
    info!("✓ Analyzer: {}", analyzer.url());

    let sink: Arc<dyn PushSink> = if config.push.has_token() {
        let client = PushPlusClient::new(&config.push).context("Failed to build PushPlus client")?;
        info!("✓ Push: PushPlus ({}, topic {})", client.endpoint(), config.push.topic);
        Arc::new(client)
    } else {
        warn!("PUSHPLUS_TOKEN not set, reports will be written to the log instead of pushed");
        Arc::new(LogSink)
    };

    Ok(Services {
        market: Arc::new(market),
        analyzer: Arc::new(analyzer),
        sink,
        clock: Arc::new(SystemClock::from_config(config.schedule.utc_offset_minutes)),
    })
}

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: axum::Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                info!("[HttpServer] Graceful shutdown complete");
                Ok(TaskName::HttpServer)
            }
            Err(e) => {
                error!("[HttpServer] Server error: {}", e);
                Err(anyhow::anyhow!("HTTP server error: {}", e))
            }
        }
    });
}

/// Run the supervisor loop: monitor tasks, cancel on failure.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    info!("🔒 Supervisor: All tasks spawned, monitoring...");

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!("🛑 Supervisor: Shutdown signal received");
                break;
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(task_name))) => {
                        info!("🔒 Supervisor: Task {} completed normally", task_name);
                    }
                    Some(Ok(Err(e))) => {
                        error!("🔒 Supervisor: Task failed with error: {}", e);
                        cancel_token.cancel();
                        return Err(e);
                    }
                    Some(Err(e)) => {
                        error!("🔒 Supervisor: Task panicked: {}", e);
                        cancel_token.cancel();
                        return Err(anyhow::anyhow!("Task panicked: {}", e));
                    }
                    None => {
                        info!("🔒 Supervisor: All tasks completed");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

fn log_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Delivered {
            trading_date,
            sections,
            failures,
            pushed,
        } => info!(
            "📨 Report for {} ({} sections, {} failed) {}",
            trading_date,
            sections,
            failures,
            if *pushed { "pushed" } else { "NOT pushed" }
        ),
        RunOutcome::Aborted => warn!("Run aborted: benchmark history unavailable"),
        RunOutcome::Skipped => warn!("Run skipped: another run was in progress"),
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials usually live in .env next to the binary. Logged once
    // tracing is up.
    let env_file = EnvFile::from_result(dotenvy::dotenv());

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    env_file.log();

    let args = CliArgs::parse();

    let config = AdvisorConfig::load(args.config.as_deref())
        .context("Failed to load advisor config")?
        .with_env_overrides(|key| std::env::var(key).ok());
    let config = Arc::new(config);

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  AiStock Advisor");
    info!("  Watch-list: {}", config.watch_list.join(", "));
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let services = build_services(&config)?;

    let workflow = Arc::new(ScheduledWorkflow::new(
        Arc::clone(&config),
        Arc::clone(&services.market),
        BatchProcessor::new(Arc::clone(&services.analyzer), config.pacing.scheduled_delay()),
        Arc::clone(&services.sink),
        Arc::clone(&services.clock),
    ));

    if args.once {
        let outcome = workflow.run_once().await;
        log_outcome(&outcome);
        return Ok(());
    }

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let server_addr = args.addr.unwrap_or_else(|| config.server.addr.clone());
    let api_state = ApiState::new(
        Arc::clone(&services.market),
        BatchProcessor::new(Arc::clone(&services.analyzer), config.pacing.on_demand_delay()),
    );
    let app = create_app(api_state, &config.server.cors_origins);
    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;
    info!("✓ HTTP server listening on {}", server_addr);

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();

    // Task 1: HTTP Server
    spawn_http_server(&mut task_set, listener, app, cancel_token.clone());

    // Tasks 2-3: workflow triggers
    let workflow_tasks = plan_workflow_tasks(args.no_schedule, config.schedule.run_on_start);
    if args.no_schedule {
        info!("Weekly schedule and start-up run disabled (--no-schedule)");
    }
    for task in workflow_tasks {
        match task {
            TaskName::Scheduler => {
                let schedule = WeeklySchedule::from_config(&config.schedule)
                    .context("Invalid schedule configuration")?;
                let wf = Arc::clone(&workflow);
                let clock = Arc::clone(&services.clock);
                let token = cancel_token.clone();
                task_set.spawn(async move {
                    info!("[Scheduler] Task starting");
                    run_scheduler(wf, schedule, clock, token).await;
                    Ok(TaskName::Scheduler)
                });
            }
            TaskName::StartupRun => {
                let wf = Arc::clone(&workflow);
                task_set.spawn(async move {
                    info!("[StartupRun] Task starting");
                    log_outcome(&wf.run_once().await);
                    Ok(TaskName::StartupRun)
                });
            }
            TaskName::HttpServer => {}
        }
    }

    run_supervisor(&mut task_set, cancel_token).await?;

    info!("✓ AiStock Advisor shutdown complete");
    Ok(())
}
