//! System-wide default constants.
//!
//! Grouped by subsystem for easy discovery. Every `Default` impl in
//! `advisor_config` reads from here.

// ============================================================================
// Server
// ============================================================================

/// HTTP bind address when neither the TOML file nor the environment sets one.
pub const SERVER_ADDR: &str = "0.0.0.0:3000";

/// Env var that overrides `server.addr`.
pub const SERVER_ADDR_ENV: &str = "ADVISOR_SERVER_ADDR";

// ============================================================================
// Schedule
// ============================================================================

/// Hour of the weekly trigger. The exchange closes at 15:00 local time.
pub const SCHEDULE_HOUR: u32 = 15;

/// Minute of the weekly trigger, leaving the exchange time to publish the
/// closing data.
pub const SCHEDULE_MINUTE: u32 = 15;

// ============================================================================
// Pacing
// ============================================================================

/// Delay between analyzer calls on the scheduled path (ms).
pub const SCHEDULED_DELAY_MS: u64 = 1_500;

/// Delay between analyzer calls on the on-demand path (ms).
pub const ON_DEMAND_DELAY_MS: u64 = 1_000;

// ============================================================================
// Market sidecar
// ============================================================================

/// Benchmark history endpoint of the market data sidecar.
pub const MARKET_CONTEXT_URL: &str = "http://127.0.0.1:8000/market/context";

/// Per-instrument analysis endpoint of the market data sidecar.
pub const ANALYZER_URL: &str = "http://127.0.0.1:8000/analyze";

/// HTTP client timeout for sidecar requests (seconds).
pub const MARKET_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Push
// ============================================================================

/// PushPlus send endpoint.
pub const PUSHPLUS_ENDPOINT: &str = "http://www.pushplus.plus/send";

/// Env var holding the PushPlus token. Overrides `push.token`.
pub const PUSHPLUS_TOKEN_ENV: &str = "PUSHPLUS_TOKEN";

/// PushPlus topic (group) the briefing is published to.
pub const PUSHPLUS_TOPIC: &str = "AiStock";

/// PushPlus rendering template. Markdown keeps the report's line breaks.
pub const PUSHPLUS_TEMPLATE: &str = "markdown";

/// HTTP client timeout for push requests (seconds).
pub const PUSH_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Config file discovery
// ============================================================================

/// Env var pointing at the TOML config file.
pub const CONFIG_PATH_ENV: &str = "ADVISOR_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "advisor.toml";
