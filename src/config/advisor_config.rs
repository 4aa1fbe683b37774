//! Advisor Configuration - watch-list, schedule, pacing and collaborator endpoints
//!
//! Every section implements `Default` with the values in [`super::defaults`],
//! so a missing or partial `advisor.toml` still yields a runnable service.
//! The loaded struct is immutable and shared as `Arc<AdvisorConfig>`.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for an advisor deployment.
///
/// Load with `AdvisorConfig::load()` which searches:
/// 1. An explicit path (the `--config` flag)
/// 2. `$ADVISOR_CONFIG` env var
/// 3. `./advisor.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Instrument codes analyzed on every scheduled run, in report order.
    #[serde(default)]
    pub watch_list: Vec<String>,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Weekly trigger for the pushed briefing
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Courtesy delays between analyzer calls
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Market data and analyzer sidecar
    #[serde(default)]
    pub market: MarketConfig,

    /// Push notification channel
    #[serde(default)]
    pub push: PushConfig,
}

impl AdvisorConfig {
    /// Load configuration using the standard search order.
    ///
    /// An explicit path must load cleanly. The env var and working-directory
    /// candidates fall back to the next step on error, with a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), watch_list = config.watch_list.len(), "Loaded advisor config");
            return Ok(config);
        }

        if let Ok(path) = std::env::var(defaults::CONFIG_PATH_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), watch_list = config.watch_list.len(), "Loaded advisor config from ADVISOR_CONFIG");
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from ADVISOR_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "ADVISOR_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(watch_list = config.watch_list.len(), "Loaded advisor config from ./advisor.toml");
                    return Ok(config);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./advisor.toml, using defaults");
                }
            }
        }

        info!("No advisor.toml found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides for values that usually live outside the
    /// config file (credentials, bind address).
    ///
    /// `lookup` is `std::env::var` in production; tests pass a closure.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(defaults::PUSHPLUS_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.push.token = token;
        }
        if let Some(addr) = lookup(defaults::SERVER_ADDR_ENV).filter(|a| !a.is_empty()) {
            self.server.addr = addr;
        }
        self
    }

    /// Validate the configuration for internal consistency.
    ///
    /// All violations are collected so the operator sees every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let s = &self.schedule;
        if s.hour > 23 {
            errors.push(format!("schedule.hour must be 0-23, got {}", s.hour));
        }
        if s.minute > 59 {
            errors.push(format!("schedule.minute must be 0-59, got {}", s.minute));
        }
        if s.weekdays.is_empty() {
            errors.push("schedule.weekdays must name at least one day".to_string());
        }
        if let Some(offset) = s.utc_offset_minutes {
            if offset.abs() >= 24 * 60 {
                errors.push(format!(
                    "schedule.utc_offset_minutes must be within ±1439, got {offset}"
                ));
            }
        }

        let m = &self.market;
        if m.context_url.trim().is_empty() {
            errors.push("market.context_url must not be empty".to_string());
        }
        if m.analyzer_url.trim().is_empty() {
            errors.push("market.analyzer_url must not be empty".to_string());
        }
        if m.timeout_secs == 0 {
            errors.push("market.timeout_secs must be > 0".to_string());
        }

        if self.push.endpoint.trim().is_empty() {
            errors.push("push.endpoint must not be empty".to_string());
        }

        if self.watch_list.iter().any(|c| c.trim().is_empty()) {
            errors.push("watch_list must not contain blank codes".to_string());
        }
        if self.watch_list.is_empty() {
            warn!("watch_list is empty, scheduled reports will carry no instrument sections");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    ///
    /// Can be overridden by `ADVISOR_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            cors_origins: Vec::new(),
        }
    }
}

/// Weekly trigger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Days the briefing is pushed on (`"Mon"`, `"Tue"`, ...).
    #[serde(default = "default_weekdays")]
    pub weekdays: Vec<Weekday>,

    #[serde(default = "default_schedule_hour")]
    pub hour: u32,

    #[serde(default = "default_schedule_minute")]
    pub minute: u32,

    /// Fixed offset from UTC for the schedule and the session classifier.
    /// `None` uses the host's local time zone.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,

    /// Fire one run immediately after start-up.
    #[serde(default = "default_true")]
    pub run_on_start: bool,
}

fn default_weekdays() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

fn default_schedule_hour() -> u32 {
    defaults::SCHEDULE_HOUR
}

fn default_schedule_minute() -> u32 {
    defaults::SCHEDULE_MINUTE
}

fn default_true() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekdays: default_weekdays(),
            hour: default_schedule_hour(),
            minute: default_schedule_minute(),
            utc_offset_minutes: None,
            run_on_start: true,
        }
    }
}

/// Delays between consecutive analyzer calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_scheduled_delay_ms")]
    pub scheduled_delay_ms: u64,

    #[serde(default = "default_on_demand_delay_ms")]
    pub on_demand_delay_ms: u64,
}

fn default_scheduled_delay_ms() -> u64 {
    defaults::SCHEDULED_DELAY_MS
}

fn default_on_demand_delay_ms() -> u64 {
    defaults::ON_DEMAND_DELAY_MS
}

impl PacingConfig {
    pub const fn scheduled_delay(&self) -> Duration {
        Duration::from_millis(self.scheduled_delay_ms)
    }

    pub const fn on_demand_delay(&self) -> Duration {
        Duration::from_millis(self.on_demand_delay_ms)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            scheduled_delay_ms: default_scheduled_delay_ms(),
            on_demand_delay_ms: default_on_demand_delay_ms(),
        }
    }
}

/// Market data and analyzer sidecar endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_context_url")]
    pub context_url: String,

    #[serde(default = "default_analyzer_url")]
    pub analyzer_url: String,

    #[serde(default = "default_market_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_context_url() -> String {
    defaults::MARKET_CONTEXT_URL.to_string()
}

fn default_analyzer_url() -> String {
    defaults::ANALYZER_URL.to_string()
}

fn default_market_timeout_secs() -> u64 {
    defaults::MARKET_HTTP_TIMEOUT_SECS
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            context_url: default_context_url(),
            analyzer_url: default_analyzer_url(),
            timeout_secs: default_market_timeout_secs(),
        }
    }
}

/// PushPlus channel configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PushConfig {
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,

    /// PushPlus token. Empty disables pushing and the report is logged instead.
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_push_topic")]
    pub topic: String,

    #[serde(default = "default_push_template")]
    pub template: String,
}

fn default_push_endpoint() -> String {
    defaults::PUSHPLUS_ENDPOINT.to_string()
}

fn default_push_topic() -> String {
    defaults::PUSHPLUS_TOPIC.to_string()
}

fn default_push_template() -> String {
    defaults::PUSHPLUS_TEMPLATE.to_string()
}

impl PushConfig {
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

// Hand-written so the token never reaches the logs.
impl std::fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &if self.has_token() { "<set>" } else { "<unset>" })
            .field("topic", &self.topic)
            .field("template", &self.template)
            .finish()
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: default_push_endpoint(),
            token: String::new(),
            topic: default_push_topic(),
            template: default_push_template(),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({0:?}): {1}")]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({0:?}): {1}")]
    Parse(PathBuf, toml::de::Error),
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Tests
// ============================================================================
