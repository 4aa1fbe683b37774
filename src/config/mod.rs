//! Advisor Configuration Module
//!
//! Per-deployment configuration loaded from TOML, with environment overrides
//! for credentials.
//!
//! ## Loading Order
//!
//! 1. `--config <PATH>` CLI flag
//! 2. `ADVISOR_CONFIG` environment variable (path to TOML file)
//! 3. `advisor.toml` in the current working directory
//! 4. Built-in defaults
//!
//! ## Usage
//!
//! The configuration is loaded once in `main()` and passed by `Arc` to each
//! adapter when it is built. No module reads configuration from process-global
//! state.
//!
//! ```ignore
//! let config = Arc::new(AdvisorConfig::load(None)?.with_env_overrides(|k| std::env::var(k).ok()));
//! let workflow = ScheduledWorkflow::new(Arc::clone(&config), market, processor, sink, clock);
//! ```

mod advisor_config;
pub mod defaults;

pub use advisor_config::*;
