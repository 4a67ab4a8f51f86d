//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::env;

/// Default cap on backtracking steps in the slot search
pub const DEFAULT_MAX_SEARCH_STEPS: u64 = 100_000;

/// Default slot length when a time grid has none
pub const DEFAULT_SLOT_MINUTES: u32 = 60;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum number of (slot, venue) candidates the search may try
    pub max_search_steps: u64,

    /// Slot length used to compute start times
    pub default_slot_minutes: u32,
}

impl SchedulerConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `TOURNEY_MAX_SEARCH_STEPS`: search step cap (default: 100000)
    /// - `TOURNEY_SLOT_MINUTES`: default slot length in minutes (default: 60)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            max_search_steps: parse_env_or("TOURNEY_MAX_SEARCH_STEPS", DEFAULT_MAX_SEARCH_STEPS),
            default_slot_minutes: parse_env_or("TOURNEY_SLOT_MINUTES", DEFAULT_SLOT_MINUTES),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_search_steps == 0 {
            return Err("Max search steps must be greater than 0".to_string());
        }

        if self.default_slot_minutes == 0 || self.default_slot_minutes > 24 * 60 {
            return Err("Slot length must be between 1 and 1440 minutes".to_string());
        }

        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_search_steps: DEFAULT_MAX_SEARCH_STEPS,
            default_slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }
}

fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
