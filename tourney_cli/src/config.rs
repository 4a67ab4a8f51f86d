//! CLI configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use tourney::SchedulerConfig;

/// Log levels accepted by `TOURNEY_LOG_LEVEL`
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Scheduler limits passed to the engine
    pub scheduler: SchedulerConfig,
    /// Pretty-print JSON written to files and stdout
    pub pretty_json: bool,
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,
}

impl CliConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `max_steps_override` - Optional search step cap (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a boolean variable cannot be parsed
    pub fn from_env(max_steps_override: Option<u64>) -> Result<Self, ConfigError> {
        let mut scheduler = SchedulerConfig::from_env();
        if let Some(max_steps) = max_steps_override {
            scheduler.max_search_steps = max_steps;
        }

        let pretty_json = match std::env::var("TOURNEY_PRETTY_JSON") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "TOURNEY_PRETTY_JSON".to_string(),
                reason: format!("Expected true or false, got '{value}'"),
            })?,
            Err(_) => true,
        };

        let log_level = parse_env_or("TOURNEY_LOG_LEVEL", "info".to_string()).to_lowercase();

        Ok(CliConfig {
            scheduler,
            pretty_json,
            log_level,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "TOURNEY_MAX_SEARCH_STEPS / TOURNEY_SLOT_MINUTES".to_string(),
                reason,
            })?;

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid {
                var: "TOURNEY_LOG_LEVEL".to_string(),
                reason: format!("Must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
