//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Schedule generation limits.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Payment progress cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Schedule generation limits.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Longest schedule the generator accepts, in periods.
    #[serde(default = "default_max_term_periods")]
    pub max_term_periods: u32,
    /// Day count used when prorating partial periods.
    #[serde(default = "default_days_in_year")]
    pub days_in_year: u32,
}

fn default_max_term_periods() -> u32 {
    600 // 50 years of monthly payments
}

fn default_days_in_year() -> u32 {
    365
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_term_periods: default_max_term_periods(),
            days_in_year: default_days_in_year(),
        }
    }
}

/// Payment progress cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached entries.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Time-to-live for each entry in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_max_capacity() -> u64 {
    1000
}

fn default_ttl_secs() -> u64 {
    3600 // 1 hour
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Fallback `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "amortis=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones: `config/default`,
    /// `config/{RUN_MODE}`, then `AMORTIS__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is malformed or a value has the wrong type.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("AMORTIS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
