//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::faucet::{
    default_catalog, FailureMode, FaucetKind, FaucetRecord, SimulatedSubmitter, TrackerConfig,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tracker: TrackerSettings,

    #[serde(default)]
    pub claim: ClaimSettings,

    /// Catalog override; empty means the built-in catalog
    #[serde(default)]
    pub faucets: Vec<FaucetEntry>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Countdown configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSettings {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_tick_step")]
    pub tick_step_ms: u64,
}

fn default_tick_interval() -> u64 {
    1000 // 1 Hz
}

fn default_tick_step() -> u64 {
    1000
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            tick_step_ms: default_tick_step(),
        }
    }
}

/// When simulated claims fail
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Never,
    Always,
    EveryNth,
}

/// Simulated claim configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimSettings {
    #[serde(default = "default_claim_latency")]
    pub latency_ms: u64,

    #[serde(default = "default_claim_timeout")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub failure: FailurePolicy,

    /// n for `failure = "every_nth"`
    #[serde(default = "default_failure_every")]
    pub failure_every: u64,
}

fn default_claim_latency() -> u64 {
    2000 // 2 seconds
}

fn default_claim_timeout() -> u64 {
    10_000
}

fn default_failure_every() -> u64 {
    3
}

impl Default for ClaimSettings {
    fn default() -> Self {
        Self {
            latency_ms: default_claim_latency(),
            timeout_ms: default_claim_timeout(),
            failure: FailurePolicy::default(),
            failure_every: default_failure_every(),
        }
    }
}

impl ClaimSettings {
    pub fn failure_mode(&self) -> FailureMode {
        match self.failure {
            FailurePolicy::Never => FailureMode::Never,
            FailurePolicy::Always => FailureMode::Always,
            FailurePolicy::EveryNth => FailureMode::EveryNth(self.failure_every),
        }
    }
}

/// One `[[faucets]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct FaucetEntry {
    pub id: String,
    pub name: Option<String>,
    pub token: String,
    pub amount: f64,
    pub cooldown_ms: u64,
    #[serde(default)]
    pub remaining_ms: u64,
    #[serde(default)]
    pub kind: FaucetKind,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl From<&FaucetEntry> for FaucetRecord {
    fn from(entry: &FaucetEntry) -> Self {
        let record = FaucetRecord::new(&entry.id, &entry.token, entry.amount, entry.cooldown_ms)
            .name(entry.name.clone().unwrap_or_else(|| entry.id.clone()))
            .kind(entry.kind)
            .remaining(entry.remaining_ms);

        entry
            .requirements
            .iter()
            .fold(record, |record, req| record.requirement(req))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("faucetchain").join("config.toml")),
            Some(PathBuf::from("/etc/faucetchain/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        match Self::from_env() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring environment overrides: {}", e);
                Self::default()
            }
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        fn env_u64(key: &str) -> Option<u64> {
            std::env::var(key).ok().and_then(|v| v.parse().ok())
        }

        // Tracker overrides
        if let Some(ms) = env_u64("FAUCETCHAIN_TICK_INTERVAL_MS") {
            self.tracker.tick_interval_ms = ms;
        }
        if let Some(ms) = env_u64("FAUCETCHAIN_TICK_STEP_MS") {
            self.tracker.tick_step_ms = ms;
        }

        // Claim overrides
        if let Some(ms) = env_u64("FAUCETCHAIN_CLAIM_LATENCY_MS") {
            self.claim.latency_ms = ms;
        }
        if let Some(ms) = env_u64("FAUCETCHAIN_CLAIM_TIMEOUT_MS") {
            self.claim.timeout_ms = ms;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("FAUCETCHAIN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("FAUCETCHAIN_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Reject settings the tracker cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracker.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tracker.tick_interval_ms must be positive".to_string(),
            ));
        }
        if self.tracker.tick_step_ms == 0 {
            return Err(ConfigError::Invalid(
                "tracker.tick_step_ms must be positive".to_string(),
            ));
        }
        if self.claim.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "claim.timeout_ms must be positive".to_string(),
            ));
        }
        if self.claim.failure == FailurePolicy::EveryNth && self.claim.failure_every == 0 {
            return Err(ConfigError::Invalid(
                "claim.failure_every must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Records to seed the tracker with
    pub fn catalog(&self) -> Vec<FaucetRecord> {
        if self.faucets.is_empty() {
            default_catalog()
        } else {
            self.faucets.iter().map(FaucetRecord::from).collect()
        }
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            tick_step_ms: self.tracker.tick_step_ms,
            claim_timeout: Duration::from_millis(self.claim.timeout_ms),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tracker.tick_interval_ms)
    }

    pub fn submitter(&self) -> SimulatedSubmitter {
        SimulatedSubmitter::new(
            Duration::from_millis(self.claim.latency_ms),
            self.claim.failure_mode(),
        )
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("faucetchain={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if let Err(e) = result {
        eprintln!("Tracing already initialized: {}", e);
    }
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# FaucetChain Configuration
#
# Environment variables override these settings:
# - FAUCETCHAIN_TICK_INTERVAL_MS
# - FAUCETCHAIN_TICK_STEP_MS
# - FAUCETCHAIN_CLAIM_LATENCY_MS
# - FAUCETCHAIN_CLAIM_TIMEOUT_MS
# - FAUCETCHAIN_LOG_LEVEL
# - FAUCETCHAIN_LOG_FORMAT

[tracker]
# How often the countdown ticks (ms)
tick_interval_ms = 1000

# How much each tick takes off the countdown (ms)
tick_step_ms = 1000

[claim]
# Simulated transaction latency (ms)
latency_ms = 2000

# Claims waiting longer than this fail (ms)
timeout_ms = 10000

# Simulated failures: never, always, every_nth
failure = "never"

# n for failure = "every_nth"
failure_every = 3

# Catalog override. Leave out to use the built-in faucets.
# [[faucets]]
# id = "main-faucet"
# name = "Main FAUCET Faucet"
# token = "FAUCET"
# amount = 100
# cooldown_ms = 86400000
# remaining_ms = 0
# kind = "basic"
# requirements = []

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
