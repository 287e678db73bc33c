use crate::engine::tracker::TrackerConfig;
use crate::error::{Result, StratumError};
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Health tracking and selection parameters
    pub engine: EngineConfig,
    /// Admin API server configuration
    pub api: ApiServerConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Sliding window size per proxy (default: 100)
    pub health_window: usize,
    /// Cooldown duration in minutes (default: 60)
    pub cooldown_minutes: i64,
    /// Failure-rate threshold that triggers cooldown, in (0, 1] (default: 0.3)
    pub block_threshold: f64,
    /// Consecutive per-domain failures that mark a domain block (default: 3)
    pub consecutive_failure_threshold: u32,
    /// Sticky session TTL in seconds; 0 disables expiry (default: 0)
    pub sticky_session_ttl_seconds: u64,
    /// Optional JSON file with pools to register at startup
    pub pools_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Port for the API server (default: 8001)
    pub port: u16,
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Allowed CORS origins (comma-separated, empty = localhost only)
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let engine = EngineConfig {
            health_window: get_env_or("STRATUM_HEALTH_WINDOW", "100")
                .parse()
                .map_err(|_| {
                    StratumError::InvalidConfig(
                        "STRATUM_HEALTH_WINDOW must be a valid number".into(),
                    )
                })?,
            cooldown_minutes: get_env_or("STRATUM_COOLDOWN_MINUTES", "60")
                .parse()
                .map_err(|_| {
                    StratumError::InvalidConfig(
                        "STRATUM_COOLDOWN_MINUTES must be a valid number".into(),
                    )
                })?,
            block_threshold: get_env_or("STRATUM_BLOCK_THRESHOLD", "0.3")
                .parse()
                .map_err(|_| {
                    StratumError::InvalidConfig(
                        "STRATUM_BLOCK_THRESHOLD must be a valid number".into(),
                    )
                })?,
            consecutive_failure_threshold: get_env_or(
                "STRATUM_CONSECUTIVE_FAILURE_THRESHOLD",
                "3",
            )
            .parse()
            .map_err(|_| {
                StratumError::InvalidConfig(
                    "STRATUM_CONSECUTIVE_FAILURE_THRESHOLD must be a valid number".into(),
                )
            })?,
            sticky_session_ttl_seconds: get_env_or("STRATUM_STICKY_SESSION_TTL_SECONDS", "0")
                .parse()
                .map_err(|_| {
                    StratumError::InvalidConfig(
                        "STRATUM_STICKY_SESSION_TTL_SECONDS must be a valid number".into(),
                    )
                })?,
            pools_file: env::var("STRATUM_POOLS_FILE").ok().filter(|s| !s.is_empty()),
        };

        if engine.health_window == 0 {
            return Err(StratumError::InvalidConfig(
                "STRATUM_HEALTH_WINDOW must be at least 1".into(),
            ));
        }
        if engine.cooldown_minutes <= 0 {
            return Err(StratumError::InvalidConfig(
                "STRATUM_COOLDOWN_MINUTES must be positive".into(),
            ));
        }
        if !(engine.block_threshold > 0.0 && engine.block_threshold <= 1.0) {
            return Err(StratumError::InvalidConfig(
                "STRATUM_BLOCK_THRESHOLD must be in (0, 1]".into(),
            ));
        }
        if engine.consecutive_failure_threshold == 0 {
            return Err(StratumError::InvalidConfig(
                "STRATUM_CONSECUTIVE_FAILURE_THRESHOLD must be at least 1".into(),
            ));
        }

        Ok(Config {
            engine,
            api: ApiServerConfig {
                port: get_env_or("API_PORT", "8001").parse().map_err(|_| {
                    StratumError::InvalidConfig("API_PORT must be a valid port number".into())
                })?,
                host: get_env_or("API_HOST", "0.0.0.0"),
                cors_origins: get_env_or("CORS_ORIGINS", "")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format: get_env_or("LOG_FORMAT", "json"),
            },
        })
    }

    /// Get the API server address
    pub fn api_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

impl EngineConfig {
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            health_window: self.health_window,
            cooldown_minutes: self.cooldown_minutes,
            block_threshold: self.block_threshold,
            consecutive_failure_threshold: self.consecutive_failure_threshold,
            sticky_session_ttl: if self.sticky_session_ttl_seconds == 0 {
                None
            } else {
                Some(chrono::Duration::seconds(
                    self.sticky_session_ttl_seconds as i64,
                ))
            },
        }
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
