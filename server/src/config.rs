//! Server configuration

use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Database URL (SQLite)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Default number of candidates returned by availability lookups
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    /// Default trailing window for usage statistics, in days
    #[serde(default = "default_stats_window_days")]
    pub stats_window_days: u32,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite:data/linkpool.db?mode=rwc".to_string()
}

fn default_candidate_limit() -> usize {
    3
}

fn default_stats_window_days() -> u32 {
    30
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Ok(val) = std::env::var("LINKPOOL_HTTP_HOST") {
            config.http_host = val;
        }
        if let Ok(val) = std::env::var("LINKPOOL_HTTP_PORT") {
            if let Ok(port) = val.parse() {
                config.http_port = port;
            }
        }
        if let Ok(val) = std::env::var("LINKPOOL_DATABASE_URL") {
            config.database_url = val;
        }
        if let Ok(val) = std::env::var("LINKPOOL_CANDIDATE_LIMIT") {
            if let Ok(limit) = val.parse() {
                config.candidate_limit = limit;
            }
        }
        if let Ok(val) = std::env::var("LINKPOOL_STATS_WINDOW_DAYS") {
            if let Ok(days) = val.parse() {
                config.stats_window_days = days;
            }
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_host: default_http_host(),
            http_port: default_http_port(),
            database_url: default_database_url(),
            candidate_limit: default_candidate_limit(),
            stats_window_days: default_stats_window_days(),
        }
    }
}
