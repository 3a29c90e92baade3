//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::num::NonZeroU64;
use std::str::FromStr;

use crate::cache::DEFAULT_PAGE_TTL;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis connection URL; the in-memory store is used when unset
    pub redis_url: Option<String>,
    /// HTTP server port
    pub server_port: u16,
    /// Seconds a fetched page stays cached
    pub page_ttl: NonZeroU64,
    /// Timeout in seconds for page fetches
    pub fetch_timeout: u64,
    /// Interval in seconds between sweeps of the in-memory store
    pub cleanup_interval: u64,
    /// Whether to flush the backing store when the cache starts
    pub flush_on_start: bool,
}

fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_URL` - Redis server URL (default: unset, in-memory store)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PAGE_TTL` - Page cache TTL in seconds, 0 falls back to the default (default: 10)
    /// - `FETCH_TIMEOUT` - Page fetch timeout in seconds (default: 30)
    /// - `CLEANUP_INTERVAL` - In-memory expiry sweep in seconds (default: 1)
    /// - `FLUSH_ON_START` - Flush the store on startup (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            server_port: parse_env("SERVER_PORT", defaults.server_port),
            page_ttl: parse_env("PAGE_TTL", defaults.page_ttl),
            fetch_timeout: parse_env("FETCH_TIMEOUT", defaults.fetch_timeout),
            cleanup_interval: parse_env("CLEANUP_INTERVAL", defaults.cleanup_interval),
            flush_on_start: parse_env("FLUSH_ON_START", defaults.flush_on_start),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            server_port: 3000,
            page_ttl: DEFAULT_PAGE_TTL,
            fetch_timeout: 30,
            cleanup_interval: 1,
            flush_on_start: true,
        }
    }
}
