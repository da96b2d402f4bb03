//! Configuration module for environment variable parsing.
//!
//! Every setting has a default so the gateway starts with an empty
//! environment; only the webhook URL is needed for submissions to go anywhere.

use std::env;
use std::time::Duration;

use tracing::warn;

/// How the forwarder treats the outbound webhook call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMode {
    /// Await the webhook up to `forward_timeout`, then respond.
    Sync,
    /// Respond immediately and deliver on a detached task.
    Background,
}

impl ForwardMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sync" | "synchronous" => Some(ForwardMode::Sync),
            "background" | "fire-and-forget" | "async" => Some(ForwardMode::Background),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the standalone server to listen on
    pub port: u16,

    /// Destination webhook URL; `None` when unset or blank
    pub webhook_url: Option<String>,

    /// Optional shared secret expected in `X-API-Key` or `api_key`
    pub api_key: Option<String>,

    /// Optional CORS allow-list (only enforced in production)
    pub allowed_origins: Option<Vec<String>>,

    /// Production mode hides webhook diagnostics from responses
    pub production: bool,

    /// Synchronous or fire-and-forget delivery
    pub forward_mode: ForwardMode,

    /// Deadline for the synchronous webhook attempt in milliseconds
    pub forward_timeout_ms: u64,

    /// Deadline for the detached retry in milliseconds
    pub retry_timeout_ms: u64,

    /// Requests admitted per client per window
    pub rate_limit_max_requests: u32,

    /// Length of a rate limit window in seconds
    pub rate_limit_window_secs: u64,

    /// Largest accepted request body in the standalone server
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3001,
            webhook_url: None,
            api_key: None,
            allowed_origins: None,
            production: false,
            forward_mode: ForwardMode::Sync,
            forward_timeout_ms: 10_000,
            retry_timeout_ms: 30_000,
            rate_limit_max_requests: 5,
            rate_limit_window_secs: 15 * 60,
            max_body_bytes: 10 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let webhook_url = parse_non_blank("N8N_WEBHOOK_URL");
        if let Some(raw) = &webhook_url {
            if let Err(e) = url::Url::parse(raw) {
                warn!(error = %e, "webhook_url_unparseable");
            }
        }

        let forward_mode = match env::var("FORWARD_MODE") {
            Ok(raw) => ForwardMode::parse(&raw).unwrap_or_else(|| {
                warn!(env_var = "FORWARD_MODE", value = %raw, "Invalid forward mode, using default");
                defaults.forward_mode
            }),
            Err(_) => defaults.forward_mode,
        };

        Config {
            port: parse_or("PORT", defaults.port),

            webhook_url,

            api_key: parse_non_blank("API_KEY"),

            allowed_origins: parse_csv("ALLOWED_ORIGINS"),

            production: env::var("APP_ENV")
                .map(|v| v.trim().eq_ignore_ascii_case("production"))
                .unwrap_or(false),

            forward_mode,

            forward_timeout_ms: parse_or("FORWARD_TIMEOUT_MS", defaults.forward_timeout_ms),

            retry_timeout_ms: parse_or("RETRY_TIMEOUT_MS", defaults.retry_timeout_ms),

            rate_limit_max_requests: parse_or(
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),

            rate_limit_window_secs: parse_or(
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window_secs,
            ),

            max_body_bytes: parse_or("MAX_BODY_BYTES", defaults.max_body_bytes),
        }
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_millis(self.forward_timeout_ms)
    }

    pub fn retry_timeout(&self) -> Duration {
        Duration::from_millis(self.retry_timeout_ms)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// Whether CORS should be restricted to `allowed_origins`.
    pub fn restrict_origins(&self) -> bool {
        self.production
            && self
                .allowed_origins
                .as_ref()
                .map(|o| !o.is_empty())
                .unwrap_or(false)
    }
}

/// Parse a variable into `T`, warning and falling back on bad values.
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Read a variable, treating blank values as unset.
fn parse_non_blank(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}
