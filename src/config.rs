use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "CareRoster";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DB_PATH_ENV: &str = "CARE_ROSTER_DB";
pub const BIND_ADDR_ENV: &str = "CARE_ROSTER_ADDR";
pub const BUSY_TIMEOUT_ENV: &str = "CARE_ROSTER_BUSY_TIMEOUT_MS";

const DB_FILE_NAME: &str = "care_roster.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Get the application data directory
/// ~/CareRoster/ on all platforms, falling back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_NAME),
        None => {
            tracing::warn!("Cannot determine home directory, using working directory");
            PathBuf::from(APP_NAME)
        }
    }
}

/// SQLite database file. `CARE_ROSTER_DB` overrides the default location.
pub fn database_path() -> PathBuf {
    match std::env::var_os(DB_PATH_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => app_data_dir().join(DB_FILE_NAME),
    }
}

/// Listen address for the HTTP API.
pub fn bind_addr() -> SocketAddr {
    let fallback = || {
        DEFAULT_BIND_ADDR
            .parse()
            .unwrap_or(SocketAddr::from(([127, 0, 0, 1], 8080)))
    };
    match std::env::var(BIND_ADDR_ENV) {
        Ok(raw) => parse_bind_addr(&raw).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "Invalid {BIND_ADDR_ENV}, using {DEFAULT_BIND_ADDR}");
            fallback()
        }),
        Err(_) => fallback(),
    }
}

/// How long a connection waits on a locked database before failing.
pub fn busy_timeout() -> Duration {
    let ms = match std::env::var(BUSY_TIMEOUT_ENV) {
        Ok(raw) => parse_busy_timeout_ms(&raw).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "Invalid {BUSY_TIMEOUT_ENV}, using {DEFAULT_BUSY_TIMEOUT_MS}ms");
            DEFAULT_BUSY_TIMEOUT_MS
        }),
        Err(_) => DEFAULT_BUSY_TIMEOUT_MS,
    };
    Duration::from_millis(ms)
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "care_roster_lib=info"
}

fn parse_bind_addr(raw: &str) -> Option<SocketAddr> {
    raw.trim().parse().ok()
}

fn parse_busy_timeout_ms(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}
