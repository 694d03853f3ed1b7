//! Constants and default values for Fleetwatch

use std::path::PathBuf;

/// Default Fleetwatch home directory name
pub const FLEETWATCH_DIR: &str = ".fleetwatch";

/// Default database file name
pub const DB_FILE: &str = "fleetwatch.db";

/// Default config file name
pub const CONFIG_FILE: &str = "fleetwatch.toml";

/// Default webhook bind address
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Default roster sync interval in seconds
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 120;

/// Default timer sweep interval in seconds
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Default timeout for outbound HTTP calls in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Timezone used for rendering event times
pub const DISPLAY_TZ: chrono_tz::Tz = chrono_tz::America::New_York;

/// Get the Fleetwatch home directory
pub fn fleetwatch_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(FLEETWATCH_DIR))
        .unwrap_or_else(|| PathBuf::from(FLEETWATCH_DIR))
}

/// Get the database path
pub fn db_path() -> PathBuf {
    fleetwatch_home().join(DB_FILE)
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    fleetwatch_home().join(CONFIG_FILE)
}
