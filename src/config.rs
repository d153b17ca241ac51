use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Veilnote";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Accepted note length, in characters. Validated before any side effect.
pub const NOTE_MIN_CHARS: usize = 10;
pub const NOTE_MAX_CHARS: usize = 10_000;

/// Default base URL of the external analysis engine.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:8001";

/// Timeout for one analysis call. The workflow makes exactly one per note.
pub const ANALYSIS_TIMEOUT_SECS: u64 = 30;

/// History queries return at most this many records, newest first.
pub const HISTORY_LIMIT: usize = 50;

/// Audit trail query limits: default page size and hard cap.
pub const AUDIT_QUERY_DEFAULT: usize = 50;
pub const AUDIT_QUERY_MAX: usize = 100;

/// Per-user statistics are cached for this long before recomputation.
pub const STATS_CACHE_TTL: Duration = Duration::from_secs(3600);

pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory
/// ~/Veilnote/ on all platforms
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Default location of the note store
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("veilnote.db")
}
