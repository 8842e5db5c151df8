//! Logging setup for taskdag using `tracing` + `tracing-subscriber`.
//!
//! Level selection:
//! 1. DEBUG when `--debug` is passed or `TASKDAG_DEBUG` is `1`/`true`
//! 2. otherwise the `TASKDAG_LOG` level string (e.g. "warn", "trace")
//! 3. otherwise INFO
//!
//! Logs go to stderr so JSON output on stdout stays machine-readable.

use tracing::Level;

pub const DEBUG_ENV: &str = "TASKDAG_DEBUG";
pub const LEVEL_ENV: &str = "TASKDAG_LOG";

/// Initialize logging at the default level.
pub fn init() {
    init_with_debug(false);
}

/// Initialize logging with explicit debug mode setting.
///
/// Calling this more than once keeps the first subscriber.
pub fn init_with_debug(debug: bool) {
    let env_debug = std::env::var(DEBUG_ENV)
        .map(|v| is_truthy(&v))
        .unwrap_or(false);
    let env_level = std::env::var(LEVEL_ENV).ok();

    let level = resolve_level(debug || env_debug, env_level.as_deref());

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn is_truthy(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

fn resolve_level(debug: bool, env_level: Option<&str>) -> Level {
    if debug {
        return Level::DEBUG;
    }
    env_level.and_then(parse_level).unwrap_or(Level::INFO)
}

fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
