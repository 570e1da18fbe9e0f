// ==========================================
// Logging initialization
// ==========================================
// tracing + tracing-subscriber
// Level filter from RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging for the binary.
///
/// # Environment
/// - RUST_LOG: filter directive (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=cutlist_intake=trace
/// - CUTLIST_INTAKE_LOG_JSON=1: one JSON object per event
///
/// # Example
/// ```no_run
/// use cutlist_intake::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("CUTLIST_INTAKE_LOG_JSON").is_ok_and(|v| v.trim() == "1");

    // stderr keeps stdout free for the JSON result
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Initialize logging in tests (debug level, captured by the test harness).
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
