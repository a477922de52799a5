use std::io::{self, IsTerminal};
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging for a report run.
///
/// - Level comes from `RUST_LOG`, defaulting to "info"
/// - Human-readable lines when stderr is a terminal
/// - Flattened JSON otherwise, so scheduler-captured logs stay machine readable
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if io::stderr().is_terminal() {
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .flatten_event(true)
            .init();
    }
}
