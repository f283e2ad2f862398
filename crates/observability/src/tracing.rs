//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// JSON logs with timestamps; `RUST_LOG` wins over `default_filter`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with_filter(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_no_op() {
        init_with_filter("debug");
        init_with_filter("not a valid = filter ===");
    }
}
