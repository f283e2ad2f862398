//! Tracing/logging setup shared by the binaries.

/// Initialize process-wide tracing with the `info` default filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with_filter("info");
}

/// Initialize tracing, falling back to `default_filter` when `RUST_LOG` is unset.
pub fn init_with_filter(default_filter: &str) {
    tracing::init_with_filter(default_filter);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
