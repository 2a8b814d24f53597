//! Tracing/logging setup shared by the binaries.

/// Initialize process-wide tracing with the default filter (`warn`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("warn");
}

/// Tracing configuration (filters, layers).
pub mod tracing;
