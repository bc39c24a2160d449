//! Tracing setup for tests and ad-hoc tools.

use tracing_subscriber::EnvFilter;

/// Install a compact subscriber that writes to the test harness's captured
/// output. Filtering follows `RUST_LOG`, defaulting to `warn`.
///
/// Safe to call from every test: only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_tracing();
        init_tracing();
        tracing::warn!("still logging");
    }
}
