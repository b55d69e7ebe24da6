use tracing_subscriber::EnvFilter;

/// Routes the crate's `log` records through a tracing subscriber. Safe to
/// call from every test; only the first call installs it.
pub fn init_logging() {
    let log_level =
        EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("error,controllers=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .without_time()
        .try_init();
}

pub fn assert_close(got: f64, want: f64, tolerance: f64) {
    assert!(
        (got - want).abs() <= tolerance,
        "got {got}, expected {want} (tolerance {tolerance})"
    );
}
