/// Initialize the tracing subscriber when `RUST_LOG` is set.
///
/// Drivers call this first thing in `main`. Logs go to stderr so the CSV
/// measurement stream on stdout stays clean. This is a no-op when
/// `RUST_LOG` is not set or a global subscriber is already installed.
pub fn init_tracing() {
    use std::env;

    if env::var("RUST_LOG").is_ok() {
        // Best-effort: try to init a fmt subscriber from env filter.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }
}
