// Define a new module for logging initialization
use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Logs go to stderr so stdout only carries the run status line.
pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(build_filter(verbose, rust_log.as_deref()))
        .init();
}

/// `RUST_LOG` directives apply as given; `--verbose` adds debug output for
/// this crate. With neither, logging is off.
fn build_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let base = rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .unwrap_or("off");
    if verbose {
        EnvFilter::new(format!("{base},tspfed=debug"))
    } else {
        EnvFilter::new(base)
    }
}
