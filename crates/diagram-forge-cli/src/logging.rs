use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::GlobalOpts;

/// Default filter for a verbosity level: `-v` shows info, `-vv` debug,
/// `-vvv` trace. `-q` keeps only errors.
pub fn default_filter(global: &GlobalOpts) -> &'static str {
    if global.quiet {
        return "error";
    }
    match global.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the verbosity flags.
///
/// Called once from `main`; panics if a global subscriber is already set.
pub fn init(global: &GlobalOpts) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(global).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!global.no_color)
                .with_target(global.verbose > 1),
        )
        .init();
}
