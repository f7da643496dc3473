//! Tracing subscriber setup for the command-line binary

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a compact stderr logger. `RUST_LOG` takes precedence over `verbose`.
pub fn init_cli_logger(verbose: bool) {
    let default = if verbose {
        "creditwise=debug,info"
    } else {
        "creditwise=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
