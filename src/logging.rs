//! Structured logging for SleekInvoices
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for command
//! output so exports can be piped. The persistent record of data changes is
//! the audit log, not this.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, or debug
/// output from this crate with `verbose`.
pub fn init(verbose: bool) {
    let default_level = if verbose {
        "sleek_invoices=debug,sleek=debug,info"
    } else {
        "warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from an embedding program) is not an error for us
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .compact(),
        )
        .try_init();
}
