//! Stderr diagnostics for the agilemind CLI.
//!
//! Run results go to `output.txt` and the final response to stdout; nothing
//! here is part of that product output. `RUST_LOG` wins over `-v` when set.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset, by `-v` count.
///
/// Only this crate gets louder; dependencies stay at `warn`.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,agilemind=info",
        2 => "warn,agilemind=debug",
        _ => "warn,agilemind=trace",
    }
}

/// Install the global subscriber: stderr, compact format.
///
/// ```bash
/// agilemind -vv dev --demand "a todo app" --output out
/// RUST_LOG=agilemind::io=trace agilemind dev --demand "a todo app" --output out
/// ```
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
