//! stderr logging through `tracing`.

use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `KHATA_LOG` wins over everything; otherwise `-v` picks info, `-vv` debug,
/// and without flags the `[log] level` from config.toml or "warn" applies.
pub fn init(verbosity: u8, configured: Option<&str>) {
    let fallback = match verbosity {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("KHATA_LOG")
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}
