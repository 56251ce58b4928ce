//! Console logging for the command-line tool.
//!
//! Library crates log through the `log` facade; records are bridged into a
//! `tracing` subscriber so one filter governs both.

use std::io;

use chrono::Local;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging to stderr.
///
/// `RUST_LOG` wins over `verbose`, which raises the default level from
/// `info` to `debug`.
pub fn init_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries reports
    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(verbose)
            .with_level(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_timer(LocalTimeTimer),
    );

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to set default subscriber: {}", e))?;

    tracing_log::LogTracer::init().map_err(|e| format!("Failed to initialize LogTracer: {}", e))?;

    Ok(())
}

/// Local time with microseconds.
#[derive(Debug, Clone, Copy)]
struct LocalTimeTimer;

impl fmt::time::FormatTime for LocalTimeTimer {
    fn format_time(&self, w: &mut fmt::format::Writer) -> std::fmt::Result {
        let now = Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.6f"))
    }
}
