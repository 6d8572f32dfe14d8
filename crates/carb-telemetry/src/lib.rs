//! Structured logging init and a small ingest-counter observer.
//!
//! Human-readable logging is the default; setting `CARB_LOG_JSON=1`
//! switches the same subscriber to JSON output, so operators can pipe a
//! run into a log aggregator without code changes.

#![deny(unsafe_code)]

pub mod observer;

pub use observer::{CountingObserver, IngestObserver, IngestSpan};

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Initialize the global `tracing` subscriber. `RUST_LOG` controls the
/// filter (default `info`); `CARB_LOG_JSON=1` switches to JSON records.
/// Safe to call once per process; a second call is a silent no-op.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("CARB_LOG_JSON").map(|v| v == "1").unwrap_or(false);

    if json {
        let fmt_layer = fmt::layer().json().with_current_span(true).with_span_list(true);
        let subscriber = Registry::default().with(filter).with(fmt_layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        let fmt_layer = fmt::layer();
        let subscriber = Registry::default().with(filter).with(fmt_layer);
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}
