//! Browser console logging

use std::sync::Once;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Pretty;
use tracing_subscriber::prelude::*;
use tracing_web::{MakeWebConsoleWriter, performance_layer};

static INIT: Once = Once::new();

/// Route `tracing` events to the web console; later calls are no-ops
pub fn init_logging() {
    INIT.call_once(|| {
        let level = if cfg!(debug_assertions) {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .without_time()
            .with_writer(MakeWebConsoleWriter::new());
        let perf_layer = performance_layer().with_details_from_fields(Pretty::default());

        let _ = tracing_subscriber::registry()
            .with(level)
            .with(fmt_layer)
            .with(perf_layer)
            .try_init();
    });
}
