pub const STATICS_LEVEL: tracing::Level = tracing::Level::INFO;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{filter, fmt, registry, EnvFilter};

/// Pretty fmt layer on a non-blocking stdout writer, filtered by `RUST_LOG`
/// (warnings and errors when unset). Keep the guard alive until exit so
/// buffered lines get flushed.
pub fn default<S>() -> (
    filter::Filtered<
        fmt::Layer<
            S,
            fmt::format::Pretty,
            fmt::format::Format<fmt::format::Pretty>,
            tracing_appender::non_blocking::NonBlocking,
        >,
        EnvFilter,
        S,
    >,
    WorkerGuard,
)
where
    S: Subscriber + for<'span> registry::LookupSpan<'span> + Send + Sync,
{
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer()
        .pretty()
        .with_writer(non_blocking)
        .with_filter(filter_layer);
    (fmt_layer, guard)
}

/// Installs [`default`] as the global subscriber.
pub fn init() -> WorkerGuard {
    let (layer, guard) = default();
    if tracing_subscriber::registry().with(layer).try_init().is_err() {
        tracing::debug!("global subscriber already installed");
    }
    guard
}
