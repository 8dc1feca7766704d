//! Operational diagnostics
//!
//! The service's own startup/shutdown/reconnect messages — as opposed to
//! ingested log records — are emitted through `tracing` and rendered in a
//! `[HH:MM:SS] LEVEL: name - message` line, echoing the uvicorn-style
//! console output the original process printed on stderr.

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Installs the global subscriber. Honors `RUST_LOG` via `EnvFilter`,
/// defaulting to `info` when unset.
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(ServiceFormat)
        .init();
}

struct ClockTime;

impl FormatTime for ClockTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S"))
    }
}

/// Renders `[HH:MM:SS] LEVEL: target - message`.
pub struct ServiceFormat;

impl<S, N> FormatEvent<S, N> for ServiceFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        write!(writer, "[")?;
        ClockTime.format_time(&mut writer)?;
        write!(writer, "] {}: {} - ", event.metadata().level(), event.metadata().target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
