use chrono::Local;
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Operator-facing log line: `[rp-reporter] LEVEL hh:mm:ss message`.
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let level = *event.metadata().level();
        let timestamp = Local::now().format("%H:%M:%S");

        write!(
            writer,
            "[rp-reporter] {:<5} {}: ",
            level_label(level),
            timestamp
        )?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

fn level_label(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::TRACE => "TRACE",
        tracing::Level::DEBUG => "DEBUG",
        tracing::Level::INFO => "INFO",
        tracing::Level::WARN => "WARN",
        tracing::Level::ERROR => "ERROR",
    }
}

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "rp_reporter=debug,rp_replay=debug,warn"
    } else {
        "rp_reporter=warn,error"
    }
}

/// Install the formatter on stderr. `RUST_LOG` takes precedence over the
/// default filter. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .event_format(CustomFormatter)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(default_filter(true).contains("rp_reporter=debug"));
        assert!(default_filter(false).starts_with("rp_reporter=warn"));
    }

    #[test]
    fn test_level_label() {
        assert_eq!(level_label(tracing::Level::ERROR), "ERROR");
    }
}
