use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the process-wide tracing subscriber.
///
/// `RUST_LOG` overrides the default `info` filter. Log lines go through a
/// non-blocking stdout writer; keep the returned guard alive until exit or
/// buffered lines are lost.
pub fn init_tracing() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // A subscriber may already be installed (e.g. by a test harness).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .try_init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::{filter::LevelFilter, Layer, Registry};

    #[test]
    fn default_filter_caps_every_target_at_info() {
        let filter = EnvFilter::try_new(DEFAULT_LOG_FILTER).unwrap();
        let hint = <EnvFilter as Layer<Registry>>::max_level_hint(&filter);
        assert_eq!(hint, Some(LevelFilter::INFO));
    }
}
