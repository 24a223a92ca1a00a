use tracing_subscriber::{fmt::time::UtcTime, EnvFilter};

pub const LOG_FILTER_ENV: &str = "ASSETFIX_LOG";
pub const LOG_FORMAT_ENV: &str = "ASSETFIX_LOG_FORMAT";
const DEFAULT_FILTER: &str = "assetfix=info,sqlx=warn";

/// Installs the global subscriber on stderr, leaving stdout to the report.
///
/// `ASSETFIX_LOG` takes an env-filter directive; `ASSETFIX_LOG_FORMAT=json`
/// switches to one JSON object per event. Repeated calls are no-ops.
pub fn init_logging() {
    let _ = tracing_log::LogTracer::init();
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339());

    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.compact().try_init();
    }
}
