//! Subscriber setup for test runs.
//!
//! Wrapper actions log at `debug`, session lifecycle at `info`, failures
//! and artifact writes at `warn`. [`init`] installs a stderr subscriber
//! filtered by `RUST_LOG`; set `CARTCHECK_LOG_FORMAT=json` for one JSON
//! object per event.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "cartcheck=info,opencart_e2e=info";

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "CARTCHECK_LOG_FORMAT";

/// Output format of the stderr layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line human-readable events
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Interpret a `CARTCHECK_LOG_FORMAT` value; anything but `json` is compact
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Compact,
        }
    }

    /// Format selected by the environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// Install the global subscriber.
///
/// Safe to call from every test: only the first call in a process takes
/// effect, later calls return `false`.
pub fn init() -> bool {
    init_with(LogFormat::from_env())
}

/// Install the global subscriber with an explicit format
pub fn init_with(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().compact().with_writer(std::io::stderr)))
        .try_init()
        .is_ok()
}
