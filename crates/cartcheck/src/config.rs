//! Environment-driven run configuration.
//!
//! Every knob has a documented default so a bare `cargo test` against
//! `http://localhost/` works without any variables set.

use crate::driver::DriverConfig;
use crate::result::{CartcheckError, CartcheckResult};
use crate::wait::WaitPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Storefront root used when `BASE_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

/// Admin panel used when `ADMIN_URL` is unset
pub const DEFAULT_ADMIN_URL: &str = "http://localhost/admin";

/// Environment variable holding the marker expression
pub const MARKERS_ENV: &str = "CARTCHECK_MARKERS";

/// When trace archives are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TraceMode {
    /// Never record
    Off,
    /// Keep the trace of every test
    On,
    /// Keep traces only for failed tests
    #[default]
    RetainOnFailure,
}

impl TraceMode {
    /// Parse the `TRACE_MODE` value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "false" | "0" => Some(Self::Off),
            "on" | "true" | "1" => Some(Self::On),
            "retain-on-failure" | "retain_on_failure" => Some(Self::RetainOnFailure),
            _ => None,
        }
    }

    /// Whether actions should be recorded at all
    #[must_use]
    pub const fn records(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Whether a trace is written for a test with the given outcome
    #[must_use]
    pub const fn keeps(self, failed: bool) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::RetainOnFailure => failed,
        }
    }
}

/// Admin panel credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    /// Admin user name
    pub username: String,
    /// Admin password
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

/// Resolved settings for one test process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Storefront root, always ending in `/`
    pub base_url: String,
    /// Admin panel URL
    pub admin_url: String,
    /// Admin credentials
    pub admin: AdminCredentials,
    /// Run the browser headless
    pub headless: bool,
    /// Pause after every wrapper action (ms)
    pub slow_mo_ms: u64,
    /// Auto-wait bound for element actions (ms)
    pub action_timeout_ms: u64,
    /// Bound for navigations (ms)
    pub navigation_timeout_ms: u64,
    /// Auto-wait polling interval (ms)
    pub poll_interval_ms: u64,
    /// Browser executable override
    pub chromium_path: Option<String>,
    /// Disable the Chromium sandbox
    pub no_sandbox: bool,
    /// Failure screenshot directory
    pub screenshot_dir: PathBuf,
    /// Trace archive directory
    pub trace_dir: PathBuf,
    /// Trace retention
    pub trace_mode: TraceMode,
    /// Marker expression (None selects everything)
    pub markers: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            admin_url: DEFAULT_ADMIN_URL.to_string(),
            admin: AdminCredentials::default(),
            headless: true,
            slow_mo_ms: 0,
            action_timeout_ms: 10_000,
            navigation_timeout_ms: 30_000,
            poll_interval_ms: 50,
            chromium_path: None,
            no_sandbox: false,
            screenshot_dir: PathBuf::from("screenshots"),
            trace_dir: PathBuf::from("traces"),
            trace_mode: TraceMode::RetainOnFailure,
            markers: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> CartcheckResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> CartcheckResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self::default();

        if let Some(url) = get("BASE_URL") {
            settings.base_url = normalize_base_url(&url)?;
        }
        if let Some(url) = get("ADMIN_URL") {
            settings.admin_url = url;
        }
        if let Some(user) = get("ADMIN_USERNAME") {
            settings.admin.username = user;
        }
        if let Some(pass) = get("ADMIN_PASSWORD") {
            settings.admin.password = pass;
        }
        if let Some(v) = get("HEADLESS") {
            settings.headless = parse_bool("HEADLESS", &v)?;
        }
        if let Some(v) = get("SLOW_MO") {
            settings.slow_mo_ms = parse_ms("SLOW_MO", &v)?;
        }
        if let Some(v) = get("ACTION_TIMEOUT_MS") {
            settings.action_timeout_ms = parse_ms("ACTION_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("NAVIGATION_TIMEOUT_MS") {
            settings.navigation_timeout_ms = parse_ms("NAVIGATION_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("POLL_INTERVAL_MS") {
            settings.poll_interval_ms = parse_ms("POLL_INTERVAL_MS", &v)?.max(1);
        }
        settings.chromium_path = get("CHROMIUM_PATH");
        if let Some(v) = get("NO_SANDBOX") {
            settings.no_sandbox = parse_bool("NO_SANDBOX", &v)?;
        }
        if let Some(dir) = get("SCREENSHOT_DIR") {
            settings.screenshot_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("TRACE_DIR") {
            settings.trace_dir = PathBuf::from(dir);
        }
        if let Some(v) = get("TRACE_MODE") {
            settings.trace_mode = TraceMode::parse(&v).ok_or_else(|| CartcheckError::Config {
                key: "TRACE_MODE".to_string(),
                message: format!("expected off, on or retain-on-failure, got '{v}'"),
            })?;
        }
        settings.markers = get(MARKERS_ENV);

        Ok(settings)
    }

    /// Set the storefront root
    #[must_use]
    ///
    /// # Errors
    ///
    /// Returns `Config` if `url` is not an absolute http(s) URL
    pub fn with_base_url(mut self, url: &str) -> CartcheckResult<Self> {
        self.base_url = normalize_base_url(url)?;
        Ok(self)
    }

    /// Set the element auto-wait bound
    #[must_use]
    pub const fn with_action_timeout_ms(mut self, ms: u64) -> Self {
        self.action_timeout_ms = ms;
        self
    }

    /// Set the artifact directories
    #[must_use]
    pub fn with_artifact_dirs(
        mut self,
        screenshots: impl Into<PathBuf>,
        traces: impl Into<PathBuf>,
    ) -> Self {
        self.screenshot_dir = screenshots.into();
        self.trace_dir = traces.into();
        self
    }

    /// Set trace retention
    #[must_use]
    pub const fn with_trace_mode(mut self, mode: TraceMode) -> Self {
        self.trace_mode = mode;
        self
    }

    /// Join a storefront-relative path onto the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Wait policy derived from the timeouts
    #[must_use]
    pub const fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            timeout: Duration::from_millis(self.action_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            navigation_timeout: Duration::from_millis(self.navigation_timeout_ms),
            slow_mo: Duration::from_millis(self.slow_mo_ms),
        }
    }

    /// Browser launch configuration
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        let mut config = DriverConfig::new()
            .headless(self.headless)
            .navigation_timeout(Duration::from_millis(self.navigation_timeout_ms));
        config.executable_path.clone_from(&self.chromium_path);
        config.sandbox = !self.no_sandbox;
        config
    }
}

/// Parse a storefront root; its path always ends in `/` so relative
/// routes resolve beneath it
fn normalize_base_url(raw: &str) -> CartcheckResult<String> {
    let invalid = |message: String| CartcheckError::Config {
        key: "BASE_URL".to_string(),
        message,
    };
    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(format!("'{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("'{raw}' is not an http(s) URL")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url.into())
}

/// Resolve `path` against the storefront root; absolute URLs pass through.
/// A leading `/` is dropped so routes stay under a sub-directory install.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let relative = path.trim_start_matches('/');
    match Url::parse(base_url).and_then(|base| base.join(relative)) {
        Ok(url) => url.into(),
        Err(e) => {
            tracing::warn!(base_url, path, error = %e, "cannot resolve URL, using it as given");
            path.to_string()
        }
    }
}

fn parse_bool(key: &str, value: &str) -> CartcheckResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CartcheckError::Config {
            key: key.to_string(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_ms(key: &str, value: &str) -> CartcheckResult<u64> {
    value.trim().parse().map_err(|_| CartcheckError::Config {
        key: key.to_string(),
        message: format!("expected milliseconds, got '{value}'"),
    })
}
