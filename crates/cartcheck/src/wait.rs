//! Wait mechanisms.
//!
//! Everything that waits goes through [`wait_until`], a bounded async poll
//! of a fallible probe. Element auto-waiting, URL waits and load-state waits
//! are all phrased as probes over the page driver.

use crate::result::{CartcheckError, CartcheckResult};
use regex::Regex;
use std::future::Future;
use std::time::{Duration, Instant};

/// Default auto-wait bound for element actions (10 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 10_000;

/// Default navigation bound (30 seconds)
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without new resource responses)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Timing rules for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Auto-wait bound for element actions and assertions
    pub timeout: Duration,
    /// Gap between probes
    pub poll_interval: Duration,
    /// Bound for navigations and URL waits
    pub navigation_timeout: Duration,
    /// Pause after every wrapper action
    pub slow_mo: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            navigation_timeout: Duration::from_millis(DEFAULT_NAVIGATION_TIMEOUT_MS),
            slow_mo: Duration::ZERO,
        }
    }
}

impl WaitPolicy {
    /// Set the action timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// The `load` event has fired
    #[default]
    Load,
    /// `DOMContentLoaded` has fired
    DomContentLoaded,
    /// Loaded, and no resource finished in the last 500ms
    NetworkIdle,
}

impl LoadState {
    /// Get the event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }

    /// Script returning `true` once the state is reached
    #[must_use]
    pub fn ready_script(&self) -> String {
        match self {
            Self::Load => "/*loadstate*/ document.readyState === 'complete'".to_string(),
            Self::DomContentLoaded => {
                "/*loadstate*/ document.readyState !== 'loading'".to_string()
            }
            Self::NetworkIdle => format!(
                "/*loadstate*/ (() => {{ if (document.readyState !== 'complete') return false; \
                 const last = performance.getEntriesByType('resource')\
                 .reduce((m, r) => Math.max(m, r.responseEnd), 0); \
                 return performance.now() - last >= {NETWORK_IDLE_THRESHOLD_MS}; }})()"
            ),
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// URL matching pattern
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(Regex),
    /// Glob pattern where `*` and `**` match any run of characters
    Glob(String),
}

impl UrlPattern {
    /// Build a regex pattern
    ///
    /// # Errors
    ///
    /// Returns error if the regex does not compile
    pub fn regex(pattern: &str) -> CartcheckResult<Self> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| CartcheckError::Config {
                key: "url pattern".to_string(),
                message: e.to_string(),
            })
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Regex(re) => re.is_match(url),
            Self::Glob(pattern) => glob_matches(pattern, url),
        }
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "{p}"),
            Self::Contains(p) => write!(f, "*{p}*"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
            Self::Glob(p) => write!(f, "{p}"),
        }
    }
}

impl From<&str> for UrlPattern {
    /// Strings containing `*` are globs, anything else must match exactly
    fn from(pattern: &str) -> Self {
        if pattern.contains('*') {
            Self::Glob(pattern.to_string())
        } else {
            Self::Exact(pattern.to_string())
        }
    }
}

fn glob_matches(pattern: &str, url: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let mut pos = 0;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        let rest = &url[pos..];
        let found = if i == parts.len() - 1 && !pattern.ends_with('*') {
            // last literal must anchor at the end
            rest.rfind(part).filter(|at| at + part.len() == rest.len())
        } else {
            rest.find(part)
        };
        match found {
            Some(at) if i == 0 && at != 0 => return false,
            Some(at) => pos += at + part.len(),
            None => return false,
        }
    }
    pattern.ends_with('*') || pos == url.len()
}

/// Poll `probe` until it yields a value or `timeout` elapses.
///
/// The probe runs at least once. Transient probe errors (see
/// [`CartcheckError::is_transient`]) count as "not yet"; the last one is
/// named in the timeout. Any other error ends the wait at once.
///
/// # Errors
///
/// Returns [`CartcheckError::Timeout`] naming `what` when time runs out
pub async fn wait_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut probe: F,
) -> CartcheckResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CartcheckResult<Option<T>>>,
{
    let start = Instant::now();
    let mut last_error: Option<CartcheckError> = None;
    loop {
        match probe().await {
            Ok(Some(value)) => {
                tracing::trace!(what, elapsed_ms = start.elapsed().as_millis() as u64, "wait satisfied");
                return Ok(value);
            }
            Ok(None) => last_error = None,
            Err(e) if e.is_transient() => {
                tracing::trace!(what, error = %e, "probe failed, polling again");
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
        if start.elapsed() >= timeout {
            let what = match last_error {
                Some(e) => format!("{what} (last error: {e})"),
                None => what.to_string(),
            };
            return Err(CartcheckError::Timeout {
                what,
                ms: timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(poll_interval).await;
    }
}
