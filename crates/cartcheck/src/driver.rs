//! Browser driver seam.
//!
//! Page objects never talk to a browser engine directly. They go through
//! [`PageDriver`], which has two implementations:
//!
//! - `ChromiumDriver` (feature `browser`) speaks CDP through chromiumoxide
//! - [`MockDriver`] records calls and answers scripts from canned rules
//!
//! Every element interaction is expressed as an in-page script, so the
//! trait stays small: navigation, evaluation, a real mouse hover, and
//! screenshots.

use crate::result::{CartcheckError, CartcheckResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A point in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Screenshot data with metadata
#[derive(Debug, Clone)]
pub struct Screenshot {
    /// Raw PNG data
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Timestamp when screenshot was taken
    pub timestamp: std::time::SystemTime,
}

impl Screenshot {
    /// Create a new screenshot
    #[must_use]
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: std::time::SystemTime::now(),
        }
    }

    /// Get the size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if screenshot is valid (has data)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty() && self.width > 0 && self.height > 0
    }
}

/// Browser configuration for driver
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
    /// Accept self-signed certificates
    pub ignore_https_errors: bool,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Executable path override
    pub executable_path: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            navigation_timeout: Duration::from_secs(30),
            ignore_https_errors: true,
            sandbox: true,
            executable_path: None,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set executable path
    #[must_use]
    pub fn executable(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }
}

/// Abstract driver for one browser page.
///
/// All methods take `&self`; implementations hold their page behind
/// interior mutability so page objects can share one handle.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL and wait for the load event
    async fn navigate(&self, url: &str) -> CartcheckResult<()>;

    /// Evaluate a script expression, awaiting promises, returning its JSON value
    async fn evaluate(&self, script: &str) -> CartcheckResult<serde_json::Value>;

    /// Move the real mouse pointer to a viewport point
    async fn hover_at(&self, point: Point) -> CartcheckResult<()>;

    /// Take a full-page screenshot
    async fn screenshot(&self) -> CartcheckResult<Screenshot>;

    /// Get current URL
    async fn current_url(&self) -> CartcheckResult<String>;

    /// Get document title
    async fn title(&self) -> CartcheckResult<String>;

    /// Close the page and its browser
    async fn close(&self) -> CartcheckResult<()>;
}

/// Canned answer for scripts containing every fragment
#[derive(Debug, Clone)]
struct ScriptRule {
    fragments: Vec<String>,
    values: VecDeque<serde_json::Value>,
}

impl ScriptRule {
    fn matches(&self, script: &str) -> bool {
        self.fragments.iter().all(|f| script.contains(f.as_str()))
    }

    /// Consume the next value; the last one repeats forever
    fn next_value(&mut self) -> serde_json::Value {
        if self.values.len() > 1 {
            self.values.pop_front().unwrap_or_default()
        } else {
            self.values.front().cloned().unwrap_or_default()
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    current_url: String,
    title: String,
    rules: Vec<ScriptRule>,
    screenshot: Option<Screenshot>,
    call_history: Vec<String>,
    failures: VecDeque<(String, String)>,
    closed: bool,
}

impl MockState {
    /// Take the first queued failure for `method`, if any
    fn take_failure(&mut self, method: &str) -> Option<CartcheckError> {
        let at = self.failures.iter().position(|(m, _)| m == method)?;
        let (_, message) = self.failures.remove(at)?;
        Some(CartcheckError::Script { message })
    }
}

/// Mock driver for unit testing
///
/// Scripts are answered by the most recently added rule whose fragments
/// all appear in the script; unmatched scripts evaluate to `null`.
#[derive(Debug, Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start on a given URL
    #[must_use]
    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.set_current_url(url);
        self
    }

    /// Set mock screenshot
    #[must_use]
    pub fn with_screenshot(self, screenshot: Screenshot) -> Self {
        self.state().screenshot = Some(screenshot);
        self
    }

    /// Simulate a redirect or in-page navigation
    pub fn set_current_url(&self, url: impl Into<String>) {
        self.state().current_url = url.into();
    }

    /// Set the document title
    pub fn set_title(&self, title: impl Into<String>) {
        self.state().title = title.into();
    }

    /// Answer scripts containing all `fragments` with `value`
    pub fn on_script(&self, fragments: &[&str], value: serde_json::Value) {
        self.on_script_sequence(fragments, vec![value]);
    }

    /// Answer matching scripts with `values` in order, repeating the last
    pub fn on_script_sequence(&self, fragments: &[&str], values: Vec<serde_json::Value>) {
        self.state().rules.push(ScriptRule {
            fragments: fragments.iter().map(|f| (*f).to_string()).collect(),
            values: values.into(),
        });
    }

    /// Make the next call to `method` (`evaluate` or `current_url`) fail
    /// with a script error, as CDP does while a page is navigating away
    pub fn fail_next(&self, method: &str, message: impl Into<String>) {
        self.state()
            .failures
            .push_back((method.to_string(), message.into()));
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.state()
            .call_history
            .iter()
            .any(|c| c.starts_with(method))
    }

    /// Scripts evaluated so far
    #[must_use]
    pub fn scripts(&self) -> Vec<String> {
        self.state()
            .call_history
            .iter()
            .filter_map(|c| c.strip_prefix("evaluate:").map(str::to_string))
            .collect()
    }

    /// Whether `close` was called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> CartcheckResult<()> {
        let mut state = self.state();
        state.call_history.push(format!("navigate:{url}"));
        state.current_url = url.to_string();
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> CartcheckResult<serde_json::Value> {
        let mut state = self.state();
        state.call_history.push(format!("evaluate:{script}"));
        if let Some(err) = state.take_failure("evaluate") {
            return Err(err);
        }
        let value = state
            .rules
            .iter_mut()
            .rev()
            .find(|rule| rule.matches(script))
            .map(ScriptRule::next_value)
            .unwrap_or(serde_json::Value::Null);
        Ok(value)
    }

    async fn hover_at(&self, point: Point) -> CartcheckResult<()> {
        self.state()
            .call_history
            .push(format!("hover_at:{},{}", point.x, point.y));
        Ok(())
    }

    async fn screenshot(&self) -> CartcheckResult<Screenshot> {
        let mut state = self.state();
        state.call_history.push("screenshot".to_string());
        state
            .screenshot
            .clone()
            .ok_or_else(|| CartcheckError::Screenshot {
                message: "No mock screenshot set".to_string(),
            })
    }

    async fn current_url(&self) -> CartcheckResult<String> {
        let mut state = self.state();
        if let Some(err) = state.take_failure("current_url") {
            return Err(err);
        }
        Ok(state.current_url.clone())
    }

    async fn title(&self) -> CartcheckResult<String> {
        Ok(self.state().title.clone())
    }

    async fn close(&self) -> CartcheckResult<()> {
        let mut state = self.state();
        state.call_history.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}
