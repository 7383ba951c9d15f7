//! Per-test browser session with failure artifacts.
//!
//! A [`Session`] owns one browser page for one test. [`Session::run`]
//! executes the test body, hands a failing run to each registered
//! [`FailureHook`], and always closes the browser afterwards, whether the
//! body passed, failed, or was deselected by the marker filter.
//!
//! The default hook, [`ArtifactCapture`], writes
//! `{SCREENSHOT_DIR}/{test_id}.png` and, unless tracing is off,
//! `{TRACE_DIR}/{test_id}.json`.

use crate::config::{Settings, TraceMode};
use crate::driver::PageDriver;
use crate::marker::{Marker, MarkerFilter};
use crate::page::BasePage;
use crate::result::{CartcheckError, CartcheckResult};
use crate::trace::{with_tracer, ActionTracer, SharedTracer, TraceArchive};
use async_trait::async_trait;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identity of the running test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInfo {
    /// Test identifier, e.g. `cart::update_quantity`
    pub test_id: String,
    /// Markers the test belongs to
    pub markers: Vec<Marker>,
}

impl TestInfo {
    /// Test with no markers
    #[must_use]
    pub fn new(test_id: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            markers: Vec::new(),
        }
    }

    /// Attach markers
    #[must_use]
    pub fn with_markers(mut self, markers: &[Marker]) -> Self {
        self.markers.extend_from_slice(markers);
        self
    }

    /// Identifier safe to use as a file stem
    #[must_use]
    pub fn file_stem(&self) -> String {
        sanitize_test_id(&self.test_id)
    }

    /// Whether the run's marker expression selects this test
    ///
    /// # Errors
    ///
    /// Returns `InvalidMarker` if the configured expression is malformed
    pub fn is_selected(&self, settings: &Settings) -> CartcheckResult<bool> {
        let filter = MarkerFilter::from_expression(settings.markers.as_deref())?;
        Ok(filter.selects(&self.markers))
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
#[must_use]
pub fn sanitize_test_id(test_id: &str) -> String {
    let stem: String = test_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.trim_matches('.').is_empty() {
        "unnamed".to_string()
    } else {
        stem
    }
}

/// What a failure hook gets to look at
#[derive(Debug)]
pub struct FailureContext<'a> {
    /// The failed test
    pub info: &'a TestInfo,
    /// The page the test was driving
    pub page: &'a BasePage,
    /// The error the body returned
    pub error: &'a CartcheckError,
    /// Actions recorded up to the failure
    pub trace: TraceArchive,
}

/// Callback run when a test body fails, before the browser closes
#[async_trait]
pub trait FailureHook: Send + Sync {
    /// Hook name for logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Inspect the failed test
    ///
    /// # Errors
    ///
    /// Hook errors are logged; they never replace the test's own error
    async fn on_failure(&self, ctx: &FailureContext<'_>) -> CartcheckResult<()>;
}

/// Writes the failure screenshot and trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCapture {
    trace_dir: PathBuf,
    trace_mode: TraceMode,
}

impl ArtifactCapture {
    /// Capture into the directories named by `settings`
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            trace_dir: settings.trace_dir.clone(),
            trace_mode: settings.trace_mode,
        }
    }

    /// Trace path for a test
    #[must_use]
    pub fn trace_path(&self, info: &TestInfo) -> PathBuf {
        trace_file(&self.trace_dir, info)
    }
}

fn trace_file(dir: &Path, info: &TestInfo) -> PathBuf {
    dir.join(format!("{}.json", info.file_stem()))
}

#[async_trait]
impl FailureHook for ArtifactCapture {
    fn name(&self) -> &str {
        "artifact-capture"
    }

    async fn on_failure(&self, ctx: &FailureContext<'_>) -> CartcheckResult<()> {
        let stem = ctx.info.file_stem();
        let screenshot = ctx.page.take_screenshot(&stem).await;

        if self.trace_mode.keeps(true) {
            let path = self.trace_path(ctx.info);
            ctx.trace.save_json(&path).await?;
            tracing::warn!(test = %ctx.info.test_id, path = %path.display(), "trace saved");
        }

        screenshot.map(|_| ())
    }
}

/// One test's browser session
pub struct Session {
    info: TestInfo,
    settings: Settings,
    driver: Arc<dyn PageDriver>,
    tracer: SharedTracer,
    hooks: Vec<Box<dyn FailureHook>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("info", &self.info)
            .field("base_url", &self.settings.base_url)
            .field("hooks", &self.hooks.iter().map(|h| h.name()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Launch a fresh Chromium page for `info`
    ///
    /// # Errors
    ///
    /// Returns `BrowserLaunch` if Chromium fails to start
    #[cfg(feature = "browser")]
    pub async fn launch(settings: Settings, info: TestInfo) -> CartcheckResult<Self> {
        let driver = crate::browser::ChromiumDriver::launch(settings.driver_config()).await?;
        Ok(Self::with_driver(Arc::new(driver), settings, info))
    }

    /// Wrap an existing driver
    #[must_use]
    pub fn with_driver(driver: Arc<dyn PageDriver>, settings: Settings, info: TestInfo) -> Self {
        let tracer = ActionTracer::shared(&info.test_id);
        let hooks: Vec<Box<dyn FailureHook>> = vec![Box::new(ArtifactCapture::from_settings(&settings))];
        tracing::info!(test = %info.test_id, "session opened");
        Self {
            info,
            settings,
            driver,
            tracer,
            hooks,
        }
    }

    /// Register another failure hook
    #[must_use]
    pub fn with_hook(mut self, hook: impl FailureHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Drop every hook, including artifact capture
    #[must_use]
    pub fn without_hooks(mut self) -> Self {
        self.hooks.clear();
        self
    }

    /// Test identity
    #[must_use]
    pub const fn info(&self) -> &TestInfo {
        &self.info
    }

    /// Run settings
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Shared action recorder
    #[must_use]
    pub const fn tracer(&self) -> &SharedTracer {
        &self.tracer
    }

    /// A base page bound to this session's browser, traced unless
    /// `TRACE_MODE=off`
    #[must_use]
    pub fn page(&self) -> BasePage {
        let page = BasePage::new(Arc::clone(&self.driver), &self.settings);
        if self.settings.trace_mode.records() {
            page.with_tracer(Arc::clone(&self.tracer))
        } else {
            page
        }
    }

    /// Run `body`, capture artifacts if it fails, then close the browser
    ///
    /// A test deselected by the marker filter returns `Ok` without running.
    ///
    /// # Errors
    ///
    /// Returns the body's error unchanged, or `InvalidMarker`
    pub async fn run<F, Fut>(self, body: F) -> CartcheckResult<()>
    where
        F: FnOnce(BasePage) -> Fut,
        Fut: Future<Output = CartcheckResult<()>>,
    {
        let selected = match self.info.is_selected(&self.settings) {
            Ok(selected) => selected,
            Err(err) => {
                self.close().await;
                return Err(err);
            }
        };
        if !selected {
            tracing::info!(
                test = %self.info.test_id,
                markers = ?self.info.markers,
                "deselected by marker expression"
            );
            self.close().await;
            return Ok(());
        }

        let page = self.page();
        let result = body(page.clone()).await;

        match &result {
            Ok(()) => {
                tracing::info!(test = %self.info.test_id, "passed");
                if self.settings.trace_mode.keeps(false) {
                    self.save_passing_trace().await;
                }
            }
            Err(err) => self.report_failure(&page, err).await,
        }

        self.close().await;
        result
    }

    async fn report_failure(&self, page: &BasePage, error: &CartcheckError) {
        let url = self.driver.current_url().await.unwrap_or_default();
        tracing::warn!(test = %self.info.test_id, url = %url, error = %error, "failed");
        with_tracer(&self.tracer, |t| t.note("failure", &format!("{error} (at {url})")));

        let ctx = FailureContext {
            info: &self.info,
            page,
            error,
            trace: with_tracer(&self.tracer, |t| t.archive()),
        };
        for hook in &self.hooks {
            if let Err(hook_err) = hook.on_failure(&ctx).await {
                tracing::warn!(hook = hook.name(), error = %hook_err, "failure hook failed");
            }
        }
    }

    async fn save_passing_trace(&self) {
        let path = trace_file(&self.settings.trace_dir, &self.info);
        let archive = with_tracer(&self.tracer, |t| t.archive());
        match archive.save_json(&path).await {
            Ok(()) => tracing::info!(path = %path.display(), "trace saved"),
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "trace not saved"),
        }
    }

    async fn close(&self) {
        match self.driver.close().await {
            Ok(()) => tracing::info!(test = %self.info.test_id, "session closed"),
            Err(err) => tracing::warn!(test = %self.info.test_id, error = %err, "session close failed"),
        }
    }
}
