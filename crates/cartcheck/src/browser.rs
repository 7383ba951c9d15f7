//! Chromium control over the Chrome `DevTools` Protocol.
//!
//! Compiled only with the `browser` feature. Each [`ChromiumDriver`] owns a
//! dedicated browser process with a single page, which gives every test an
//! isolated cookie jar and cart.

use crate::driver::{DriverConfig, PageDriver, Point, Screenshot};
use crate::result::{CartcheckError, CartcheckResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// The process half of a launched browser
#[async_trait]
trait BrowserProcess: Send {
    /// Ask the browser to close
    async fn close(&mut self) -> Result<(), String>;

    /// Reap the process
    async fn wait(&mut self) -> Result<(), String>;
}

#[async_trait]
impl BrowserProcess for CdpBrowser {
    async fn close(&mut self) -> Result<(), String> {
        CdpBrowser::close(self).await.map(|_| ()).map_err(|e| e.to_string())
    }

    async fn wait(&mut self) -> Result<(), String> {
        CdpBrowser::wait(self).await.map(|_| ()).map_err(|e| e.to_string())
    }
}

/// Close and reap `browser`, then stop the CDP handler task whatever the
/// first two steps did. A failed reap is only logged.
async fn shut_down<B: BrowserProcess>(
    browser: Option<B>,
    handler: &JoinHandle<()>,
) -> CartcheckResult<()> {
    let mut closed = Ok(());
    if let Some(mut browser) = browser {
        closed = browser
            .close()
            .await
            .map_err(|message| CartcheckError::Page {
                message: format!("closing chromium: {message}"),
            });
        if let Err(error) = browser.wait().await {
            tracing::warn!(%error, "chromium process did not exit cleanly");
        }
    }
    handler.abort();
    match &closed {
        Ok(()) => tracing::info!("chromium closed"),
        Err(error) => tracing::warn!(%error, "chromium close failed"),
    }
    closed
}

/// Real browser page driven over CDP
#[derive(Debug)]
pub struct ChromiumDriver {
    config: DriverConfig,
    browser: Mutex<Option<CdpBrowser>>,
    page: CdpPage,
    handle: JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch a new browser instance and open a blank page
    ///
    /// # Errors
    ///
    /// Returns error if the browser cannot be launched or the page created
    pub async fn launch(config: DriverConfig) -> CartcheckResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(config.viewport_width, config.viewport_height)
            .request_timeout(config.navigation_timeout);

        if !config.headless {
            builder = builder.with_head();
        }

        if !config.sandbox {
            builder = builder.no_sandbox();
        }

        if config.ignore_https_errors {
            builder = builder.arg("--ignore-certificate-errors");
        }

        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|e| CartcheckError::BrowserLaunch { message: e })?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
            CartcheckError::BrowserLaunch {
                message: e.to_string(),
            }
        })?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CartcheckError::Page {
                message: e.to_string(),
            })?;

        let metrics = SetDeviceMetricsOverrideParams::new(
            i64::from(config.viewport_width),
            i64::from(config.viewport_height),
            1.0,
            false,
        );
        page.execute(metrics)
            .await
            .map_err(|e| CartcheckError::Page {
                message: e.to_string(),
            })?;

        tracing::info!(
            headless = config.headless,
            width = config.viewport_width,
            height = config.viewport_height,
            "chromium launched"
        );

        Ok(Self {
            config,
            browser: Mutex::new(Some(browser)),
            page,
            handle,
        })
    }

    /// Get the driver configuration
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    async fn eval_string(&self, script: &str) -> CartcheckResult<String> {
        let value = self.evaluate(script).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> CartcheckResult<()> {
        let nav = tokio::time::timeout(self.config.navigation_timeout, self.page.goto(url)).await;
        match nav {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(CartcheckError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(CartcheckError::Timeout {
                what: format!("navigation to {url}"),
                ms: self.config.navigation_timeout.as_millis() as u64,
            }),
        }
    }

    async fn evaluate(&self, script: &str) -> CartcheckResult<serde_json::Value> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(|e| CartcheckError::Script { message: e })?;

        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| CartcheckError::Script {
                message: e.to_string(),
            })?;

        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn hover_at(&self, point: Point) -> CartcheckResult<()> {
        let params = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseMoved)
            .x(point.x)
            .y(point.y)
            .build()
            .map_err(|e| CartcheckError::Page { message: e })?;

        self.page
            .execute(params)
            .await
            .map_err(|e| CartcheckError::Page {
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn screenshot(&self) -> CartcheckResult<Screenshot> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .capture_beyond_viewport(true)
            .build();

        let screenshot =
            self.page
                .execute(params)
                .await
                .map_err(|e| CartcheckError::Screenshot {
                    message: e.to_string(),
                })?;

        use base64::Engine;
        let data = base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| CartcheckError::Screenshot {
                message: e.to_string(),
            })?;

        Ok(Screenshot::new(
            data,
            self.config.viewport_width,
            self.config.viewport_height,
        ))
    }

    async fn current_url(&self) -> CartcheckResult<String> {
        self.eval_string("window.location.href").await
    }

    async fn title(&self) -> CartcheckResult<String> {
        self.eval_string("document.title").await
    }

    async fn close(&self) -> CartcheckResult<()> {
        let browser = self.browser.lock().await.take();
        shut_down(browser, &self.handle).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeProcess {
        close: Result<(), String>,
        wait: Result<(), String>,
        waited: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BrowserProcess for FakeProcess {
        async fn close(&mut self) -> Result<(), String> {
            self.close.clone()
        }

        async fn wait(&mut self) -> Result<(), String> {
            self.waited.fetch_add(1, Ordering::SeqCst);
            self.wait.clone()
        }
    }

    fn handler() -> JoinHandle<()> {
        tokio::spawn(std::future::pending::<()>())
    }

    mod shutdown_tests {
        use super::*;

        #[tokio::test]
        async fn test_failed_close_still_reaps_and_stops_handler() {
            let waited = Arc::new(AtomicUsize::new(0));
            let process = FakeProcess {
                close: Err("websocket gone".into()),
                wait: Ok(()),
                waited: waited.clone(),
            };
            let handle = handler();
            let err = shut_down(Some(process), &handle).await.unwrap_err();
            assert!(err.to_string().contains("websocket gone"), "{err}");
            assert_eq!(waited.load(Ordering::SeqCst), 1);
            assert!(handle.await.unwrap_err().is_cancelled());
        }

        #[tokio::test]
        async fn test_failed_wait_is_not_an_error() {
            let process = FakeProcess {
                close: Ok(()),
                wait: Err("no child process".into()),
                waited: Arc::new(AtomicUsize::new(0)),
            };
            let handle = handler();
            shut_down(Some(process), &handle).await.unwrap();
            assert!(handle.await.unwrap_err().is_cancelled());
        }

        #[tokio::test]
        async fn test_already_closed_only_stops_handler() {
            let handle = handler();
            shut_down::<FakeProcess>(None, &handle).await.unwrap();
            assert!(handle.await.unwrap_err().is_cancelled());
        }
    }
}
