//! Base page wrapper and the page-object contract.
//!
//! [`BasePage`] is the capability every page object composes. It owns a
//! shared handle to the session's [`PageDriver`] and implements the
//! primitive actions with auto-waiting: before acting, the target locator
//! is probed every `poll_interval` until it is visible (or attached, for
//! reads) or the action timeout expires.
//!
//! Actions are recorded in the session's trace when one is attached, and
//! followed by the configured slow-motion pause.

use crate::config::{join_url, Settings};
use crate::driver::{MockDriver, PageDriver, Point};
use crate::locator::{js_str, Locator};
use crate::network::{capture_script, CapturedResponse};
use crate::result::{CartcheckError, CartcheckResult};
use crate::trace::{with_tracer, SharedTracer};
use crate::wait::{wait_until, LoadState, UrlPattern, WaitPolicy};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// Element states that can be waited for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// At least one match exists in the DOM
    Attached,
    /// At least one match is rendered with a non-empty box
    Visible,
    /// No match is visible (including no match at all)
    Hidden,
}

impl ElementState {
    const fn holds(self, probe: ElementCount) -> bool {
        match self {
            Self::Attached => probe.count > 0,
            Self::Visible => probe.visible > 0,
            Self::Hidden => probe.visible == 0,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Attached => "attached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }
}

/// Match counts reported by a locator probe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ElementCount {
    /// Matches in the DOM
    pub count: usize,
    /// Matches currently visible
    pub visible: usize,
}

#[derive(Debug, Deserialize)]
struct ElementReply {
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
}

/// Content to inject after an AJAX submit, mirroring `data-oc-load`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reload {
    /// URL returning an HTML fragment
    pub url: String,
    /// CSS selector of the element whose content is replaced
    pub target: String,
}

/// An OpenCart form submitted over `fetch`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AjaxForm {
    form_selector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extra_data: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reload: Option<Reload>,
}

impl AjaxForm {
    /// Submit the form matched by `form_selector` to its own `action`
    #[must_use]
    pub fn new(form_selector: impl Into<String>) -> Self {
        Self {
            form_selector: form_selector.into(),
            url: None,
            extra_data: Vec::new(),
            reload: None,
        }
    }

    /// Post to `url` instead of the form's action
    #[must_use]
    pub fn post_to(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set a field on top of the form data
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_data.push((key.into(), value.into()));
        self
    }

    /// Reload `target` from `url` after the response is applied
    #[must_use]
    pub fn reload(mut self, url: impl Into<String>, target: impl Into<String>) -> Self {
        self.reload = Some(Reload {
            url: url.into(),
            target: target.into(),
        });
        self
    }

    /// Form selector
    #[must_use]
    pub fn form_selector(&self) -> &str {
        &self.form_selector
    }
}

/// What an AJAX submit did
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AjaxOutcome {
    /// The form existed and a response was received
    pub ok: bool,
    /// Why nothing was sent
    #[serde(default)]
    pub reason: Option<String>,
    /// Endpoint that answered
    #[serde(default)]
    pub url: String,
    /// HTTP status
    #[serde(default)]
    pub status: u16,
    /// Response `Content-Type`
    #[serde(default, alias = "contentType")]
    pub content_type: String,
    /// Parsed JSON body
    #[serde(default)]
    pub json: serde_json::Value,
    /// `redirect` member of the body, if any
    #[serde(default)]
    pub redirect: Option<String>,
}

impl AjaxOutcome {
    /// `success` message of the body
    #[must_use]
    pub fn success(&self) -> Option<&str> {
        self.json.get("success").and_then(serde_json::Value::as_str)
    }

    /// Whether the body carried an `error` member
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.json.get("error").is_some_and(|e| !e.is_null())
    }

    /// The response as captured traffic
    #[must_use]
    pub fn response(&self) -> CapturedResponse {
        CapturedResponse {
            url: self.url.clone(),
            status: self.status,
            content_type: self.content_type.clone(),
            body: self.json.to_string(),
        }
    }
}

/// Posts an OpenCart form the way its `data-oc-toggle="ajax"` handler does,
/// then replays the JSON reply into the DOM: field errors onto
/// `#error-{key}`/`#input-{key}`, warnings and successes into `#alert`.
const AJAX_SUBMIT_JS: &str = r#"async (opts) => {
  const form = document.querySelector(opts.formSelector);
  if (!form) return { ok: false, reason: 'form not found' };
  const fd = new URLSearchParams(new FormData(form));
  for (const [k, v] of (opts.extraData || [])) fd.set(k, v);
  const url = opts.url || form.action;
  const resp = await fetch(url, {
    method: 'POST',
    headers: { 'Content-Type': 'application/x-www-form-urlencoded', 'X-Requested-With': 'XMLHttpRequest' },
    body: fd
  });
  const contentType = resp.headers.get('content-type') || '';
  let json = {};
  try { json = await resp.json(); } catch (e) { json = {}; }
  form.querySelectorAll('.is-invalid').forEach(el => el.classList.remove('is-invalid'));
  form.querySelectorAll('.invalid-feedback').forEach(el => el.classList.remove('d-block'));
  document.querySelectorAll('#alert .alert').forEach(el => el.remove());
  const alertBox = () => {
    let box = document.getElementById('alert');
    if (!box) {
      box = document.createElement('div');
      box.id = 'alert';
      (document.getElementById('content') || document.body).prepend(box);
    }
    return box;
  };
  if (json.error) {
    const danger = msg => { alertBox().innerHTML += '<div class="alert alert-danger alert-dismissible">' + msg + '</div>'; };
    if (typeof json.error === 'string') {
      danger(json.error);
    } else {
      for (const [key, msg] of Object.entries(json.error)) {
        if (key === 'warning') { danger(msg); continue; }
        const dash = key.replaceAll('_', '-');
        const err = document.getElementById('error-' + dash);
        if (err) { err.classList.add('d-block'); err.textContent = msg; }
        const input = document.getElementById('input-' + dash);
        if (input) input.classList.add('is-invalid');
      }
    }
  }
  if (json.success) {
    alertBox().innerHTML = '<div class="alert alert-success alert-dismissible">' + json.success + '</div>';
  }
  if (opts.reload) {
    const html = await (await fetch(opts.reload.url)).text();
    const target = document.querySelector(opts.reload.target);
    if (target) target.innerHTML = html;
  }
  return { ok: true, url: resp.url || url, status: resp.status, contentType: contentType, json: json, redirect: json.redirect || null };
}"#;

/// Capability shared by all page objects
#[derive(Clone)]
pub struct BasePage {
    driver: Arc<dyn PageDriver>,
    policy: WaitPolicy,
    base_url: String,
    screenshot_dir: PathBuf,
    tracer: Option<SharedTracer>,
}

impl std::fmt::Debug for BasePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasePage")
            .field("policy", &self.policy)
            .field("base_url", &self.base_url)
            .field("screenshot_dir", &self.screenshot_dir)
            .field("traced", &self.tracer.is_some())
            .finish()
    }
}

impl BasePage {
    /// Wrap a driver using the run settings
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>, settings: &Settings) -> Self {
        Self {
            driver,
            policy: settings.wait_policy(),
            base_url: settings.base_url.clone(),
            screenshot_dir: settings.screenshot_dir.clone(),
            tracer: None,
        }
    }

    /// Record actions into `tracer`
    #[must_use]
    pub fn with_tracer(mut self, tracer: SharedTracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Override the wait policy
    #[must_use]
    pub const fn with_policy(mut self, policy: WaitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn PageDriver> {
        &self.driver
    }

    /// Active wait policy
    #[must_use]
    pub const fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// Storefront root
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a storefront-relative path; absolute URLs pass through
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn traced<T, Fut>(&self, action: &str, target: &str, fut: Fut) -> CartcheckResult<T>
    where
        Fut: Future<Output = CartcheckResult<T>>,
    {
        let id = self
            .tracer
            .as_ref()
            .map(|t| with_tracer(t, |t| t.begin(action, target)));
        let result = fut.await;
        match (&result, self.tracer.as_ref(), id) {
            (Ok(_), Some(t), Some(id)) => with_tracer(t, |t| t.finish(&id)),
            (Err(e), Some(t), Some(id)) => with_tracer(t, |t| t.fail(&id, &e.to_string())),
            _ => {}
        }
        match result {
            Ok(_) => tracing::debug!(action, target, "page action"),
            Err(ref e) => tracing::warn!(action, target, error = %e, "page action failed"),
        }
        if !self.policy.slow_mo.is_zero() {
            tokio::time::sleep(self.policy.slow_mo).await;
        }
        result
    }

    /// Probe a locator once
    ///
    /// # Errors
    ///
    /// Returns error if the probe script fails
    pub async fn probe(&self, locator: &Locator) -> CartcheckResult<ElementCount> {
        let value = self.driver.evaluate(&locator.probe_script()).await?;
        if value.is_null() {
            return Ok(ElementCount::default());
        }
        serde_json::from_value(value).map_err(|e| CartcheckError::Script {
            message: format!("probe for {locator}: {e}"),
        })
    }

    async fn wait_state(&self, locator: &Locator, state: ElementState) -> CartcheckResult<()> {
        let what = format!("{locator} to be {}", state.label());
        wait_until(&what, self.policy.timeout, self.policy.poll_interval, move || async move {
            let probe = self.probe(locator).await?;
            Ok(state.holds(probe).then_some(()))
        })
        .await
    }

    async fn on_element(
        &self,
        locator: &Locator,
        tag: &str,
        value: &str,
    ) -> CartcheckResult<serde_json::Value> {
        let reply = self
            .driver
            .evaluate(&locator.element_script(tag, value))
            .await?;
        let reply: ElementReply =
            serde_json::from_value(reply).map_err(|e| CartcheckError::Script {
                message: format!("{tag} on {locator}: {e}"),
            })?;
        if reply.ok {
            Ok(reply.value)
        } else {
            Err(CartcheckError::ElementNotFound {
                selector: locator.to_string(),
            })
        }
    }

    /// Navigate and wait for the network to go idle
    ///
    /// # Errors
    ///
    /// Returns error on navigation failure or load timeout
    pub async fn navigate(&self, url: &str) -> CartcheckResult<()> {
        let url = self.url(url);
        self.traced("navigate", &url, async {
            self.driver.navigate(&url).await?;
            self.load_state(LoadState::NetworkIdle).await
        })
        .await
    }

    /// Reload the current page
    ///
    /// # Errors
    ///
    /// Returns error on navigation failure or load timeout
    pub async fn reload(&self) -> CartcheckResult<()> {
        let url = self.driver.current_url().await?;
        self.navigate(&url).await
    }

    /// Click the first match once it is visible
    ///
    /// # Errors
    ///
    /// Returns a timeout if the element never becomes visible
    pub async fn click(&self, locator: &Locator) -> CartcheckResult<()> {
        self.traced("click", &locator.to_string(), async {
            self.wait_state(locator, ElementState::Visible).await?;
            self.on_element(
                locator,
                "click",
                "(el.scrollIntoView({ block: 'center' }), el.click(), true)",
            )
            .await?;
            Ok(())
        })
        .await
    }

    /// Replace the value of the first match once it is visible
    ///
    /// # Errors
    ///
    /// Returns a timeout if the element never becomes visible
    pub async fn fill(&self, locator: &Locator, text: &str) -> CartcheckResult<()> {
        let script = format!(
            "(el.focus(), el.value = {}, el.dispatchEvent(new Event('input', {{ bubbles: true }})), \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})), true)",
            js_str(text)
        );
        self.traced("fill", &locator.to_string(), async {
            self.wait_state(locator, ElementState::Visible).await?;
            self.on_element(locator, "fill", &script).await?;
            Ok(())
        })
        .await
    }

    /// Rendered text of the first match, trimmed
    ///
    /// # Errors
    ///
    /// Returns a timeout if nothing matches
    pub async fn get_text(&self, locator: &Locator) -> CartcheckResult<String> {
        self.traced("get_text", &locator.to_string(), async {
            self.wait_state(locator, ElementState::Attached).await?;
            let value = self
                .on_element(locator, "text", "(el.innerText || el.textContent || '').trim()")
                .await?;
            Ok(value.as_str().unwrap_or_default().to_string())
        })
        .await
    }

    /// Whether any match is visible right now (no waiting)
    ///
    /// # Errors
    ///
    /// Returns error if the probe script fails
    pub async fn is_visible(&self, locator: &Locator) -> CartcheckResult<bool> {
        Ok(self.probe(locator).await?.visible > 0)
    }

    /// Number of matches right now (no waiting)
    ///
    /// # Errors
    ///
    /// Returns error if the probe script fails
    pub async fn count(&self, locator: &Locator) -> CartcheckResult<usize> {
        Ok(self.probe(locator).await?.count)
    }

    /// Trimmed text of every match right now
    ///
    /// # Errors
    ///
    /// Returns error if the script fails
    pub async fn all_texts(&self, locator: &Locator) -> CartcheckResult<Vec<String>> {
        let value = self
            .driver
            .evaluate(&locator.map_script("texts", "(el.innerText || el.textContent || '').trim()"))
            .await?;
        decode_list(value, locator)
    }

    /// Trimmed, non-empty text of every visible match right now
    ///
    /// # Errors
    ///
    /// Returns error if the script fails
    pub async fn visible_texts(&self, locator: &Locator) -> CartcheckResult<Vec<String>> {
        let value = self
            .driver
            .evaluate(&locator.map_script(
                "visible-texts",
                "__vis(el) ? (el.innerText || el.textContent || '').trim() : ''",
            ))
            .await?;
        let mut texts = decode_list(value, locator)?;
        texts.retain(|t| !t.is_empty());
        Ok(texts)
    }

    /// Attribute of the first match
    ///
    /// # Errors
    ///
    /// Returns a timeout if nothing matches
    pub async fn attribute(&self, locator: &Locator, name: &str) -> CartcheckResult<Option<String>> {
        self.wait_state(locator, ElementState::Attached).await?;
        let value = self
            .on_element(
                locator,
                "attribute",
                &format!("el.getAttribute({})", js_str(name)),
            )
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    /// Attribute of every match right now
    ///
    /// # Errors
    ///
    /// Returns error if the script fails
    pub async fn all_attributes(
        &self,
        locator: &Locator,
        name: &str,
    ) -> CartcheckResult<Vec<String>> {
        let value = self
            .driver
            .evaluate(&locator.map_script(
                "attributes",
                &format!("el.getAttribute({}) || ''", js_str(name)),
            ))
            .await?;
        decode_list(value, locator)
    }

    /// Current value of the first matching form control
    ///
    /// # Errors
    ///
    /// Returns a timeout if nothing matches
    pub async fn input_value(&self, locator: &Locator) -> CartcheckResult<String> {
        self.wait_state(locator, ElementState::Attached).await?;
        let value = self
            .on_element(locator, "value", "String(el.value ?? '')")
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Move the real mouse pointer over the centre of the first match
    ///
    /// # Errors
    ///
    /// Returns a timeout if the element never becomes visible
    pub async fn hover(&self, locator: &Locator) -> CartcheckResult<()> {
        self.traced("hover", &locator.to_string(), async {
            self.wait_state(locator, ElementState::Visible).await?;
            let centre = self
                .on_element(
                    locator,
                    "centre",
                    "(() => { el.scrollIntoView({ block: 'center' }); \
                     const r = el.getBoundingClientRect(); \
                     return { x: r.x + r.width / 2, y: r.y + r.height / 2 }; })()",
                )
                .await?;
            let point: Point =
                serde_json::from_value(centre).map_err(|e| CartcheckError::Script {
                    message: format!("centre of {locator}: {e}"),
                })?;
            self.driver.hover_at(point).await
        })
        .await
    }

    /// Tick a checkbox (no-op when already ticked)
    ///
    /// # Errors
    ///
    /// Returns a timeout if the element never becomes visible
    pub async fn check(&self, locator: &Locator) -> CartcheckResult<()> {
        self.traced("check", &locator.to_string(), async {
            self.wait_state(locator, ElementState::Visible).await?;
            self.on_element(
                locator,
                "check",
                "(() => { if (!el.checked) el.click(); return el.checked; })()",
            )
            .await?;
            Ok(())
        })
        .await
    }

    /// Choose the `<option>` whose text is `label`
    ///
    /// # Errors
    ///
    /// Returns `ElementNotFound` if no option carries that label
    pub async fn select_option(&self, locator: &Locator, label: &str) -> CartcheckResult<()> {
        let script = format!(
            "(() => {{ const o = Array.from(el.options || []).find(o => o.text.trim() === {}); \
             if (!o) return false; el.value = o.value; \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); return true; }})()",
            js_str(label)
        );
        self.traced("select_option", &locator.to_string(), async {
            self.wait_state(locator, ElementState::Visible).await?;
            let found = self.on_element(locator, "select", &script).await?;
            if found.as_bool() == Some(false) {
                return Err(CartcheckError::ElementNotFound {
                    selector: format!("{locator} option \"{label}\""),
                });
            }
            Ok(())
        })
        .await
    }

    /// Wait until the locator reaches `state`
    ///
    /// # Errors
    ///
    /// Returns a timeout naming the locator and state
    pub async fn wait_for(&self, locator: &Locator, state: ElementState) -> CartcheckResult<()> {
        self.traced(
            "wait_for",
            &format!("{locator} ({})", state.label()),
            self.wait_state(locator, state),
        )
        .await
    }

    /// Wait until the current URL matches `pattern`, bounded by the
    /// navigation timeout
    ///
    /// # Errors
    ///
    /// Returns a timeout naming the pattern
    pub async fn wait_for_url(&self, pattern: impl Into<UrlPattern>) -> CartcheckResult<String> {
        let pattern = pattern.into();
        self.wait_for_url_within(&pattern, self.policy.navigation_timeout)
            .await
    }

    /// Wait until the current URL matches `pattern` within `timeout`
    ///
    /// # Errors
    ///
    /// Returns a timeout naming the pattern
    pub async fn wait_for_url_within(
        &self,
        pattern: &UrlPattern,
        timeout: std::time::Duration,
    ) -> CartcheckResult<String> {
        let what = format!("URL matching {pattern}");
        self.traced("wait_for_url", &pattern.to_string(), async {
            wait_until(&what, timeout, self.policy.poll_interval, move || async move {
                let url = self.driver.current_url().await?;
                Ok(pattern.matches(&url).then_some(url))
            })
            .await
        })
        .await
    }

    async fn load_state(&self, state: LoadState) -> CartcheckResult<()> {
        let what = format!("load state {state}");
        let script = state.ready_script();
        let script = script.as_str();
        wait_until(
            &what,
            self.policy.navigation_timeout,
            self.policy.poll_interval,
            move || async move {
                let ready = self.driver.evaluate(script).await?;
                Ok((ready.as_bool() == Some(true)).then_some(()))
            },
        )
        .await
    }

    /// Wait for a document load state
    ///
    /// # Errors
    ///
    /// Returns a timeout if the state is not reached
    pub async fn wait_for_load_state(&self, state: LoadState) -> CartcheckResult<()> {
        self.traced("wait_for_load_state", state.event_name(), self.load_state(state))
            .await
    }

    /// Document title
    ///
    /// # Errors
    ///
    /// Returns error if the driver fails
    pub async fn title(&self) -> CartcheckResult<String> {
        self.driver.title().await
    }

    /// Current URL
    ///
    /// # Errors
    ///
    /// Returns error if the driver fails
    pub async fn current_url(&self) -> CartcheckResult<String> {
        self.driver.current_url().await
    }

    /// Evaluate a script and return its raw JSON value
    ///
    /// # Errors
    ///
    /// Returns error if evaluation fails
    pub async fn evaluate_json(&self, script: &str) -> CartcheckResult<serde_json::Value> {
        self.traced("evaluate", "script", self.driver.evaluate(script))
            .await
    }

    /// Write a screenshot to `{screenshot_dir}/{name}.png`
    ///
    /// # Errors
    ///
    /// Returns error if capture or the write fails
    pub async fn take_screenshot(&self, name: &str) -> CartcheckResult<PathBuf> {
        let path = self.screenshot_dir.join(format!("{name}.png"));
        let shot = self.driver.screenshot().await?;
        tokio::fs::create_dir_all(&self.screenshot_dir).await?;
        tokio::fs::write(&path, &shot.data).await?;
        tracing::info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }

    /// Submit an OpenCart AJAX form and replay the reply into the DOM
    ///
    /// # Errors
    ///
    /// Returns error if the script fails or returns another shape
    pub async fn submit_ajax_form(&self, form: &AjaxForm) -> CartcheckResult<AjaxOutcome> {
        let opts = serde_json::to_string(form)?;
        let script = format!("/*ajax-submit*/ ({AJAX_SUBMIT_JS})({opts})");
        self.traced("submit_ajax_form", form.form_selector(), async {
            let value = self.driver.evaluate(&script).await?;
            if value.is_null() {
                return Ok(AjaxOutcome::default());
            }
            let outcome: AjaxOutcome =
                serde_json::from_value(value).map_err(|e| {
                    CartcheckError::Script {
                        message: format!("ajax submit of {}: {e}", form.form_selector()),
                    }
                })?;
            tracing::debug!(
                form = form.form_selector(),
                status = outcome.status,
                redirect = ?outcome.redirect,
                "ajax form submitted"
            );
            Ok(outcome)
        })
        .await
    }

    /// Fetch `url` inside the page session (same cookies) and capture
    /// the response
    ///
    /// # Errors
    ///
    /// Returns error if the fetch script fails
    pub async fn capture_document(&self, url: &str) -> CartcheckResult<CapturedResponse> {
        let url = self.url(url);
        self.traced("capture_document", &url, async {
            let value = self.driver.evaluate(&capture_script(&url)).await?;
            CapturedResponse::from_script_value(value, &url)
        })
        .await
    }
}

fn decode_list(value: serde_json::Value, locator: &Locator) -> CartcheckResult<Vec<String>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|e| CartcheckError::Script {
        message: format!("list for {locator}: {e}"),
    })
}

/// A page of the storefront built on [`BasePage`]
#[async_trait]
pub trait PageObject: Send + Sync {
    /// The composed base page
    fn base(&self) -> &BasePage;

    /// Storefront-relative path of the page
    fn path(&self) -> String;

    /// Short name used in logs
    fn page_name(&self) -> &'static str;

    /// Absolute URL of the page
    fn url(&self) -> String {
        self.base().url(&self.path())
    }

    /// Navigate directly to the page
    async fn open(&self) -> CartcheckResult<()> {
        tracing::debug!(page = self.page_name(), "opening page");
        self.base().navigate(&self.path()).await
    }
}

impl MockDriver {
    /// Answer every probe with one visible match, every element action
    /// with success and every load-state check with `true`.
    ///
    /// Rules added afterwards take precedence.
    pub fn assume_elements_present(&self) {
        self.on_script(&["/*probe*/"], serde_json::json!({ "count": 1, "visible": 1 }));
        self.on_script(&["return { ok: true"], serde_json::json!({ "ok": true, "value": null }));
        self.on_script(&["/*loadstate*/"], serde_json::json!(true));
    }
}
