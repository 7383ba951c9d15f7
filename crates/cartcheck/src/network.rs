//! Server response cross-checks.
//!
//! A response is captured by re-fetching a URL inside the page (so the
//! request carries the session's cookies) or taken from an AJAX submit.
//! [`ResponseExpectation`] then checks it the way a test reads it: status,
//! content type, and what the body does or does not contain.

use crate::locator::js_str;
use crate::result::{CartcheckError, CartcheckResult};
use serde::{Deserialize, Serialize};

/// An HTTP response observed from the page session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedResponse {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status
    pub status: u16,
    /// `Content-Type` header
    #[serde(alias = "contentType")]
    pub content_type: String,
    /// Body text
    pub body: String,
}

impl CapturedResponse {
    /// Decode the value returned by [`capture_script`]
    ///
    /// # Errors
    ///
    /// Returns error if the value has another shape
    pub fn from_script_value(value: serde_json::Value, url: &str) -> CartcheckResult<Self> {
        if value.is_null() {
            return Err(CartcheckError::Script {
                message: format!("no response captured for {url}"),
            });
        }
        serde_json::from_value(value).map_err(|e| CartcheckError::Script {
            message: format!("response for {url}: {e}"),
        })
    }

    /// Status is 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body is HTML
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html")
    }

    /// Parse the body as JSON
    ///
    /// # Errors
    ///
    /// Returns error if the body is not JSON
    pub fn json(&self) -> CartcheckResult<serde_json::Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Non-overlapping occurrences of `needle` in the body
    #[must_use]
    pub fn occurrences(&self, needle: &str) -> usize {
        if needle.is_empty() {
            return 0;
        }
        self.body.matches(needle).count()
    }
}

/// Script fetching `url` with the page's cookies and returning the response
#[must_use]
pub fn capture_script(url: &str) -> String {
    format!(
        "/*capture*/ (async () => {{ const r = await fetch({}, {{ credentials: 'same-origin' }}); \
         return {{ url: r.url, status: r.status, contentType: r.headers.get('content-type') || '', body: await r.text() }}; }})()",
        js_str(url)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Check {
    Status(u16),
    Success,
    ContentType(String),
    BodyContains(String),
    BodyLacks(String),
    Occurrences(String, usize),
    JsonContains(String, String),
}

/// Assertions over one captured response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseExpectation {
    checks: Vec<Check>,
}

impl ResponseExpectation {
    /// Create an empty expectation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Status equals `status`
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.checks.push(Check::Status(status));
        self
    }

    /// Status is 2xx
    #[must_use]
    pub fn success(mut self) -> Self {
        self.checks.push(Check::Success);
        self
    }

    /// `Content-Type` contains `fragment`
    #[must_use]
    pub fn content_type(mut self, fragment: impl Into<String>) -> Self {
        self.checks.push(Check::ContentType(fragment.into()));
        self
    }

    /// Body contains `text` (case-insensitive)
    #[must_use]
    pub fn body_contains(mut self, text: impl Into<String>) -> Self {
        self.checks.push(Check::BodyContains(text.into()));
        self
    }

    /// Body does not contain `text` (case-insensitive)
    #[must_use]
    pub fn body_lacks(mut self, text: impl Into<String>) -> Self {
        self.checks.push(Check::BodyLacks(text.into()));
        self
    }

    /// Body contains `needle` exactly `count` times
    #[must_use]
    pub fn occurrences(mut self, needle: impl Into<String>, count: usize) -> Self {
        self.checks.push(Check::Occurrences(needle.into(), count));
        self
    }

    /// JSON body has string member `key` containing `text` (case-insensitive)
    #[must_use]
    pub fn json_contains(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.checks.push(Check::JsonContains(key.into(), text.into()));
        self
    }

    /// Run every check, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns `AssertionFailed` describing the first failed check
    pub fn verify(&self, response: &CapturedResponse) -> CartcheckResult<()> {
        let body = response.body.to_lowercase();
        for check in &self.checks {
            match check {
                Check::Status(expected) if response.status != *expected => {
                    return Err(CartcheckError::assertion(
                        format!("status of {}", response.url),
                        expected,
                        response.status,
                    ));
                }
                Check::Success if !response.is_success() => {
                    return Err(CartcheckError::assertion(
                        format!("status of {}", response.url),
                        "2xx",
                        response.status,
                    ));
                }
                Check::ContentType(fragment) if !response.content_type.contains(fragment.as_str()) => {
                    return Err(CartcheckError::assertion(
                        format!("content type of {}", response.url),
                        fragment,
                        &response.content_type,
                    ));
                }
                Check::BodyContains(text) if !body.contains(&text.to_lowercase()) => {
                    return Err(CartcheckError::assertion(
                        format!("body of {} contains {text:?}", response.url),
                        text,
                        excerpt(&response.body),
                    ));
                }
                Check::BodyLacks(text) if body.contains(&text.to_lowercase()) => {
                    return Err(CartcheckError::assertion(
                        format!("body of {} lacks {text:?}", response.url),
                        format!("no {text:?}"),
                        excerpt(&response.body),
                    ));
                }
                Check::Occurrences(needle, count) => {
                    let actual = response.occurrences(needle);
                    if actual != *count {
                        return Err(CartcheckError::assertion(
                            format!("occurrences of {needle:?} in {}", response.url),
                            count,
                            actual,
                        ));
                    }
                }
                Check::JsonContains(key, text) => {
                    let json = response.json()?;
                    let member = json
                        .get(key.as_str())
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or_default();
                    if !member.to_lowercase().contains(&text.to_lowercase()) {
                        return Err(CartcheckError::assertion(
                            format!("JSON member {key:?} of {}", response.url),
                            text,
                            member,
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn excerpt(body: &str) -> String {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((at, _)) => format!("{}...", &body[..at]),
        None => body.to_string(),
    }
}
