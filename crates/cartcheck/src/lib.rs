//! Cartcheck: page-object harness for browser E2E suites
//!
//! Cartcheck drives a real Chromium page over CDP and gives test suites
//! the pieces a Page Object Model needs:
//!
//! - a [`BasePage`] wrapper whose actions auto-wait for their target,
//! - composable [`Locator`]s (CSS, text, placeholder, role),
//! - retrying [`expect`] assertions and server [`ResponseExpectation`]s,
//! - lazily loaded, restartable scenario data ([`CsvSource`]),
//! - a per-test [`Session`] that saves a screenshot and action trace when
//!   the test fails, and filters tests by [`Marker`] expression.
//!
//! ```text
//! ┌────────────┐    ┌─────────────┐    ┌────────────┐    ┌──────────┐
//! │ Test suite │───►│ Page object │───►│  BasePage  │───►│ Chromium │
//! │ (+ CSV)    │    │ (selectors) │    │ (auto-wait)│    │  (CDP)   │
//! └────────────┘    └─────────────┘    └────────────┘    └──────────┘
//! ```
//!
//! Browser control is behind the `browser` feature; without it the crate
//! builds against [`MockDriver`] only.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[allow(clippy::missing_errors_doc)]
mod assertion;
#[cfg(feature = "browser")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
mod browser;
mod config;
mod driver;
mod fixture;
mod locator;
/// Subscriber setup
pub mod logging;
mod marker;
mod network;
#[allow(clippy::missing_errors_doc)]
mod page;
mod result;
mod scenario;
#[allow(clippy::cast_possible_truncation)]
mod trace;
mod wait;

pub use assertion::{expect, Assertion, Expect};
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{AdminCredentials, Settings, TraceMode, DEFAULT_ADMIN_URL, DEFAULT_BASE_URL, MARKERS_ENV};
pub use driver::{DriverConfig, MockDriver, PageDriver, Point, Screenshot};
pub use fixture::{sanitize_test_id, ArtifactCapture, FailureContext, FailureHook, Session, TestInfo};
pub use locator::{js_str, Locator, Pick, Selector};
pub use marker::{Marker, MarkerExpr, MarkerFilter};
pub use network::{capture_script, CapturedResponse, ResponseExpectation};
pub use page::{AjaxForm, AjaxOutcome, BasePage, ElementCount, ElementState, PageObject, Reload};
pub use result::{CartcheckError, CartcheckResult};
pub use scenario::{
    CsvSource, InMemorySource, Outcome, Scenario, ScenarioCache, ScenarioSource, Scenarios,
};
pub use trace::{
    ActionStatus, ActionTracer, SharedTracer, TraceArchive, TraceMetadata, TracedAction,
    TracedEvent,
};
pub use wait::{
    wait_until, LoadState, UrlPattern, WaitPolicy, DEFAULT_ACTION_TIMEOUT_MS,
    DEFAULT_NAVIGATION_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, NETWORK_IDLE_THRESHOLD_MS,
};

/// Everything a page object or suite usually needs
pub mod prelude {
    pub use super::assertion::*;
    #[cfg(feature = "browser")]
    pub use super::browser::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::fixture::*;
    pub use super::locator::*;
    pub use super::marker::*;
    pub use super::network::*;
    pub use super::page::*;
    pub use super::result::*;
    pub use super::scenario::*;
    pub use super::wait::*;
    pub use async_trait::async_trait;
}
