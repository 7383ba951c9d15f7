//! Action tracing.
//!
//! Every wrapper action on a [`BasePage`](crate::page::BasePage) is recorded
//! as a [`TracedAction`]. When a test fails, the session serialises the
//! recording into a [`TraceArchive`] next to the failure screenshot.

use crate::result::CartcheckResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use uuid::Uuid;

/// Tracer shared between a session and the page objects it hands out
pub type SharedTracer = Arc<Mutex<ActionTracer>>;

/// Status of a traced action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    /// Action in flight
    Running,
    /// Action completed
    Ok,
    /// Action failed
    Error,
    /// Trace stopped before the action finished
    Cancelled,
}

/// One wrapper action (navigate, click, fill, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracedAction {
    /// Unique action ID
    pub id: String,
    /// Action name
    pub name: String,
    /// Locator description or URL
    pub target: String,
    /// Start (ms since trace start)
    pub start_ms: u64,
    /// End (ms since trace start)
    pub end_ms: Option<u64>,
    /// Duration
    pub duration_ms: Option<u64>,
    /// Status
    pub status: ActionStatus,
    /// Error text for failed actions
    pub error: Option<String>,
}

impl TracedAction {
    fn new(name: &str, target: &str, start_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            target: target.to_string(),
            start_ms,
            end_ms: None,
            duration_ms: None,
            status: ActionStatus::Running,
            error: None,
        }
    }

    fn end(&mut self, end_ms: u64, status: ActionStatus) {
        self.end_ms = Some(end_ms);
        self.duration_ms = Some(end_ms.saturating_sub(self.start_ms));
        self.status = status;
    }

    /// Whether the action has finished
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.end_ms.is_some()
    }
}

/// A point-in-time note (page URL changes, failure summaries)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracedEvent {
    /// Timestamp (ms since trace start)
    pub timestamp_ms: u64,
    /// Event name
    pub name: String,
    /// Event message
    pub message: String,
}

/// Metadata for a trace archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Trace ID
    pub trace_id: String,
    /// Test identifier
    pub test_id: String,
    /// Start time
    pub start_time: DateTime<Utc>,
    /// End time
    pub end_time: Option<DateTime<Utc>>,
    /// Total duration in ms
    pub duration_ms: Option<u64>,
    /// Number of actions
    pub action_count: usize,
    /// Number of failed actions
    pub error_count: usize,
    /// Harness version
    pub cartcheck_version: String,
}

impl TraceMetadata {
    /// Create new metadata
    #[must_use]
    pub fn new(test_id: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            test_id: test_id.to_string(),
            start_time: Utc::now(),
            end_time: None,
            duration_ms: None,
            action_count: 0,
            error_count: 0,
            cartcheck_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Complete trace archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceArchive {
    /// Trace metadata
    pub metadata: TraceMetadata,
    /// Recorded actions, in start order
    pub actions: Vec<TracedAction>,
    /// Recorded notes
    pub events: Vec<TracedEvent>,
}

impl TraceArchive {
    /// Save archive to a JSON file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns error if serialisation or the write fails
    pub async fn save_json(&self, path: &Path) -> CartcheckResult<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Load archive from JSON file
    ///
    /// # Errors
    ///
    /// Returns error if the file is unreadable or not an archive
    pub async fn load_json(path: &Path) -> CartcheckResult<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Get actions by name
    #[must_use]
    pub fn actions_by_name(&self, name: &str) -> Vec<&TracedAction> {
        self.actions.iter().filter(|a| a.name == name).collect()
    }

    /// Get failed actions
    #[must_use]
    pub fn failed_actions(&self) -> Vec<&TracedAction> {
        self.actions
            .iter()
            .filter(|a| a.status == ActionStatus::Error)
            .collect()
    }
}

/// Recorder for one test's actions
#[derive(Debug)]
pub struct ActionTracer {
    start_time: Instant,
    metadata: TraceMetadata,
    actions: Vec<TracedAction>,
    events: Vec<TracedEvent>,
}

impl ActionTracer {
    /// Create a tracer; the clock starts immediately
    #[must_use]
    pub fn new(test_id: &str) -> Self {
        Self {
            start_time: Instant::now(),
            metadata: TraceMetadata::new(test_id),
            actions: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Create a tracer behind a shared handle
    #[must_use]
    pub fn shared(test_id: &str) -> SharedTracer {
        Arc::new(Mutex::new(Self::new(test_id)))
    }

    /// Get elapsed time in milliseconds
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Record the start of an action, returning its ID
    pub fn begin(&mut self, name: &str, target: &str) -> String {
        let action = TracedAction::new(name, target, self.elapsed_ms());
        let id = action.id.clone();
        self.actions.push(action);
        id
    }

    /// Mark an action as completed
    pub fn finish(&mut self, id: &str) {
        let end_ms = self.elapsed_ms();
        if let Some(action) = self.actions.iter_mut().find(|a| a.id == id) {
            action.end(end_ms, ActionStatus::Ok);
        }
    }

    /// Mark an action as failed
    pub fn fail(&mut self, id: &str, message: &str) {
        let end_ms = self.elapsed_ms();
        if let Some(action) = self.actions.iter_mut().find(|a| a.id == id) {
            action.end(end_ms, ActionStatus::Error);
            action.error = Some(message.to_string());
        }
    }

    /// Record a note
    pub fn note(&mut self, name: &str, message: &str) {
        self.events.push(TracedEvent {
            timestamp_ms: self.elapsed_ms(),
            name: name.to_string(),
            message: message.to_string(),
        });
    }

    /// Number of actions recorded so far
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Snapshot the recording; unfinished actions are marked cancelled
    #[must_use]
    pub fn archive(&self) -> TraceArchive {
        let end_ms = self.elapsed_ms();
        let mut actions = self.actions.clone();
        for action in &mut actions {
            if !action.is_complete() {
                action.end(end_ms, ActionStatus::Cancelled);
            }
        }

        let mut metadata = self.metadata.clone();
        metadata.end_time = Some(Utc::now());
        metadata.duration_ms = Some(end_ms);
        metadata.action_count = actions.len();
        metadata.error_count = actions
            .iter()
            .filter(|a| a.status == ActionStatus::Error)
            .count();

        TraceArchive {
            metadata,
            actions,
            events: self.events.clone(),
        }
    }
}

/// Run `f` against a shared tracer, tolerating poisoning
pub(crate) fn with_tracer<R>(tracer: &SharedTracer, f: impl FnOnce(&mut ActionTracer) -> R) -> R {
    let mut guard = tracer.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}
