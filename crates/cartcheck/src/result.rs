//! Result and error types for Cartcheck.

use thiserror::Error;

/// Result type for Cartcheck operations
pub type CartcheckResult<T> = Result<T, CartcheckError>;

/// Errors that can occur while driving a storefront test
#[derive(Debug, Error)]
pub enum CartcheckError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error (creating or talking to a page)
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Auto-wait expired before the condition held
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element vanished between the wait and the action
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Locator description
        selector: String,
    },

    /// In-page script failed or returned an unexpected shape
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}\n  expected: {expected}\n    actual: {actual}")]
    AssertionFailed {
        /// What was asserted
        message: String,
        /// Expected value, rendered
        expected: String,
        /// Observed value, rendered
        actual: String,
    },

    /// Scenario data file is malformed
    #[error("Malformed data file {path}: {message}")]
    DataFile {
        /// File path
        path: String,
        /// Error message
        message: String,
    },

    /// Environment configuration is invalid
    #[error("Invalid configuration for {key}: {message}")]
    Config {
        /// Environment variable name
        key: String,
        /// Error message
        message: String,
    },

    /// Marker expression could not be parsed
    #[error("Invalid marker expression '{expression}': {message}")]
    InvalidMarker {
        /// The expression
        expression: String,
        /// Error message
        message: String,
    },

    /// Fixture error (session setup/teardown failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CartcheckError {
    /// Build an assertion failure from rendered expected/actual values
    pub fn assertion(
        message: impl Into<String>,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        Self::AssertionFailed {
            message: message.into(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }

    /// Whether this error is an element timeout or lookup failure
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ElementNotFound { .. })
    }

    /// Whether this error can clear up on its own, e.g. an evaluation that
    /// raced a navigation and lost its execution context
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Script { .. } | Self::Page { .. })
    }

    /// Whether this error came from an expectation mismatch
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display() {
        let err = CartcheckError::Timeout {
            what: "#button-cart to be visible".to_string(),
            ms: 10_000,
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 10000ms waiting for #button-cart to be visible"
        );
        assert!(err.is_timeout());
        assert!(!err.is_assertion());
    }

    #[test]
    fn test_assertion_carries_diff_context() {
        let err = CartcheckError::assertion("cart total", "$602.00", "$0.00");
        let text = err.to_string();
        assert!(text.contains("expected: \"$602.00\""));
        assert!(text.contains("actual: \"$0.00\""));
        assert!(err.is_assertion());
    }

    #[test]
    fn test_data_file_display() {
        let err = CartcheckError::DataFile {
            path: "testdata/login_data.csv".to_string(),
            message: "record 3 has 4 fields, header has 5".to_string(),
        };
        assert!(err.to_string().contains("login_data.csv"));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_transient_classification() {
        let lost = CartcheckError::Script {
            message: "Execution context was destroyed".to_string(),
        };
        assert!(lost.is_transient());
        assert!(!CartcheckError::assertion("x", 1, 2).is_transient());
        assert!(!CartcheckError::ElementNotFound {
            selector: "#x".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CartcheckError = io.into();
        assert!(matches!(err, CartcheckError::Io(_)));
    }
}
