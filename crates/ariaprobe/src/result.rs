//! Result and error types for Ariaprobe.

use thiserror::Error;

/// Result type for Ariaprobe operations
pub type AriaResult<T> = Result<T, AriaError>;

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum AriaError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Crate built without the `browser` feature
    #[error("Browser feature not enabled. Rebuild with --features browser")]
    BrowserUnavailable,

    /// Page error
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

    /// No element matched the selector
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// Selector form the driver cannot evaluate
    #[error("Unsupported selector: {selector}")]
    UnsupportedSelector {
        /// Offending selector
        selector: String,
    },

    /// Input dispatch error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Invalid check plan
    #[error("Invalid plan: {message}")]
    Plan {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl AriaError {
    /// Create an element-not-found error
    #[must_use]
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
        }
    }

    /// Create a plan error
    #[must_use]
    pub fn plan(message: impl Into<String>) -> Self {
        Self::Plan {
            message: message.into(),
        }
    }

    /// Create a screenshot error
    #[must_use]
    pub fn screenshot(message: impl Into<String>) -> Self {
        Self::Screenshot {
            message: message.into(),
        }
    }

    /// Whether the error aborts a run rather than failing a single check.
    ///
    /// Element lookups, page reads, input dispatch and step timeouts only
    /// fail the check that hit them.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::ElementNotFound { .. } | Self::Page { .. } | Self::Input { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AriaError::not_found("#searchInput");
        assert_eq!(err.to_string(), "No element matches #searchInput");
    }

    #[test]
    fn test_navigation_message() {
        let err = AriaError::Navigation {
            url: "file:///app/index.html".to_string(),
            message: "net::ERR_FILE_NOT_FOUND".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("file:///app/index.html"));
        assert!(msg.contains("ERR_FILE_NOT_FOUND"));
    }

    #[test]
    fn test_timeout_message() {
        let err = AriaError::Timeout { ms: 5000 };
        assert_eq!(err.to_string(), "Operation timed out after 5000ms");
    }

    #[test]
    fn test_per_check_errors_are_recoverable() {
        assert!(!AriaError::not_found(".category-btn").is_fatal());
        assert!(!AriaError::Timeout { ms: 1 }.is_fatal());
        assert!(!AriaError::Page {
            message: "node detached".to_string()
        }
        .is_fatal());
        assert!(!AriaError::Input {
            message: "not clickable".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_run_level_errors_are_fatal() {
        assert!(AriaError::BrowserUnavailable.is_fatal());
        assert!(AriaError::plan("empty selector").is_fatal());
        assert!(AriaError::screenshot("empty").is_fatal());
        assert!(AriaError::UnsupportedSelector {
            selector: "a > b".to_string()
        }
        .is_fatal());
        assert!(AriaError::Navigation {
            url: "file:///x".to_string(),
            message: "gone".to_string()
        }
        .is_fatal());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AriaError = io.into();
        assert!(err.to_string().starts_with("I/O error"));
    }
}
