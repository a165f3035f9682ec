//! Check plans: which document to load and what to assert on it.
//!
//! The default plan reproduces the fixed project-page check. A plan file
//! (YAML) can point the same procedure at another document; fields it
//! omits fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::result::{AriaError, AriaResult};
use crate::selector::Selector;

/// Default document under test
pub const DEFAULT_TARGET_URL: &str = "file:///app/index.html";

/// Default screenshot output path
pub const DEFAULT_SCREENSHOT_PATH: &str = "verification/a11y-check.png";

/// Default timeout for a single page operation (5 seconds)
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 5000;

/// Default window for the UI to react to a click
pub const DEFAULT_SETTLE_MS: u64 = 1000;

/// Default polling interval while settling (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Exact-match assertion on one attribute of one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCheck {
    /// Human name of the element, used in report lines
    pub subject: String,
    /// Selector of the element (first match is read)
    pub selector: Selector,
    /// Attribute to read
    pub attribute: String,
    /// Literal the attribute must equal
    pub expected: String,
}

impl AttributeCheck {
    /// Create an `aria-label` check
    #[must_use]
    pub fn label(subject: impl Into<String>, selector: Selector, expected: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            selector,
            attribute: "aria-label".to_string(),
            expected: expected.into(),
        }
    }

    /// Whether an observed value satisfies the check
    #[must_use]
    pub fn matches(&self, actual: Option<&str>) -> bool {
        actual == Some(self.expected.as_str())
    }
}

/// Toggle assertion: clicking the first match must change the attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleCheck {
    /// Human name of the element group, used in report lines
    pub subject: String,
    /// Selector of the toggle group
    pub selector: Selector,
    /// State attribute that must flip
    pub attribute: String,
}

impl Default for ToggleCheck {
    fn default() -> Self {
        Self {
            subject: "category buttons".to_string(),
            selector: Selector::class("category-btn"),
            attribute: "aria-pressed".to_string(),
        }
    }
}

/// Time limits for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Limit for any single page operation
    pub step_ms: u64,
    /// Window for the UI to react to the click
    pub settle_ms: u64,
    /// Polling interval while settling
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            step_ms: DEFAULT_STEP_TIMEOUT_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Timeouts {
    /// Step timeout as Duration
    #[must_use]
    pub const fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }
}

/// Everything one run needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckPlan {
    /// URL of the document under test
    pub target: String,
    /// Label checks, run in order
    pub labels: Vec<AttributeCheck>,
    /// Toggle check, run after the labels
    pub toggle: ToggleCheck,
    /// Where the final screenshot is written
    pub screenshot: PathBuf,
    /// Time limits
    pub timeouts: Timeouts,
    /// Reload after the screenshot and require the toggle state to reset
    pub verify_reload_reset: bool,
}

impl Default for CheckPlan {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_URL.to_string(),
            labels: vec![
                AttributeCheck::label("Search input", Selector::id("searchInput"), "Search projects"),
                AttributeCheck::label("Shake button", Selector::id("shakeButton"), "Explode cards"),
                AttributeCheck::label("Clear button", Selector::id("clearSearch"), "Clear search"),
            ],
            toggle: ToggleCheck::default(),
            screenshot: PathBuf::from(DEFAULT_SCREENSHOT_PATH),
            timeouts: Timeouts::default(),
            verify_reload_reset: false,
        }
    }
}

impl CheckPlan {
    /// Create the default plan
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target URL
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Target a local file, converted to a `file://` URL
    pub fn with_document(self, path: &Path) -> AriaResult<Self> {
        let absolute = std::fs::canonicalize(path).map_err(|e| {
            AriaError::plan(format!("document {}: {e}", path.display()))
        })?;
        Ok(self.with_target(file_url(&absolute)))
    }

    /// Set the screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = path.into();
        self
    }

    /// Set the step timeout
    #[must_use]
    pub const fn with_step_timeout(mut self, ms: u64) -> Self {
        self.timeouts.step_ms = ms;
        self
    }

    /// Set the settle window
    #[must_use]
    pub const fn with_settle(mut self, ms: u64) -> Self {
        self.timeouts.settle_ms = ms;
        self
    }

    /// Enable or disable the reload-reset check
    #[must_use]
    pub const fn with_reload_reset(mut self, enabled: bool) -> Self {
        self.verify_reload_reset = enabled;
        self
    }

    /// Parse and validate a plan from YAML
    pub fn from_yaml(yaml: &str) -> AriaResult<Self> {
        let plan: Self = serde_yaml_ng::from_str(yaml)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Load and validate a plan file
    pub fn load(path: &Path) -> AriaResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> AriaResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject plans that cannot produce a meaningful run
    pub fn validate(&self) -> AriaResult<()> {
        if self.target.trim().is_empty() {
            return Err(AriaError::plan("target is empty"));
        }
        for check in &self.labels {
            if check.selector.is_empty() {
                return Err(AriaError::plan(format!("{}: selector is empty", check.subject)));
            }
            if check.attribute.trim().is_empty() {
                return Err(AriaError::plan(format!("{}: attribute is empty", check.subject)));
            }
        }
        if self.toggle.selector.is_empty() || self.toggle.attribute.trim().is_empty() {
            return Err(AriaError::plan("toggle needs a selector and an attribute"));
        }
        if self.screenshot.as_os_str().is_empty() {
            return Err(AriaError::plan("screenshot path is empty"));
        }
        if self.timeouts.step_ms == 0 {
            return Err(AriaError::plan("step timeout must be non-zero"));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(AriaError::plan("poll interval must be non-zero"));
        }
        Ok(())
    }
}

/// Render an absolute path as a `file://` URL
#[must_use]
pub fn file_url(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}
