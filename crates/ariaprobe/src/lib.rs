//! Ariaprobe: headless-browser checks for ARIA labels and toggle state.
//!
//! Loads one document in Chromium, asserts the accessible labels of a fixed
//! set of controls, clicks the first toggle of a group and requires its
//! pressed state to change, then saves a full-page screenshot.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   ┌────────────┐    ┌────────────────┐    ┌──────────────┐      │
//! │   │ CheckPlan  │    │ Accessibility  │    │ PageDriver   │      │
//! │   │ (YAML)     │───►│ Checker        │───►│ CDP/fixture  │      │
//! │   └────────────┘    └───────┬────────┘    └──────────────┘      │
//! │                             ▼                                    │
//! │                     CheckReport + screenshot                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```no_run
//! use ariaprobe::{AccessibilityChecker, BrowserConfig, CheckPlan};
//!
//! # async fn demo() -> ariaprobe::AriaResult<()> {
//! let checker = AccessibilityChecker::new(CheckPlan::default());
//! let report = checker.run(BrowserConfig::default()).await?;
//! for failure in report.failures() {
//!     println!("FAIL: {}", failure.detail());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod browser;
mod checker;
mod fixture;
mod page;
mod plan;
mod report;
mod result;
mod screenshot;
mod selector;
mod wait;

pub use browser::{Browser, BrowserConfig, Page};
pub use checker::AccessibilityChecker;
pub use fixture::{FixtureElement, FixturePage};
pub use page::PageDriver;
pub use plan::{
    file_url, AttributeCheck, CheckPlan, Timeouts, ToggleCheck, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_SCREENSHOT_PATH, DEFAULT_SETTLE_MS, DEFAULT_STEP_TIMEOUT_MS, DEFAULT_TARGET_URL,
};
pub use report::{CheckFailure, CheckOutcome, CheckReport, Observation, Phase};
pub use result::{AriaError, AriaResult};
pub use screenshot::ScreenshotArtifact;
pub use selector::{Selector, SimpleSelector};
pub use wait::{wait_until, Settled, WaitOptions};
