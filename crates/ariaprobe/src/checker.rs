//! The accessibility check procedure.
//!
//! [`AccessibilityChecker::run_check`] walks one loaded page through the
//! plan in strict order: navigate, label checks, toggle check, screenshot,
//! and optionally a reload-reset check. Missing elements, mismatches,
//! unchanged toggles and per-element driver faults (page errors, input
//! errors, step timeouts) become failed outcomes and the run continues.
//! Only navigation, browser, screenshot and plan errors abort the run.

use std::future::Future;

use tracing::{debug, info, warn};

use crate::browser::{Browser, BrowserConfig};
use crate::page::PageDriver;
use crate::plan::{AttributeCheck, CheckPlan};
use crate::report::{CheckFailure, CheckOutcome, CheckReport, Observation, Phase};
use crate::result::{AriaError, AriaResult};
use crate::screenshot;
use crate::wait::{wait_until, WaitOptions};

/// Runs a [`CheckPlan`] against a page
#[derive(Debug, Clone, Default)]
pub struct AccessibilityChecker {
    plan: CheckPlan,
}

/// Record a per-check error on the outcome; fatal errors propagate.
fn fail_with(outcome: CheckOutcome, err: AriaError) -> AriaResult<CheckOutcome> {
    match err {
        AriaError::ElementNotFound { selector } => {
            info!(subject = %outcome.subject, %selector, "element not found");
            Ok(outcome.fail(CheckFailure::ElementNotFound { selector }))
        }
        e if e.is_fatal() => Err(e),
        e => {
            info!(check = %outcome.name, error = %e, "check errored");
            Ok(outcome.fail(CheckFailure::Fault {
                message: e.to_string(),
            }))
        }
    }
}

impl AccessibilityChecker {
    /// Create a checker for a plan
    #[must_use]
    pub const fn new(plan: CheckPlan) -> Self {
        Self { plan }
    }

    /// The plan being run
    #[must_use]
    pub const fn plan(&self) -> &CheckPlan {
        &self.plan
    }

    /// Launch a fresh browser, run the plan on a new page, and close the
    /// browser whatever the outcome.
    pub async fn run(&self, config: BrowserConfig) -> AriaResult<CheckReport> {
        self.plan.validate()?;
        let browser = Browser::launch(config).await?;

        let result = async {
            let mut page = self.within(browser.new_page()).await?;
            self.run_check(&mut page).await
        }
        .await;

        if let Err(e) = browser.close().await {
            warn!(error = %e, "failed to close browser");
        }
        result
    }

    /// Run the plan on an already open page.
    pub async fn run_check<D>(&self, page: &mut D) -> AriaResult<CheckReport>
    where
        D: PageDriver + ?Sized,
    {
        let plan = &self.plan;
        info!(url = %plan.target, "navigating");
        self.within(page.goto(&plan.target)).await?;

        let mut outcomes = Vec::with_capacity(plan.labels.len() + 2);
        for check in &plan.labels {
            outcomes.push(self.check_label(&*page, check).await?);
        }

        let (toggle, initial) = self.check_toggle(page).await?;
        outcomes.push(toggle);

        let bytes = self.within(page.screenshot()).await?;
        let artifact = screenshot::save(&bytes, &plan.screenshot).await?;

        if plan.verify_reload_reset {
            match initial {
                Some(initial) => outcomes.push(self.check_reload_reset(page, initial).await?),
                // The toggle check already reported why there is no state
                None => info!("initial toggle state unknown, skipping reload check"),
            }
        }

        let report = CheckReport {
            target: page.current_url().to_string(),
            outcomes,
            screenshot: artifact,
        };
        info!(
            checks = report.outcomes.len(),
            failures = report.failures().count(),
            "run complete"
        );
        Ok(report)
    }

    /// Bound a page operation by the step timeout
    async fn within<T>(&self, fut: impl Future<Output = AriaResult<T>>) -> AriaResult<T> {
        let limit = self.plan.timeouts.step();
        tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| AriaError::Timeout {
                ms: self.plan.timeouts.step_ms,
            })?
    }

    async fn check_label<D>(&self, page: &D, check: &AttributeCheck) -> AriaResult<CheckOutcome>
    where
        D: PageDriver + ?Sized,
    {
        let mut outcome = CheckOutcome::new(&*check.subject, &check.subject, &check.attribute);

        let value = match self.within(page.attribute(&check.selector, &check.attribute)).await {
            Ok(value) => value,
            Err(e) => return fail_with(outcome, e),
        };

        debug!(subject = %check.subject, attribute = %check.attribute, ?value, "read attribute");
        outcome.observe(Observation::Attribute {
            subject: check.subject.clone(),
            attribute: check.attribute.clone(),
            value: value.clone(),
        });

        if check.matches(value.as_deref()) {
            Ok(outcome)
        } else {
            info!(subject = %check.subject, expected = %check.expected, ?value, "label mismatch");
            Ok(outcome.fail(CheckFailure::Mismatch {
                expected: check.expected.clone(),
                actual: value,
            }))
        }
    }

    /// Returns the outcome and, when it was read, the initial state.
    async fn check_toggle<D>(&self, page: &mut D) -> AriaResult<(CheckOutcome, Option<Option<String>>)>
    where
        D: PageDriver + ?Sized,
    {
        let toggle = &self.plan.toggle;
        let selector = &toggle.selector;
        let attribute = toggle.attribute.as_str();
        let mut outcome = CheckOutcome::new(
            format!("{} toggle", toggle.subject),
            &toggle.subject,
            attribute,
        );

        let count = match self.within(page.count(selector)).await {
            Ok(count) => count,
            Err(e) => return fail_with(outcome, e).map(|o| (o, None)),
        };
        debug!(%selector, count, "counted toggle group");
        outcome.observe(Observation::Count {
            subject: toggle.subject.clone(),
            count,
        });
        if count == 0 {
            info!(%selector, "toggle group matched nothing");
            let failure = CheckFailure::NoMatches {
                selector: selector.to_string(),
            };
            return Ok((outcome.fail(failure), None));
        }

        let initial = match self.within(page.attribute(selector, attribute)).await {
            Ok(value) => value,
            Err(e) => return fail_with(outcome, e).map(|o| (o, None)),
        };
        outcome.observe(Observation::State {
            phase: Phase::Initial,
            attribute: attribute.to_string(),
            value: initial.clone(),
        });

        // From here on the initial state is known and is kept for the reload check
        if let Err(e) = self.within(page.click(selector)).await {
            return fail_with(outcome, e).map(|o| (o, Some(initial)));
        }

        let reader: &D = page;
        let settled = wait_until(
            WaitOptions::from(self.plan.timeouts),
            || self.within(reader.attribute(selector, attribute)),
            |value| *value != initial,
        )
        .await;
        let settled = match settled {
            Ok(settled) => settled,
            Err(e) => return fail_with(outcome, e).map(|o| (o, Some(initial))),
        };
        debug!(elapsed_ms = settled.elapsed.as_millis() as u64, met = settled.met, "click settled");

        outcome.observe(Observation::State {
            phase: Phase::AfterClick,
            attribute: attribute.to_string(),
            value: settled.value.clone(),
        });

        if settled.value == initial {
            info!(%selector, ?initial, "toggle state unchanged after click");
            let failure = CheckFailure::Unchanged {
                value: settled.value,
            };
            return Ok((outcome.fail(failure), Some(initial)));
        }
        Ok((outcome, Some(initial)))
    }

    async fn check_reload_reset<D>(&self, page: &mut D, initial: Option<String>) -> AriaResult<CheckOutcome>
    where
        D: PageDriver + ?Sized,
    {
        let toggle = &self.plan.toggle;
        let attribute = toggle.attribute.as_str();
        let outcome = CheckOutcome::new(
            format!("{} reload reset", toggle.subject),
            &toggle.subject,
            attribute,
        );

        info!("reloading document");
        match self.within(page.reload()).await {
            Ok(()) => {}
            // Earlier outcomes and the screenshot are already in hand
            Err(e @ AriaError::Navigation { .. }) => {
                info!(error = %e, "reload failed");
                return Ok(outcome.fail(CheckFailure::Fault {
                    message: e.to_string(),
                }));
            }
            Err(e) => return fail_with(outcome, e),
        }

        let after_reload = match self.within(page.attribute(&toggle.selector, attribute)).await {
            Ok(value) => value,
            Err(e) => return fail_with(outcome, e),
        };
        let mut outcome = outcome;
        outcome.observe(Observation::State {
            phase: Phase::AfterReload,
            attribute: attribute.to_string(),
            value: after_reload.clone(),
        });

        if after_reload == initial {
            Ok(outcome)
        } else {
            info!(?initial, ?after_reload, "toggle state survived reload");
            Ok(outcome.fail(CheckFailure::NotReset {
                initial,
                after_reload,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{FixtureElement, FixturePage};
    use crate::selector::Selector;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Project page whose driver can fail or stall on chosen calls
    struct FaultyPage {
        inner: FixturePage,
        failing_read: Option<&'static str>,
        stalled_read: Option<&'static str>,
        failing_click: bool,
        failing_reload: bool,
    }

    impl FaultyPage {
        fn new(inner: FixturePage) -> Self {
            Self {
                inner,
                failing_read: None,
                stalled_read: None,
                failing_click: false,
                failing_reload: false,
            }
        }
    }

    #[async_trait]
    impl PageDriver for FaultyPage {
        async fn goto(&mut self, url: &str) -> AriaResult<()> {
            self.inner.goto(url).await
        }

        async fn reload(&mut self) -> AriaResult<()> {
            if self.failing_reload {
                return Err(AriaError::Page {
                    message: "reload interrupted".to_string(),
                });
            }
            self.inner.reload().await
        }

        async fn count(&self, selector: &Selector) -> AriaResult<usize> {
            self.inner.count(selector).await
        }

        async fn attribute(&self, selector: &Selector, name: &str) -> AriaResult<Option<String>> {
            if self.stalled_read == Some(selector.as_str()) {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.failing_read == Some(selector.as_str()) {
                return Err(AriaError::Page {
                    message: "node detached".to_string(),
                });
            }
            self.inner.attribute(selector, name).await
        }

        async fn click(&mut self, selector: &Selector) -> AriaResult<()> {
            if self.failing_click {
                return Err(AriaError::Input {
                    message: "element not clickable".to_string(),
                });
            }
            self.inner.click(selector).await
        }

        async fn screenshot(&self) -> AriaResult<Vec<u8>> {
            self.inner.screenshot().await
        }

        fn current_url(&self) -> &str {
            self.inner.current_url()
        }
    }

    fn plan_in(dir: &TempDir) -> CheckPlan {
        CheckPlan::default()
            .with_screenshot(dir.path().join("verification").join("a11y-check.png"))
            .with_settle(30)
    }

    async fn run_on(page: &mut FixturePage, plan: CheckPlan) -> CheckReport {
        AccessibilityChecker::new(plan).run_check(page).await.unwrap()
    }

    fn failure_of<'a>(report: &'a CheckReport, name: &str) -> Option<&'a CheckFailure> {
        report.outcome(name).and_then(|o| o.failure.as_ref())
    }

    #[tokio::test]
    async fn test_well_formed_page_passes() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::project_page();
        let report = run_on(&mut page, plan_in(&dir)).await;

        assert!(report.passed(), "{:?}", report.failures().collect::<Vec<_>>());
        let names: Vec<_> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Search input", "Shake button", "Clear button", "category buttons toggle"]
        );
        assert_eq!(report.target, "file:///app/index.html");
        assert_eq!(page.clicks(), 1);
    }

    #[tokio::test]
    async fn test_lowercase_label_fails_with_subject() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::project_page().set_attr("#searchInput", "aria-label", "search");
        let report = run_on(&mut page, plan_in(&dir)).await;

        let outcome = report.outcome("Search input").unwrap();
        assert!(!outcome.passed());
        assert!(outcome.detail().contains("Search input"));
        assert_eq!(
            outcome.failure,
            Some(CheckFailure::Mismatch {
                expected: "Search projects".to_string(),
                actual: Some("search".to_string()),
            })
        );
        // Later checks still ran
        assert!(report.outcome("Shake button").unwrap().passed());
        assert!(report.outcome("category buttons toggle").unwrap().passed());
    }

    #[tokio::test]
    async fn test_missing_label_attribute_is_mismatch() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::project_page().remove_attr("#shakeButton", "aria-label");
        let report = run_on(&mut page, plan_in(&dir)).await;
        assert!(matches!(
            failure_of(&report, "Shake button"),
            Some(CheckFailure::Mismatch { actual: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_element_is_typed_failure() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::project_page().without("#clearSearch");
        let report = run_on(&mut page, plan_in(&dir)).await;
        assert_eq!(
            failure_of(&report, "Clear button"),
            Some(&CheckFailure::ElementNotFound {
                selector: "#clearSearch".to_string()
            })
        );
        assert!(report.screenshot.path.exists());
    }

    #[tokio::test]
    async fn test_zero_category_buttons_fails_without_click() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::project_page().without(".category-btn");
        let report = run_on(&mut page, plan_in(&dir)).await;

        let outcome = report.outcome("category buttons toggle").unwrap();
        assert!(matches!(outcome.failure, Some(CheckFailure::NoMatches { .. })));
        assert_eq!(
            outcome.observations,
            vec![Observation::Count {
                subject: "category buttons".to_string(),
                count: 0
            }]
        );
        assert_eq!(page.clicks(), 0);
    }

    #[tokio::test]
    async fn test_false_to_true_passes() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::new().with(
            FixtureElement::new("button")
                .class("category-btn")
                .attr("aria-pressed", "false")
                .toggles("aria-pressed"),
        );
        let plan = CheckPlan {
            labels: Vec::new(),
            ..plan_in(&dir)
        };
        let report = run_on(&mut page, plan).await;
        let outcome = report.outcome("category buttons toggle").unwrap();
        assert!(outcome.passed());
        assert_eq!(
            outcome.observations[1..],
            [
                Observation::State {
                    phase: Phase::Initial,
                    attribute: "aria-pressed".to_string(),
                    value: Some("false".to_string()),
                },
                Observation::State {
                    phase: Phase::AfterClick,
                    attribute: "aria-pressed".to_string(),
                    value: Some("true".to_string()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_stuck_toggle_fails() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::project_page()
            .set_attr(".category-btn", "aria-pressed", "false")
            .freeze(".category-btn");
        let report = run_on(&mut page, plan_in(&dir)).await;
        assert_eq!(
            failure_of(&report, "category buttons toggle"),
            Some(&CheckFailure::Unchanged {
                value: Some("false".to_string())
            })
        );
        assert_eq!(
            report.outcome("category buttons toggle").unwrap().detail(),
            "aria-pressed did not toggle"
        );
    }

    #[tokio::test]
    async fn test_screenshot_written_despite_failures() {
        let dir = TempDir::new().unwrap();
        let plan = plan_in(&dir);
        let path = plan.screenshot.clone();
        let mut page = FixturePage::project_page()
            .set_attr("#searchInput", "aria-label", "nope")
            .freeze(".category-btn");
        let report = run_on(&mut page, plan).await;

        assert!(!report.passed());
        let bytes = std::fs::read(&path).unwrap();
        assert!(!bytes.is_empty());
        assert!(image::load_from_memory(&bytes).is_ok());
        assert_eq!(report.screenshot.path, path);
    }

    #[tokio::test]
    async fn test_unreachable_document_is_fatal() {
        let dir = TempDir::new().unwrap();
        let plan = plan_in(&dir);
        let path = plan.screenshot.clone();
        let mut page = FixturePage::project_page().unreachable();
        let err = AccessibilityChecker::new(plan)
            .run_check(&mut page)
            .await
            .unwrap_err();
        assert!(matches!(err, AriaError::Navigation { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_blank_screenshot_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::project_page().blank_screenshot();
        let err = AccessibilityChecker::new(plan_in(&dir))
            .run_check(&mut page)
            .await
            .unwrap_err();
        assert!(matches!(err, AriaError::Screenshot { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_selector_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut plan = plan_in(&dir);
        plan.labels[0].selector = Selector::css("form > input");
        let mut page = FixturePage::project_page();
        let err = AccessibilityChecker::new(plan)
            .run_check(&mut page)
            .await
            .unwrap_err();
        assert!(matches!(err, AriaError::UnsupportedSelector { .. }));
    }

    #[tokio::test]
    async fn test_reload_resets_pressed_state() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::project_page();
        let report = run_on(&mut page, plan_in(&dir).with_reload_reset(true)).await;

        let outcome = report.outcome("category buttons reload reset").unwrap();
        assert!(outcome.passed());
        assert_eq!(
            outcome.observations,
            vec![Observation::State {
                phase: Phase::AfterReload,
                attribute: "aria-pressed".to_string(),
                value: Some("true".to_string()),
            }]
        );
        assert_eq!(page.loads(), 2);
    }

    #[tokio::test]
    async fn test_persisted_toggle_fails_reload_check() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::project_page().persist_state();
        let report = run_on(&mut page, plan_in(&dir).with_reload_reset(true)).await;
        assert_eq!(
            failure_of(&report, "category buttons reload reset"),
            Some(&CheckFailure::NotReset {
                initial: Some("true".to_string()),
                after_reload: Some("false".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn test_label_outcomes_idempotent_across_fresh_sessions() {
        let dir = TempDir::new().unwrap();
        let build = || FixturePage::project_page().set_attr("#shakeButton", "aria-label", "Shake");
        let first = run_on(&mut build(), plan_in(&dir)).await;
        let second = run_on(&mut build(), plan_in(&dir)).await;
        let verdicts = |r: &CheckReport| -> Vec<(String, bool)> {
            r.outcomes.iter().map(|o| (o.name.clone(), o.passed())).collect()
        };
        assert_eq!(verdicts(&first), verdicts(&second));
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_plan_before_launch() {
        let plan = CheckPlan::default().with_step_timeout(0);
        let err = AccessibilityChecker::new(plan)
            .run(BrowserConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AriaError::Plan { .. }));
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_run_without_browser_feature() {
        let err = AccessibilityChecker::default()
            .run(BrowserConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AriaError::BrowserUnavailable));
    }

    #[tokio::test]
    async fn test_page_error_fails_only_that_check() {
        let dir = TempDir::new().unwrap();
        let plan = plan_in(&dir);
        let path = plan.screenshot.clone();
        let mut page = FaultyPage::new(FixturePage::project_page());
        page.failing_read = Some("#searchInput");
        let report = AccessibilityChecker::new(plan).run_check(&mut page).await.unwrap();

        assert_eq!(
            failure_of(&report, "Search input"),
            Some(&CheckFailure::Fault {
                message: "Page error: node detached".to_string()
            })
        );
        assert!(report.outcome("Shake button").unwrap().passed());
        assert!(report.outcome("Clear button").unwrap().passed());
        assert!(report.outcome("category buttons toggle").unwrap().passed());
        assert_eq!(page.inner.clicks(), 1);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_stalled_read_times_out_as_failed_check() {
        let dir = TempDir::new().unwrap();
        let plan = plan_in(&dir).with_step_timeout(100);
        let mut page = FaultyPage::new(FixturePage::project_page());
        page.stalled_read = Some("#shakeButton");
        let report = AccessibilityChecker::new(plan).run_check(&mut page).await.unwrap();

        assert_eq!(
            failure_of(&report, "Shake button"),
            Some(&CheckFailure::Fault {
                message: "Operation timed out after 100ms".to_string()
            })
        );
        assert!(report.outcome("Clear button").unwrap().passed());
        assert_eq!(report.failures().count(), 1);
        assert!(report.screenshot.path.exists());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_earlier_outcomes() {
        let dir = TempDir::new().unwrap();
        let plan = plan_in(&dir).with_reload_reset(true);
        let mut page =
            FaultyPage::new(FixturePage::project_page().set_attr("#searchInput", "aria-label", "search"));
        page.failing_reload = true;
        let report = AccessibilityChecker::new(plan).run_check(&mut page).await.unwrap();

        assert!(matches!(
            failure_of(&report, "Search input"),
            Some(CheckFailure::Mismatch { .. })
        ));
        let reload = report.outcome("category buttons reload reset").unwrap();
        assert!(matches!(reload.failure, Some(CheckFailure::Fault { .. })));
        assert!(reload.detail().contains("reload interrupted"));
        assert!(report.screenshot.path.exists());
    }

    #[tokio::test]
    async fn test_missing_toggle_group_skips_reload_check() {
        let dir = TempDir::new().unwrap();
        let mut page = FixturePage::project_page().without(".category-btn");
        let report = run_on(&mut page, plan_in(&dir).with_reload_reset(true)).await;

        assert!(report.outcome("category buttons reload reset").is_none());
        assert_eq!(report.failures().count(), 1);
        assert_eq!(page.loads(), 1);
    }

    #[tokio::test]
    async fn test_failed_click_keeps_initial_state_for_reload() {
        let dir = TempDir::new().unwrap();
        let plan = plan_in(&dir).with_reload_reset(true);
        let mut page = FaultyPage::new(FixturePage::project_page());
        page.failing_click = true;
        let report = AccessibilityChecker::new(plan).run_check(&mut page).await.unwrap();

        assert_eq!(
            failure_of(&report, "category buttons toggle"),
            Some(&CheckFailure::Fault {
                message: "Input simulation failed: element not clickable".to_string()
            })
        );
        assert!(report.outcome("category buttons reload reset").unwrap().passed());
        assert_eq!(page.inner.loads(), 2);
    }

    proptest! {
        #[test]
        fn prop_padded_label_never_matches(pad in "[ \t\n]{1,3}") {
            let check = AttributeCheck::label("Search input", Selector::id("searchInput"), "Search projects");
            let leading = format!("{pad}Search projects");
            let trailing = format!("Search projects{pad}");
            prop_assert!(!check.matches(Some(leading.as_str())));
            prop_assert!(!check.matches(Some(trailing.as_str())));
        }

        #[test]
        fn prop_only_the_literal_matches(actual in ".*") {
            let check = AttributeCheck::label("Clear button", Selector::id("clearSearch"), "Clear search");
            prop_assert_eq!(check.matches(Some(actual.as_str())), actual == "Clear search");
        }
    }
}
