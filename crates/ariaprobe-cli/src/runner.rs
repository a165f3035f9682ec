//! Drives one check run and maps it to an exit status

use ariaprobe::{AccessibilityChecker, BrowserConfig, CheckPlan, CheckReport};
use std::process::ExitCode;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{Reporter, RunSpinner};

/// Exit status when every check passed
pub const EXIT_PASSED: u8 = 0;
/// Exit status when at least one check failed
pub const EXIT_FAILED: u8 = 1;
/// Exit status when the run could not complete
pub const EXIT_ERROR: u8 = 2;

/// Runs a plan in a fresh browser and prints the transcript
#[derive(Debug)]
pub struct CheckRunner {
    config: CliConfig,
}

impl CheckRunner {
    /// Create a runner
    #[must_use]
    pub const fn new(config: CliConfig) -> Self {
        Self { config }
    }

    /// Run the plan to completion on a dedicated runtime
    pub fn run(&self, plan: CheckPlan, browser: BrowserConfig) -> CliResult<CheckReport> {
        let rt = tokio::runtime::Runtime::new().map_err(|e| CliError::Runtime {
            message: e.to_string(),
        })?;

        let quiet = self.config.verbosity.is_quiet();
        let spinner = RunSpinner::start(&format!("Checking {}", plan.target), quiet);
        let checker = AccessibilityChecker::new(plan);
        let result = rt.block_on(checker.run(browser));
        spinner.finish();

        result.map_err(CliError::from)
    }

    /// Print the transcript and pick the exit status
    pub fn finish(&self, report: &CheckReport) -> CliResult<ExitCode> {
        let mut reporter = Reporter::stdout(
            self.config.color.should_color(),
            self.config.verbosity.is_quiet(),
        );
        reporter.report(report)?;
        tracing::info!(
            failures = report.failures().count(),
            screenshot = %report.screenshot.path.display(),
            "transcript written"
        );
        Ok(exit_code(report))
    }
}

/// 0 when every check passed, 1 otherwise
#[must_use]
pub fn exit_code(report: &CheckReport) -> ExitCode {
    ExitCode::from(exit_status(report))
}

/// Numeric form of [`exit_code`]
#[must_use]
pub fn exit_status(report: &CheckReport) -> u8 {
    if report.passed() {
        EXIT_PASSED
    } else {
        EXIT_FAILED
    }
}
