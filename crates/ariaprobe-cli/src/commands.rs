//! CLI argument definitions using clap

use ariaprobe::{BrowserConfig, CheckPlan};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{CliConfig, ColorChoice, Verbosity};
use crate::error::{CliError, CliResult};

/// Ariaprobe: check ARIA labels and toggle state of a page in headless Chromium
///
/// With no options, loads file:///app/index.html, checks the search, shake
/// and clear-search labels and the first category toggle, and writes
/// verification/a11y-check.png.
#[derive(Parser, Debug)]
#[command(name = "ariaprobe")]
#[command(author, version, about, long_about)]
pub struct Cli {
    /// YAML plan replacing the built-in check table
    #[arg(long, value_name = "FILE")]
    pub plan: Option<PathBuf>,

    /// URL of the document to check
    #[arg(long, conflicts_with = "document")]
    pub url: Option<String>,

    /// Local HTML file to check (converted to a file:// URL)
    #[arg(long, value_name = "PATH")]
    pub document: Option<PathBuf>,

    /// Where to write the screenshot
    #[arg(long, value_name = "PATH")]
    pub screenshot: Option<PathBuf>,

    /// Timeout for each page operation in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// How long to wait for the page to react to the click, in milliseconds
    #[arg(long, value_name = "MS")]
    pub settle: Option<u64>,

    /// Also reload the page and require the toggle state to reset
    #[arg(long)]
    pub verify_reload: bool,

    /// Path to the Chromium binary
    #[arg(long, env = "CHROMIUM_PATH", value_name = "PATH")]
    pub chromium_path: Option<String>,

    /// Disable the Chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Print the effective plan as YAML and exit
    #[arg(long)]
    pub print_plan: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only failures)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorArg,
}

impl Cli {
    /// Output configuration from the flags
    #[must_use]
    pub fn config(&self) -> CliConfig {
        CliConfig::new()
            .with_verbosity(Verbosity::from_flags(self.quiet, self.verbose))
            .with_color(self.color.into())
    }

    /// Built-in plan, overlaid with the plan file, overlaid with flags
    pub fn resolve_plan(&self) -> CliResult<CheckPlan> {
        let mut plan = match &self.plan {
            Some(path) => CheckPlan::load(path).map_err(|e| {
                CliError::config(format!("plan {}: {e}", path.display()))
            })?,
            None => CheckPlan::default(),
        };

        if let Some(url) = &self.url {
            plan = plan.with_target(url.clone());
        }
        if let Some(document) = &self.document {
            plan = plan.with_document(document)?;
        }
        if let Some(path) = &self.screenshot {
            plan = plan.with_screenshot(path.clone());
        }
        if let Some(ms) = self.timeout {
            plan = plan.with_step_timeout(ms);
        }
        if let Some(ms) = self.settle {
            plan = plan.with_settle(ms);
        }
        if self.verify_reload {
            plan = plan.with_reload_reset(true);
        }

        plan.validate()?;
        Ok(plan)
    }

    /// Browser settings from the flags
    #[must_use]
    pub fn browser_config(&self, plan: &CheckPlan) -> BrowserConfig {
        // CDP requests get the step budget plus headroom so the step
        // timeout reports first
        let request_timeout = Duration::from_millis(plan.timeouts.step_ms.saturating_mul(2));
        let mut config = BrowserConfig::default()
            .with_headless(!self.headed)
            .with_request_timeout(request_timeout);
        if self.no_sandbox {
            config = config.with_no_sandbox();
        }
        if let Some(path) = &self.chromium_path {
            config = config.with_chromium_path(path.clone());
        }
        config
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
