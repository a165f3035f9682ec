//! Transcript rendering and progress display

use ariaprobe::{CheckOutcome, CheckReport};
use console::{style, Style};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

/// Writes a [`CheckReport`] as the line-per-observation transcript
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Reporter<io::Stdout> {
    /// Reporter on standard output
    #[must_use]
    pub fn stdout(use_color: bool, quiet: bool) -> Self {
        Self::new(io::stdout(), use_color, quiet)
    }
}

impl<W: Write> Reporter<W> {
    /// Create a reporter over any writer
    pub fn new(out: W, use_color: bool, quiet: bool) -> Self {
        Self {
            out,
            use_color,
            quiet,
        }
    }

    /// Consume the reporter, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render every outcome, the screenshot line and a summary
    pub fn report(&mut self, report: &CheckReport) -> io::Result<()> {
        for outcome in &report.outcomes {
            self.outcome(outcome)?;
        }

        if !self.quiet {
            let shot = &report.screenshot;
            writeln!(
                self.out,
                "Screenshot saved to {} ({}x{})",
                shot.path.display(),
                shot.width,
                shot.height
            )?;
        }

        self.summary(report)
    }

    fn outcome(&mut self, outcome: &CheckOutcome) -> io::Result<()> {
        if !self.quiet {
            for observation in &outcome.observations {
                writeln!(self.out, "{observation}")?;
            }
        }
        if !outcome.passed() {
            // Failures print even in quiet mode
            let prefix = if self.use_color {
                style("FAIL:").red().bold().to_string()
            } else {
                "FAIL:".to_string()
            };
            writeln!(self.out, "{prefix} {}", outcome.detail())?;
        }
        Ok(())
    }

    fn summary(&mut self, report: &CheckReport) -> io::Result<()> {
        let total = report.outcomes.len();
        let failed = report.failures().count();
        let passed = total - failed;
        if self.quiet && failed == 0 {
            return Ok(());
        }

        let status = if failed > 0 { "FAILED" } else { "PASSED" };
        let status = if self.use_color {
            let paint = if failed > 0 {
                Style::new().red().bold()
            } else {
                Style::new().green().bold()
            };
            paint.apply_to(status).to_string()
        } else {
            status.to_string()
        };

        writeln!(self.out)?;
        writeln!(
            self.out,
            "{status} {total} checks on {} ({passed} passed, {failed} failed)",
            report.target
        )
    }
}

/// Spinner on stderr while the browser works
#[derive(Debug)]
pub struct RunSpinner {
    bar: Option<ProgressBar>,
}

impl RunSpinner {
    /// Start a spinner unless quiet or stderr is not a terminal
    #[must_use]
    pub fn start(message: &str, quiet: bool) -> Self {
        if quiet || !std::io::IsTerminal::is_terminal(&std::io::stderr()) {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    /// Remove the spinner from the terminal
    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
