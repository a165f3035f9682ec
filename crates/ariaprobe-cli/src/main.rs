//! Ariaprobe CLI: check ARIA labels and toggle state in headless Chromium
//!
//! ## Usage
//!
//! ```bash
//! ariaprobe                                   # Default plan against file:///app/index.html
//! ariaprobe --document site/index.html        # Check a local file
//! ariaprobe --plan checks.yaml --verify-reload
//! ariaprobe --print-plan > checks.yaml        # Start a plan from the defaults
//! ```

use ariaprobe_cli::{logging, Cli, CliResult, CheckRunner, EXIT_ERROR};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();
    logging::init(config.verbosity);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: &Cli) -> CliResult<ExitCode> {
    let plan = cli.resolve_plan()?;

    if cli.print_plan {
        print!("{}", plan.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let browser = cli.browser_config(&plan);
    let runner = CheckRunner::new(cli.config());
    let report = runner.run(plan, browser)?;
    runner.finish(&report)
}
