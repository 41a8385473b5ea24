use anyhow::{bail, Result};
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::api::AssistantClient;
use crate::config::Config;
use crate::report::Reporter;
use crate::runner::Runner;
use crate::suites::Suite;

#[derive(Args)]
pub struct RunCommand {
    /// Built-in suite to run
    #[arg(short, long, default_value = "admin-assistant", conflicts_with = "suite_file")]
    suite: String,

    /// Run a suite defined in a TOML file instead
    #[arg(long)]
    suite_file: Option<PathBuf>,

    /// Only run cases whose name contains this text
    #[arg(long)]
    only: Option<String>,

    /// Seconds to wait between cases, overrides the suite and config
    #[arg(long)]
    delay: Option<u64>,

    /// Share of cases that must pass (0.0 - 1.0), overrides the config
    #[arg(long)]
    threshold: Option<f64>,
}

impl RunCommand {
    pub async fn execute(&self, config: Config) -> Result<ExitCode> {
        let mut suite = match &self.suite_file {
            Some(path) => Suite::load(path)?,
            None => Suite::builtin(&self.suite)?,
        };

        if let Some(pattern) = &self.only {
            suite = suite.filter(pattern)?;
        }

        let threshold = self.threshold.unwrap_or(config.run.pass_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            bail!("--threshold must be between 0.0 and 1.0, got {}", threshold);
        }

        let delay_seconds = self
            .delay
            .or(config.run.delay_seconds)
            .unwrap_or(suite.delay_seconds);

        let client = AssistantClient::new(&config)?;
        let runner = Runner::new(&client, Duration::from_secs(delay_seconds), threshold);

        let mut reporter = Reporter::stdout();
        let (_, verdict) = runner.run(&suite, &mut reporter).await;

        Ok(ExitCode::from(verdict.exit_code()))
    }
}
