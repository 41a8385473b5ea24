mod summary;

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::api::AssistantClient;
use crate::checks::{evaluate, Evaluation};
use crate::report::Reporter;
use crate::suites::{Suite, TestCase};

pub use summary::{CaseResult, Summary, Verdict};

/// Runs the cases of a suite one after another
///
/// There is never more than one request in flight. The fixed delay between
/// cases is the only rate-limit policy; there is no backoff.
pub struct Runner<'a> {
    client: &'a AssistantClient,
    delay: Duration,
    threshold: f64,
}

impl<'a> Runner<'a> {
    pub fn new(client: &'a AssistantClient, delay: Duration, threshold: f64) -> Self {
        Self {
            client,
            delay,
            threshold,
        }
    }

    /// Run every case in order and return the summary with its verdict
    pub async fn run<W: Write>(
        &self,
        suite: &Suite,
        reporter: &mut Reporter<W>,
    ) -> (Summary, Verdict) {
        tracing::info!("Running suite '{}' with {} cases", suite.name, suite.cases.len());
        reporter.suite_started(
            suite,
            self.client.url(),
            self.client.timeout_seconds(),
            self.delay.as_secs(),
        );

        let mut summary = Summary::new(&suite.name);

        for (index, case) in suite.cases.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                reporter.waiting(self.delay.as_secs());
                pause(self.delay).await;
            }

            reporter.case_started(index + 1, case);
            let result = self.run_case(case, reporter).await;
            reporter.case_finished(&result);
            summary.record(result);
        }

        let verdict = summary.verdict(self.threshold);
        tracing::info!(
            "Suite '{}' finished: {}/{} passed, verdict {:?}",
            suite.name,
            summary.passed(),
            summary.total(),
            verdict
        );
        reporter.summary(&summary, verdict);

        (summary, verdict)
    }

    /// Send one case and judge the reply; errors become results
    pub async fn run_case<W: Write>(
        &self,
        case: &TestCase,
        reporter: &mut Reporter<W>,
    ) -> CaseResult {
        let started = Instant::now();

        let evaluation = match self.client.send(&case.message).await {
            Ok(exchange) => {
                reporter.status(exchange.status.as_u16());
                evaluate(&case.expect, &exchange.response)
            }
            Err(e) => {
                tracing::warn!("Case '{}' request failed: {}", case.name, e);
                if let Some(status) = e.status() {
                    reporter.status(status.as_u16());
                }
                Evaluation::from_error(&e)
            }
        };

        reporter.findings(&evaluation.findings);

        CaseResult {
            name: case.name.clone(),
            outcome: evaluation.outcome,
            details: evaluation.details,
            findings: evaluation.findings,
            elapsed: started.elapsed(),
        }
    }
}

/// Sleep with a spinner; the spinner hides itself when stderr is not a terminal
async fn pause(delay: Duration) {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("waiting {}s", delay.as_secs()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    sleep(delay).await;

    spinner.finish_and_clear();
}
