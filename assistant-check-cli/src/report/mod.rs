use colored::{ColoredString, Colorize};
use std::io::{self, Write};

use crate::checks::{Finding, Level, Outcome};
use crate::runner::{CaseResult, Summary, Verdict};
use crate::suites::{Suite, TestCase};

const WIDE_RULE: usize = 80;
const RULE: usize = 60;

/// Console output of a run
///
/// Writes are best effort: a closed stdout must not abort the run.
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", text.as_ref());
    }

    pub fn suite_started(&mut self, suite: &Suite, url: &str, timeout_seconds: u64, delay_seconds: u64) {
        self.line(format!("{} {}", "Suite:".bold(), suite.name));
        if !suite.description.is_empty() {
            self.line(format!("  {}", suite.description));
        }
        self.line(format!("Testing endpoint: {}", url));
        self.line(format!("Timeout: {} seconds per request", timeout_seconds));
        self.line(format!("Delay between tests: {} seconds", delay_seconds));
        self.line(format!("Started at: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")));
        self.line("=".repeat(WIDE_RULE));
    }

    pub fn case_started(&mut self, index: usize, case: &TestCase) {
        self.line("");
        self.line("=".repeat(RULE));
        self.line(format!("TEST {}: {}", index, case.name.to_uppercase()).bold().to_string());
        self.line("=".repeat(RULE));
        self.line(format!("Sending request: {}", case.message));
    }

    pub fn status(&mut self, status: u16) {
        self.line(format!("Status Code: {}", status));
    }

    pub fn findings(&mut self, findings: &[Finding]) {
        for finding in findings {
            let marker = marker(finding.level);
            self.line(format!("{} {}", marker, finding.text));
        }
    }

    pub fn case_finished(&mut self, result: &CaseResult) {
        self.line(format!(
            "{} {} ({:.1}s) - {}",
            outcome_label(result.outcome),
            result.name,
            result.elapsed.as_secs_f64(),
            result.details
        ));
    }

    pub fn waiting(&mut self, seconds: u64) {
        self.line(format!("Waiting {} seconds to avoid rate limits...", seconds));
        let _ = self.out.flush();
    }

    pub fn summary(&mut self, summary: &Summary, verdict: Verdict) {
        self.line("");
        self.line("=".repeat(WIDE_RULE));
        self.line("TEST SUMMARY".bold().to_string());
        self.line("=".repeat(WIDE_RULE));

        for result in &summary.results {
            self.line(format!("{}: {}", result.name, outcome_label(result.outcome)));
            if !result.details.is_empty() {
                self.line(format!("    {}", result.details));
            }
        }

        self.line("");
        self.line(format!("Working: {}", summary.passed()));
        self.line(format!("Rate limited: {}", summary.rate_limited()));
        self.line(format!("Failed: {}", summary.failed()));
        self.line(format!(
            "OVERALL: {}/{} tests passed",
            summary.passed(),
            summary.total()
        ));
        let took = summary.finished_at - summary.started_at;
        self.line(format!("Finished in {}s", took.num_seconds()));

        let sentence = match verdict {
            Verdict::AllPassed => "ALL TESTS PASSED! Admin assistant API is working correctly.".green(),
            Verdict::PassedWithRateLimits => {
                "ALL TOOLS RESPONDED (some rate limited). Rate limiting is an API quota issue, not a code problem."
                    .yellow()
            }
            Verdict::MostPassed => "MOST TESTS PASSED. Some minor issues may exist.".yellow(),
            Verdict::Failed => "MULTIPLE TESTS FAILED. Major issues detected.".red(),
        };
        self.line(sentence.bold().to_string());
        let _ = self.out.flush();
    }
}

fn marker(level: Level) -> ColoredString {
    match level {
        Level::Info => "  ".normal(),
        Level::Success => "✓".green(),
        Level::Warning => "!".yellow(),
        Level::Missing => "-".yellow(),
        Level::Error => "✗".red(),
    }
}

fn outcome_label(outcome: Outcome) -> ColoredString {
    let label = outcome.label();
    match outcome {
        Outcome::Passed => label.green().bold(),
        Outcome::Failed => label.red().bold(),
        Outcome::RateLimited => label.yellow().bold(),
    }
}
