use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::checks::{Finding, Outcome};

/// Result of one case, as recorded by the runner
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub outcome: Outcome,
    pub details: String,
    pub findings: Vec<Finding>,
    pub elapsed: Duration,
}

/// Aggregate decision for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    AllPassed,
    /// Every case passed or was rate limited
    PassedWithRateLimits,
    /// Enough cases passed to clear the threshold
    MostPassed,
    Failed,
}

impl Verdict {
    pub fn is_success(&self) -> bool {
        !matches!(self, Verdict::Failed)
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub suite: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<CaseResult>,
}

impl Summary {
    pub fn new(suite: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            suite: suite.into(),
            started_at: now,
            finished_at: now,
            results: Vec::new(),
        }
    }

    pub fn record(&mut self, result: CaseResult) {
        self.results.push(result);
        self.finished_at = Utc::now();
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.count(Outcome::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::Failed)
    }

    pub fn rate_limited(&self) -> usize {
        self.count(Outcome::RateLimited)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Rate-limited cases count toward the threshold as soft passes
    pub fn verdict(&self, threshold: f64) -> Verdict {
        let total = self.total();
        let passed = self.passed();
        let soft_passed = passed + self.rate_limited();

        if total == 0 {
            Verdict::Failed
        } else if passed == total {
            Verdict::AllPassed
        } else if soft_passed == total {
            Verdict::PassedWithRateLimits
        } else if soft_passed as f64 >= threshold * total as f64 {
            Verdict::MostPassed
        } else {
            Verdict::Failed
        }
    }
}
