use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::checks::Expectation;

const ADMIN_ASSISTANT: &str = include_str!("../../suites/admin_assistant.toml");
const NEW_TOOLS: &str = include_str!("../../suites/new_tools.toml");

/// Names of the suites shipped with the binary
pub const BUILTIN_SUITES: [&str; 2] = ["admin-assistant", "new-tools"];

/// One natural-language instruction and what its reply must show
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub message: String,

    #[serde(flatten)]
    pub expect: Expectation,
}

/// Ordered list of cases run against the endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Pause between consecutive cases, keeps the upstream rate limit happy
    #[serde(default = "default_delay")]
    pub delay_seconds: u64,

    pub cases: Vec<TestCase>,
}

fn default_delay() -> u64 {
    2
}

impl Suite {
    /// Look up a suite shipped with the binary
    pub fn builtin(name: &str) -> Result<Self> {
        let source = match name {
            "admin-assistant" => ADMIN_ASSISTANT,
            "new-tools" => NEW_TOOLS,
            other => bail!(
                "Unknown suite '{}'. Available suites: {}",
                other,
                BUILTIN_SUITES.join(", ")
            ),
        };
        Self::parse(source).with_context(|| format!("Built-in suite '{}' is invalid", name))
    }

    /// Every suite shipped with the binary
    pub fn builtins() -> Result<Vec<Self>> {
        BUILTIN_SUITES.iter().map(|name| Self::builtin(name)).collect()
    }

    /// Load a suite from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read suite file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse suite file {}", path.display()))
    }

    pub fn parse(source: &str) -> Result<Self> {
        let suite: Suite = toml::from_str(source)?;
        suite.validate()?;
        Ok(suite)
    }

    fn validate(&self) -> Result<()> {
        if self.cases.is_empty() {
            bail!("Suite '{}' has no cases", self.name);
        }

        for case in &self.cases {
            if case.message.trim().is_empty() {
                bail!("Case '{}' has an empty message", case.name);
            }
            let expect = &case.expect;
            if !expect.accept_any_message
                && expect.tool_keys.is_empty()
                && expect.message_keywords.is_empty()
            {
                bail!("Case '{}' can never pass: it expects no keys and no keywords", case.name);
            }
        }

        Ok(())
    }

    /// Keep only cases whose name contains the pattern, ignoring case
    pub fn filter(mut self, pattern: &str) -> Result<Self> {
        let needle = pattern.to_lowercase();
        self.cases.retain(|case| case.name.to_lowercase().contains(&needle));

        if self.cases.is_empty() {
            bail!("No case in suite '{}' matches '{}'", self.name, pattern);
        }
        Ok(self)
    }
}
