use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::suites::Suite;

#[derive(Args)]
pub struct ListCommand {
    /// Also show the message each case sends
    #[arg(short, long)]
    messages: bool,
}

impl ListCommand {
    pub fn execute(&self) -> Result<()> {
        for suite in Suite::builtins()? {
            println!(
                "{} ({} cases, {}s between cases)",
                suite.name.bold(),
                suite.cases.len(),
                suite.delay_seconds
            );
            if !suite.description.is_empty() {
                println!("  {}", suite.description);
            }

            for (index, case) in suite.cases.iter().enumerate() {
                println!("  {}. {}", index + 1, case.name);
                if self.messages {
                    println!("     \"{}\"", case.message);
                }
            }
            println!();
        }

        Ok(())
    }
}
