mod config_cmd;
mod list;
mod run;
mod send;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;

pub use list::ListCommand;
pub use run::RunCommand;
pub use send::SendCommand;

#[derive(Parser)]
#[command(name = "assistant-check")]
#[command(about = "Contract checks for the gym admin assistant API", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Base URL of the gym app, overrides the config file
    #[arg(long, global = true, env = "ASSISTANT_CHECK_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds, overrides the config file
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path to configuration file
    #[arg(long, global = true, env = "ASSISTANT_CHECK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a suite of checks against the assistant endpoint
    Run(RunCommand),

    /// List the built-in suites and their cases
    List(ListCommand),

    /// Send a single message and print the raw response
    Send(SendCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<ExitCode> {
        if self.no_color {
            colored::control::set_override(false);
        }

        if self.verbose {
            tracing::info!("Verbose mode enabled");
        }

        match self.command {
            Commands::Run(ref cmd) => cmd.execute(self.load_config(&self.config_path()?)?).await,
            Commands::List(ref cmd) => cmd.execute().map(|_| ExitCode::SUCCESS),
            Commands::Send(ref cmd) => cmd
                .execute(self.load_config(&self.config_path()?)?)
                .await
                .map(|_| ExitCode::SUCCESS),
            Commands::Config(ref subcmd) => {
                let config_path = self.config_path()?;
                match subcmd {
                    ConfigSubcommands::Show => {
                        config_cmd::show_config(&self.load_config(&config_path)?, &config_path)
                    }
                    ConfigSubcommands::Init { force } => {
                        config_cmd::init_config(&config_path, *force)
                    }
                }
                .map(|_| ExitCode::SUCCESS)
            }
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    /// Only commands that read or write the config file need a home directory
    fn config_path(&self) -> Result<PathBuf> {
        Config::resolve_path(self.config.as_deref())
    }

    /// Config file values with command-line overrides applied
    fn load_config(&self, path: &std::path::Path) -> Result<Config> {
        let mut config = Config::load_from(path)?;

        if let Some(base_url) = &self.base_url {
            config.api.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.api.timeout_seconds = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
