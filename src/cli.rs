// CLI interface for epsagon-wrap using clap
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::path::PathBuf;

use crate::commands::clean::execute_clean_command;
use crate::commands::run::{execute_hook_command, execute_run_command, CommandContext};
use crate::error::{exit_codes, CliError, Result, WrapError};
use crate::lifecycle::LifecycleEvent;
use crate::logging::LogFormat;
use crate::plugin::{HookOutcome, RunOutcome};

#[derive(Parser)]
#[command(
    name = "epsagon-wrap",
    about = "Wrap serverless function handlers with Epsagon instrumentation",
    version = crate::VERSION,
    long_about = "epsagon-wrap generates a monitoring wrapper for every supported function in a \
                  serverless service, rewrites the service manifest to point at the wrappers and \
                  cleans the generated files up again."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Service directory
    #[arg(short = 's', long, global = true, default_value = ".")]
    pub service_path: PathBuf,

    /// Service manifest, relative to the service directory
    #[arg(short, long, global = true, default_value = "serverless.yml")]
    pub config: String,

    /// Control color output (auto, always, never)
    #[arg(long, global = true, value_name = "WHEN")]
    pub color: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate wrappers and print the rewritten manifest (default command)
    Run {
        /// Write the rewritten manifest here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove the generated handlers directory
    Clean,

    /// Invoke the hook registered for a host lifecycle event
    Hook {
        /// Lifecycle event, e.g. after:package:initialize
        event: String,

        /// Write the rewritten manifest here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print where to monitor the wrapped functions
    Link,

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completion for
        shell: Shell,
    },
}

impl Cli {
    pub fn run(&self) -> Result<i32> {
        self.init_logging();

        if self.verbose && self.quiet {
            return Err(WrapError::Cli(Box::new(CliError::ConflictingArguments {
                first: "--verbose".to_string(),
                second: "--quiet".to_string(),
                suggestion: "Use either --verbose for more output or --quiet for less output, but not both".to_string(),
            })));
        }

        if let Some(Commands::GenerateCompletion { shell }) = &self.command {
            let mut cmd = Self::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut std::io::stdout());
            return Ok(0);
        }

        let context = CommandContext::new(&self.service_path, &self.config);
        let runtime = tokio::runtime::Runtime::new()?;

        runtime.block_on(async {
            match &self.command {
                Some(Commands::Run { output }) => {
                    let outcome = execute_run_command(&context, output.as_deref()).await?;
                    report_run(&outcome);
                }
                None => {
                    let outcome = execute_run_command(&context, None).await?;
                    report_run(&outcome);
                }
                Some(Commands::Clean) => {
                    execute_clean_command(&context).await?;
                }
                Some(Commands::Hook { event, output }) => {
                    let event: LifecycleEvent = event.parse()?;
                    if let HookOutcome::Run(outcome) =
                        execute_hook_command(&context, event, output.as_deref()).await?
                    {
                        report_run(&outcome);
                    }
                }
                Some(Commands::Link) => {
                    execute_hook_command(&context, LifecycleEvent::AfterDeploy, None).await?;
                }
                Some(Commands::GenerateCompletion { .. }) => {}
            }
            Ok::<i32, WrapError>(exit_codes::SUCCESS)
        })
    }

    fn init_logging(&self) {
        use crate::logging::{init_logging, LogConfig};

        let log_config = LogConfig::from_cli(
            self.verbose,
            self.quiet,
            self.color.as_deref(),
            self.log_format,
        );

        if let Err(e) = init_logging(log_config) {
            eprintln!("Failed to initialize logging: {e}");
        }
    }
}

fn report_run(outcome: &RunOutcome) {
    if let RunOutcome::Wrapped(report) = outcome {
        tracing::debug!(
            handlers = report.handlers.len(),
            files = report.files.len(),
            notices = report.notices.len(),
            "Run finished"
        );
    }
}
