//! # Survey CLI
//!
//! Feeds JSON fixtures to the survey engine and prints JSON results.

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use survey_engine::config::runtime::RuntimeConfig;
use survey_engine::{log_error, log_info, logging};

#[derive(Debug, Parser)]
#[command(name = "survey", version, about = "Conditional visibility and section validation")]
struct Cli {
    /// TOML configuration (falls back to SURVEY_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate one condition expression
    Check {
        condition: String,
        #[command(flatten)]
        inputs: AnswerInputs,
    },
    /// List the visible questions of a section
    Visible {
        #[arg(long)]
        structure: PathBuf,
        #[arg(long)]
        section: String,
        #[command(flatten)]
        inputs: AnswerInputs,
    },
    /// Validate a section and print the cleaned answers
    Validate {
        #[arg(long)]
        structure: PathBuf,
        #[arg(long)]
        section: String,
        #[command(flatten)]
        inputs: AnswerInputs,
    },
    /// Print the identification section and the selectable phases
    Phases {
        #[arg(long)]
        structure: PathBuf,
    },
}

/// Answer and context fixtures shared by the evaluating subcommands
#[derive(Debug, Args)]
struct AnswerInputs {
    /// In-progress answers, a JSON object keyed by question id
    #[arg(long)]
    answers: Option<PathBuf>,
    /// Collected phases, a JSON array of {phaseName, answers}
    #[arg(long)]
    collected: Option<PathBuf>,
    /// Project context, a flat JSON object
    #[arg(long)]
    project: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::from_env()?,
    };
    logging::init_global_logging_with_preferences(&config.logging)?;
    log_info!("Survey CLI starting", "command" => cli.command.name());

    let output = match cli.command {
        Command::Check { condition, inputs } => commands::check(&condition, &inputs.load()?),
        Command::Visible {
            structure,
            section,
            inputs,
        } => commands::visible(&structure, &section, &inputs.load()?, &config),
        Command::Validate {
            structure,
            section,
            inputs,
        } => commands::validate(&structure, &section, inputs.load()?, &config),
        Command::Phases { structure } => commands::phases(&structure),
    };

    match output {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(error) => {
            log_error!(logging::codes::system::INTERNAL_ERROR, "Command failed",
                "error" => error
            );
            Err(error)
        }
    }
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Check { .. } => "check",
            Command::Visible { .. } => "visible",
            Command::Validate { .. } => "validate",
            Command::Phases { .. } => "phases",
        }
    }
}

impl AnswerInputs {
    fn load(&self) -> Result<commands::Inputs, Box<dyn std::error::Error>> {
        Ok(commands::Inputs {
            answers: commands::read_json_or_default(self.answers.as_deref())?,
            collected: commands::read_json_or_default(self.collected.as_deref())?,
            project: commands::read_json_or_default(self.project.as_deref())?,
        })
    }
}
