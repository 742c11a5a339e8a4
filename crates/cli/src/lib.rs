pub mod bootstrap;
pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "itinera",
    about = "Itinera travel-planning assistant CLI",
    long_about = "Chat with the Itinera travel planner, run one-shot queries, and inspect \
                  runtime configuration and provider readiness.",
    after_help = "Examples:\n  itinera chat\n  itinera ask \"3 day honeymoon trip to Udaipur, moderate budget\"\n  itinera doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to an itinera.toml config file")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive planning conversation")]
    Chat,
    #[command(about = "Answer a single trip query and exit")]
    Ask { query: String },
    #[command(about = "Inspect effective configuration values with secret redaction")]
    Config,
    #[command(about = "Validate configuration and provider readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat => commands::chat::run(cli.config).await,
        Command::Ask { query } => commands::ask::run(cli.config, &query).await,
        Command::Config => commands::config::run(cli.config),
        Command::Doctor { json } => commands::doctor::run(cli.config, json),
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}
