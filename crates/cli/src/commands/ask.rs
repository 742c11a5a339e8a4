use std::path::PathBuf;

use itinera_agent::runtime::TurnOutcome;
use itinera_agent::session::Session;
use itinera_core::config::{AppConfig, LoadOptions};

use crate::bootstrap;
use crate::commands::CommandResult;

/// One-shot query: run a single turn against a fresh session and print
/// the rendered response.
pub async fn run(config_path: Option<PathBuf>, query: &str) -> CommandResult {
    let config = match AppConfig::load(LoadOptions { config_path, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("ask", "config", error.to_string(), 2),
    };
    bootstrap::init_tracing(&config);

    let runtime = match bootstrap::build_runtime(&config) {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("ask", "bootstrap", format!("{error:#}"), 2),
    };

    let mut session = Session::new();
    match runtime.handle_turn(query, &mut session).await {
        TurnOutcome::Answered { response } => CommandResult { exit_code: 0, output: response },
        TurnOutcome::Refused { message } => CommandResult { exit_code: 0, output: message },
        TurnOutcome::Failed { message } => CommandResult { exit_code: 1, output: message },
    }
}
