use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use itinera_agent::runtime::TurnOutcome;
use itinera_agent::session::Session;
use itinera_core::config::{AppConfig, LoadOptions};

use crate::bootstrap;
use crate::commands::CommandResult;

/// Interactive conversation surface. The session is owned here and
/// turns are submitted strictly one at a time.
pub async fn run(config_path: Option<PathBuf>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions { config_path, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("chat", "config", error.to_string(), 2),
    };
    bootstrap::init_tracing(&config);

    let runtime = match bootstrap::build_runtime(&config) {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::failure("chat", "bootstrap", format!("{error:#}"), 2),
    };

    let mut session = Session::new();
    println!("itinera ready. Describe a trip, `:reset` to start over, `:quit` to exit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("you> ");
        let _ = io::stdout().flush();

        let Some(Ok(line)) = lines.next() else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            ":quit" | ":q" => break,
            ":reset" => {
                session.reset();
                println!("(conversation reset)");
                continue;
            }
            _ => {}
        }

        match runtime.handle_turn(line, &mut session).await {
            TurnOutcome::Answered { response } => println!("\n{response}\n"),
            TurnOutcome::Refused { message } => println!("\n{message}\n"),
            TurnOutcome::Failed { message } => println!("\n{message}\n"),
        }
    }

    CommandResult { exit_code: 0, output: String::new() }
}
