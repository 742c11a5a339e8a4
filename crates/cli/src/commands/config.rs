use std::path::PathBuf;

use serde::Serialize;

use itinera_core::config::{AppConfig, LoadOptions};

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
pub struct ConfigView {
    llm: LlmView,
    retrieval: RetrievalView,
    logging: LoggingView,
}

#[derive(Debug, Serialize)]
struct LlmView {
    provider: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
    api_key: &'static str,
}

#[derive(Debug, Serialize)]
struct RetrievalView {
    index_name: String,
    base_url: String,
    top_k: usize,
    api_key: &'static str,
}

#[derive(Debug, Serialize)]
struct LoggingView {
    level: String,
    format: String,
}

/// Renders the effective configuration as JSON with secrets redacted.
pub fn run(config_path: Option<PathBuf>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions { config_path, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure("config", "config", error.to_string(), 2),
    };

    let view = view_of(&config);
    match serde_json::to_string_pretty(&view) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("config", "serialization", error.to_string(), 2),
    }
}

pub fn view_of(config: &AppConfig) -> ConfigView {
    ConfigView {
        llm: LlmView {
            provider: format!("{:?}", config.llm.provider).to_lowercase(),
            base_url: config.llm.base_url.clone(),
            model: config.llm.model.clone(),
            timeout_secs: config.llm.timeout_secs,
            api_key: redacted(config.llm.api_key.is_some()),
        },
        retrieval: RetrievalView {
            index_name: config.retrieval.index_name.clone(),
            base_url: config.retrieval.base_url.clone(),
            top_k: config.retrieval.top_k,
            api_key: redacted(config.retrieval.api_key.is_some()),
        },
        logging: LoggingView {
            level: config.logging.level.clone(),
            format: format!("{:?}", config.logging.format).to_lowercase(),
        },
    }
}

fn redacted(set: bool) -> &'static str {
    if set {
        "<redacted>"
    } else {
        "<unset>"
    }
}
