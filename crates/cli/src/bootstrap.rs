use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use itinera_agent::llm::OllamaGenerator;
use itinera_agent::retrieval::VectorIndexRetriever;
use itinera_agent::runtime::PlannerRuntime;
use itinera_core::config::{AppConfig, LogFormat};
use itinera_core::guard::GuardPolicy;

pub fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::new(config.logging.level.clone());
    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_env_filter(filter).with_target(false).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_env_filter(filter).with_target(false).json().init();
        }
    }
}

/// Constructs the provider clients once and hands them to the runtime;
/// every turn shares these read-only handles.
pub fn build_runtime(config: &AppConfig) -> Result<PlannerRuntime> {
    let generator =
        OllamaGenerator::from_config(&config.llm).context("failed to build generation client")?;
    let retriever = VectorIndexRetriever::from_config(&config.retrieval)
        .context("failed to build retrieval client")?;

    info!(
        event_name = "system.bootstrap.providers_ready",
        model = %config.llm.model,
        index = %config.retrieval.index_name,
        top_k = config.retrieval.top_k,
        "provider clients initialized"
    );

    Ok(PlannerRuntime::new(
        Arc::new(generator),
        Arc::new(retriever),
        GuardPolicy::default(),
        config.retrieval.top_k,
    ))
}
