use thiserror::Error;

/// Pipeline stage a provider failure was observed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Extraction,
    Retrieval,
    Recommendation,
    Synthesis,
    Explanation,
    Evaluation,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Retrieval => "retrieval",
            Self::Recommendation => "recommendation",
            Self::Synthesis => "synthesis",
            Self::Explanation => "explanation",
            Self::Evaluation => "evaluation",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Failures that abort a turn. Guard trips and structured-output parse
/// failures are designed outcomes, modeled as data elsewhere, never as
/// errors here.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("provider failure during {stage}: {message}")]
    Provider { stage: PipelineStage, message: String },
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl PipelineError {
    pub fn provider(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self::Provider { stage, message: message.into() }
    }

    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::Provider { stage, message } => InterfaceError::ServiceUnavailable {
                message: format!("{} provider failed: {message}", stage.as_str()),
                correlation_id,
            },
            Self::Configuration(message) => InterfaceError::Internal { message, correlation_id },
        }
    }
}

/// Turn-boundary error shape: what the conversation surface logs, with
/// a fixed user-safe message for the transcript.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable { .. } => {
                "I couldn't finish planning that trip just now. Please try again."
            }
            Self::Internal { .. } => "Something went wrong on my side. Please try again.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InterfaceError, PipelineError, PipelineStage};

    #[test]
    fn provider_failure_maps_to_service_unavailable() {
        let interface = PipelineError::provider(PipelineStage::Recommendation, "timeout")
            .into_interface("turn-1");

        assert!(matches!(
            interface,
            InterfaceError::ServiceUnavailable { ref correlation_id, .. }
                if correlation_id == "turn-1"
        ));
        assert_eq!(
            interface.user_message(),
            "I couldn't finish planning that trip just now. Please try again."
        );
    }

    #[test]
    fn configuration_failure_maps_to_internal() {
        let interface = PipelineError::Configuration("missing model name".to_string())
            .into_interface("turn-2");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.correlation_id(), "turn-2");
    }

    #[test]
    fn provider_error_names_its_stage() {
        let error = PipelineError::provider(PipelineStage::Synthesis, "connection refused");
        assert!(error.to_string().contains("synthesis"));
    }
}
