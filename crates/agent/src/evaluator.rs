use std::sync::Arc;

use anyhow::Result;
use tracing::warn;

use itinera_core::domain::evaluation::{EvaluationReport, EvaluationScores};

use crate::llm::{CompletionOptions, TextGenerator};

/// Scores a formatted response against a fixed rubric. Observational
/// only: the report is logged, never shown to the user and never fed
/// back into any other stage. Parse failure degrades to `Unparsed`.
pub struct ResponseEvaluator {
    generator: Arc<dyn TextGenerator>,
}

impl ResponseEvaluator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn evaluate(&self, formatted_response: &str) -> Result<EvaluationReport> {
        let prompt = evaluation_prompt(formatted_response);
        let response = self.generator.complete(&prompt, CompletionOptions::DETERMINISTIC).await?;

        match serde_json::from_str::<EvaluationScores>(&response) {
            Ok(scores) => Ok(EvaluationReport::Scored(scores)),
            Err(_) => {
                warn!(
                    event_name = "pipeline.evaluate.parse_fallback",
                    "evaluation output was not JSON, keeping raw text"
                );
                Ok(EvaluationReport::Unparsed(response))
            }
        }
    }
}

fn evaluation_prompt(response: &str) -> String {
    format!(
        "You are a strict travel planner evaluator. Given the following response:\n\
         \n\
         {response}\n\
         \n\
         Evaluate it on these criteria (score 1-5):\n\
         - Relevance (addresses the user's query only)\n\
         - Completeness (covers all days and has activities, stay, description)\n\
         - Correctness (logical, feasible travel plan)\n\
         - Clarity (easy to read and structured)\n\
         - Safety (no unsafe or inappropriate suggestions)\n\
         \n\
         Return output ONLY in JSON:\n\
         {{\n\
           \"relevance\": score,\n\
           \"completeness\": score,\n\
           \"correctness\": score,\n\
           \"clarity\": score,\n\
           \"safety\": score,\n\
           \"overall_feedback\": \"short feedback\"\n\
         }}"
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;

    use itinera_core::domain::evaluation::EvaluationReport;

    use super::ResponseEvaluator;
    use crate::llm::{CompletionOptions, TextGenerator};

    struct FixedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn complete(&self, _prompt: &str, _options: CompletionOptions) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn well_formed_scores_parse() {
        let evaluator = ResponseEvaluator::new(Arc::new(FixedGenerator(
            r#"{"relevance": 5, "completeness": 4, "correctness": 4,
                "clarity": 5, "safety": 5, "overall_feedback": "solid plan"}"#,
        )));

        let report = evaluator.evaluate("### Your Travel Itinerary...").await.unwrap();
        let EvaluationReport::Scored(scores) = report else {
            panic!("expected scored report");
        };
        assert_eq!(scores.relevance, 5);
        assert_eq!(scores.overall_feedback, "solid plan");
    }

    #[tokio::test]
    async fn non_json_output_degrades_to_unparsed() {
        let evaluator =
            ResponseEvaluator::new(Arc::new(FixedGenerator("Looks good to me, 4 stars.")));

        let report = evaluator.evaluate("anything").await.unwrap();
        assert_eq!(report, EvaluationReport::Unparsed("Looks good to me, 4 stars.".to_string()));
    }
}
