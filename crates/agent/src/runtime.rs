use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use itinera_core::domain::evaluation::EvaluationReport;
use itinera_core::errors::{PipelineError, PipelineStage};
use itinera_core::format::format_response;
use itinera_core::guard::{GuardPolicy, GuardedPayload};

use crate::evaluator::ResponseEvaluator;
use crate::explainer::ExplanationGenerator;
use crate::extractor::SlotExtractor;
use crate::itinerary::ItinerarySynthesizer;
use crate::llm::TextGenerator;
use crate::recommender::DestinationRecommender;
use crate::retrieval::PassageRetriever;
use crate::session::Session;

/// Terminal outcome of one turn, as seen by the conversation surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A guard tripped; the message is the advisory text.
    Refused { message: String },
    /// Formatted display markup, ready to render.
    Answered { response: String },
    /// A provider failed; the message is user-safe.
    Failed { message: String },
}

/// Owns the pipeline stages and drives one linear pass per turn. Data
/// flows strictly forward; no stage re-invokes an earlier one.
pub struct PlannerRuntime {
    guard: GuardPolicy,
    extractor: SlotExtractor,
    recommender: DestinationRecommender,
    synthesizer: ItinerarySynthesizer,
    explainer: ExplanationGenerator,
    evaluator: ResponseEvaluator,
}

impl PlannerRuntime {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        retriever: Arc<dyn PassageRetriever>,
        guard: GuardPolicy,
        top_k: usize,
    ) -> Self {
        Self {
            guard,
            extractor: SlotExtractor::new(generator.clone()),
            recommender: DestinationRecommender::new(generator.clone(), retriever, top_k),
            synthesizer: ItinerarySynthesizer::new(generator.clone()),
            explainer: ExplanationGenerator::new(generator.clone()),
            evaluator: ResponseEvaluator::new(generator),
        }
    }

    /// Runs one turn to completion, guard short-circuit, or failure.
    /// Provider failures are caught here and rendered user-safe; the
    /// user's message stays in the transcript either way.
    pub async fn handle_turn(&self, query: &str, session: &mut Session) -> TurnOutcome {
        let correlation_id = Uuid::new_v4().to_string();
        session.record_user(query);

        match self.run_pipeline(query, session, &correlation_id).await {
            Ok(outcome) => outcome,
            Err(error) => {
                let interface = error.into_interface(correlation_id.clone());
                warn!(
                    event_name = "pipeline.turn.failed",
                    correlation_id = %correlation_id,
                    error = %interface,
                    "turn aborted on provider failure"
                );
                let message = interface.user_message().to_string();
                session.record_assistant(&message);
                TurnOutcome::Failed { message }
            }
        }
    }

    async fn run_pipeline(
        &self,
        query: &str,
        session: &mut Session,
        correlation_id: &str,
    ) -> Result<TurnOutcome, PipelineError> {
        let (intent, incoming) = self
            .extractor
            .extract(query)
            .await
            .map_err(|error| PipelineError::provider(PipelineStage::Extraction, format!("{error:#}")))?;
        info!(
            event_name = "pipeline.extract.done",
            correlation_id,
            intent = intent.as_str(),
            "intent and slots extracted"
        );

        session.merge_slots(&incoming);

        let verdict = self.guard.screen_input(session.slots());
        if verdict.blocked {
            let message = verdict
                .payload
                .as_ref()
                .and_then(GuardedPayload::refusal_text)
                .unwrap_or("Travel to this location is restricted.")
                .to_string();
            info!(
                event_name = "pipeline.guard.input_blocked",
                correlation_id,
                "restricted destination refused"
            );
            session.record_assistant(&message);
            return Ok(TurnOutcome::Refused { message });
        }

        let recommendation = self.recommender.recommend(session.slots()).await.map_err(|error| {
            PipelineError::provider(PipelineStage::Recommendation, format!("{error:#}"))
        })?;
        info!(event_name = "pipeline.recommend.done", correlation_id, "recommendation generated");

        let itinerary = self
            .synthesizer
            .synthesize(&recommendation, session.slots())
            .await
            .map_err(|error| PipelineError::provider(PipelineStage::Synthesis, format!("{error:#}")))?;
        info!(
            event_name = "pipeline.synthesize.done",
            correlation_id,
            structured = itinerary.day_count().is_some(),
            "itinerary generated"
        );

        let explanation = self
            .explainer
            .explain(&itinerary, session.slots())
            .await
            .map_err(|error| PipelineError::provider(PipelineStage::Explanation, format!("{error:#}")))?;
        info!(event_name = "pipeline.explain.done", correlation_id, "explanation generated");

        let verdict = self.guard.screen_output(GuardedPayload::new(itinerary, explanation));
        if verdict.blocked {
            info!(
                event_name = "pipeline.guard.output_blocked",
                correlation_id,
                "sensitive topic scrubbed from response"
            );
        }
        let guarded = verdict.payload.unwrap_or_else(|| {
            GuardedPayload::refusal("I'm not authorized to provide sensitive or financial advice.")
        });

        let response = format_response(&guarded);
        session.record_assistant(&response);

        self.observe_quality(&response, correlation_id).await;

        if verdict.blocked {
            Ok(TurnOutcome::Refused { message: response })
        } else {
            Ok(TurnOutcome::Answered { response })
        }
    }

    /// Telemetry only: a failed or unparsable evaluation never touches
    /// the already-recorded response.
    async fn observe_quality(&self, response: &str, correlation_id: &str) {
        match self.evaluator.evaluate(response).await {
            Ok(EvaluationReport::Scored(scores)) => info!(
                event_name = "pipeline.evaluate.done",
                correlation_id,
                relevance = scores.relevance,
                completeness = scores.completeness,
                correctness = scores.correctness,
                clarity = scores.clarity,
                safety = scores.safety,
                feedback = %scores.overall_feedback,
                "response evaluated"
            ),
            Ok(EvaluationReport::Unparsed(raw)) => info!(
                event_name = "pipeline.evaluate.unparsed",
                correlation_id,
                raw = %raw,
                "evaluation output kept as raw text"
            ),
            Err(error) => warn!(
                event_name = "pipeline.evaluate.failed",
                correlation_id,
                error = %error,
                "evaluation provider failed, continuing"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use itinera_core::guard::GuardPolicy;

    use super::{PlannerRuntime, TurnOutcome};
    use crate::llm::{CompletionOptions, TextGenerator};
    use crate::retrieval::{Passage, PassageRetriever};
    use crate::session::{Role, Session};

    /// Pops one scripted completion per call and records every prompt.
    struct ScriptedGenerator {
        script: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<&str>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into_iter().map(str::to_string).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, prompt: &str, _options: CompletionOptions) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow!("generation script exhausted"))
        }
    }

    struct StaticRetriever {
        passages: Vec<Passage>,
        calls: AtomicUsize,
    }

    impl StaticRetriever {
        fn with_one_passage() -> Arc<Self> {
            Arc::new(Self {
                passages: vec![Passage {
                    content: "Udaipur: City Palace, Lake Pichola, monsoon palace views."
                        .to_string(),
                    metadata: serde_json::Value::Null,
                }],
                calls: AtomicUsize::new(0),
            })
        }

        fn empty() -> Arc<Self> {
            Arc::new(Self { passages: Vec::new(), calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl PassageRetriever for StaticRetriever {
        async fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<Passage>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.passages.clone())
        }
    }

    const EXTRACTION_UDAIPUR: &str = r#"{"intent": "destination_info",
        "destination": "Udaipur", "budget": "moderate",
        "trip_type": "honeymoon", "days": "3"}"#;

    const ITINERARY_3_DAYS: &str = r#"{
        "day_1": {"activities": ["City Palace", "Lake Pichola boat ride"],
                  "stay": "lakeside heritage hotel", "description": "old city day"},
        "day_2": {"activities": ["Monsoon Palace", "local market"],
                  "stay": "lakeside heritage hotel", "description": "hill and bazaar day"},
        "day_3": {"activities": ["Saheliyon-ki-Bari", "sunset cruise"],
                  "stay": "lakeside heritage hotel", "description": "slow final day"}
    }"#;

    const EVALUATION_OK: &str = r#"{"relevance": 5, "completeness": 5, "correctness": 4,
        "clarity": 5, "safety": 5, "overall_feedback": "covers all days"}"#;

    fn runtime(
        generator: Arc<ScriptedGenerator>,
        retriever: Arc<StaticRetriever>,
    ) -> PlannerRuntime {
        PlannerRuntime::new(generator, retriever, GuardPolicy::default(), 5)
    }

    #[tokio::test]
    async fn honeymoon_query_runs_the_full_pipeline() {
        let generator = ScriptedGenerator::new(vec![
            EXTRACTION_UDAIPUR,
            "Udaipur suits a moderate honeymoon: palaces, lakes, heritage stays.",
            ITINERARY_3_DAYS,
            "- Fits the moderate budget.\n- Lakeside stays suit a honeymoon.",
            EVALUATION_OK,
        ]);
        let retriever = StaticRetriever::with_one_passage();
        let runtime = runtime(generator.clone(), retriever.clone());
        let mut session = Session::new();

        let outcome = runtime
            .handle_turn("3 day honeymoon trip to Udaipur, moderate budget", &mut session)
            .await;

        let TurnOutcome::Answered { response } = outcome else {
            panic!("expected an answered turn");
        };
        assert!(response.contains("Day 1"));
        assert!(response.contains("Day 2"));
        assert!(response.contains("Day 3"));
        assert!(response.contains("Why These Suggestions?"));

        // slot memory was updated from the extraction
        assert_eq!(session.slots().destination.as_deref(), Some("Udaipur"));
        assert_eq!(session.slots().trip_type.as_deref(), Some("honeymoon"));

        // transcript holds both turns, assistant last
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role, Role::Assistant);
        assert_eq!(transcript[1].text, response);

        // extraction + recommendation + synthesis + explanation + evaluation
        assert_eq!(generator.call_count(), 5);
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn restricted_destination_short_circuits_before_generation() {
        let generator = ScriptedGenerator::new(vec![
            r#"{"intent": "destination_info", "destination": "North Korea",
                "budget": "moderate", "trip_type": "general", "days": "4"}"#,
        ]);
        let retriever = StaticRetriever::with_one_passage();
        let runtime = runtime(generator.clone(), retriever.clone());
        let mut session = Session::new();

        let outcome = runtime.handle_turn("4 days in North Korea?", &mut session).await;

        let TurnOutcome::Refused { message } = outcome else {
            panic!("expected a refused turn");
        };
        assert!(message.contains("restricted"));

        // only the extraction call happened; recommender, synthesizer,
        // explainer, and evaluator were never invoked
        assert_eq!(generator.call_count(), 1);
        assert_eq!(retriever.calls.load(Ordering::SeqCst), 0);

        // the refusal is the assistant's transcript turn
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].text, message);
    }

    #[tokio::test]
    async fn sensitive_output_is_replaced_by_the_fixed_refusal() {
        let generator = ScriptedGenerator::new(vec![
            EXTRACTION_UDAIPUR,
            "Udaipur works well.",
            ITINERARY_3_DAYS,
            "Remember to carry your credit card for deposits.",
            EVALUATION_OK,
        ]);
        let runtime = runtime(generator, StaticRetriever::with_one_passage());
        let mut session = Session::new();

        let outcome = runtime.handle_turn("Udaipur for 3 days", &mut session).await;

        let TurnOutcome::Refused { message } = outcome else {
            panic!("expected a refused turn");
        };
        assert!(message.contains("not authorized"));
        assert!(!message.contains("Day 1"));
    }

    #[tokio::test]
    async fn empty_retrieval_still_answers_via_fallback() {
        let generator = ScriptedGenerator::new(vec![
            EXTRACTION_UDAIPUR,
            "From general knowledge: Udaipur has lakes and palaces.",
            ITINERARY_3_DAYS,
            "- Matches the stated preferences.",
            EVALUATION_OK,
        ]);
        let runtime = runtime(generator, StaticRetriever::empty());
        let mut session = Session::new();

        let outcome = runtime.handle_turn("Udaipur honeymoon", &mut session).await;
        assert!(matches!(outcome, TurnOutcome::Answered { .. }));
    }

    #[tokio::test]
    async fn unparsable_itinerary_degrades_but_still_answers() {
        let generator = ScriptedGenerator::new(vec![
            EXTRACTION_UDAIPUR,
            "Udaipur works well.",
            "Day 1 you could wander, day 2 maybe a boat?",
            "- Loose plan on purpose.",
            EVALUATION_OK,
        ]);
        let runtime = runtime(generator, StaticRetriever::with_one_passage());
        let mut session = Session::new();

        let outcome = runtime.handle_turn("Udaipur for 3 days", &mut session).await;
        let TurnOutcome::Answered { response } = outcome else {
            panic!("expected an answered turn");
        };
        assert!(response.contains("Day 1 you could wander"));
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_user_safe_message() {
        // script covers extraction only; the recommendation call fails
        let generator = ScriptedGenerator::new(vec![EXTRACTION_UDAIPUR]);
        let runtime = runtime(generator, StaticRetriever::with_one_passage());
        let mut session = Session::new();

        let outcome = runtime.handle_turn("Udaipur please", &mut session).await;

        let TurnOutcome::Failed { message } = outcome else {
            panic!("expected a failed turn");
        };
        assert!(!message.contains("script exhausted"));

        // user turn is preserved and the failure is the assistant turn
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[1].text, message);
    }

    #[tokio::test]
    async fn evaluation_failure_never_affects_the_answer() {
        // script ends before the evaluation call
        let generator = ScriptedGenerator::new(vec![
            EXTRACTION_UDAIPUR,
            "Udaipur works well.",
            ITINERARY_3_DAYS,
            "- Sensible plan.",
        ]);
        let runtime = runtime(generator, StaticRetriever::with_one_passage());
        let mut session = Session::new();

        let outcome = runtime.handle_turn("Udaipur for 3 days", &mut session).await;
        assert!(matches!(outcome, TurnOutcome::Answered { .. }));
    }

    #[tokio::test]
    async fn slots_persist_into_the_next_turn() {
        let generator = ScriptedGenerator::new(vec![
            EXTRACTION_UDAIPUR,
            "Udaipur works well.",
            ITINERARY_3_DAYS,
            "- Sensible plan.",
            EVALUATION_OK,
            // second turn: extraction mentions only a budget change
            r#"{"intent": "budget", "destination": "", "budget": "luxury",
                "trip_type": "", "days": ""}"#,
            "Luxury Udaipur: palace hotels.",
            ITINERARY_3_DAYS,
            "- Upgraded stays.",
            EVALUATION_OK,
        ]);
        let runtime = runtime(generator, StaticRetriever::with_one_passage());
        let mut session = Session::new();

        runtime.handle_turn("3 day honeymoon trip to Udaipur", &mut session).await;
        runtime.handle_turn("make it luxury instead", &mut session).await;

        // destination survived, budget was overwritten
        assert_eq!(session.slots().destination.as_deref(), Some("Udaipur"));
        assert_eq!(session.slots().budget.as_deref(), Some("luxury"));
    }
}
