use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use itinera_core::domain::slots::SlotSet;

use crate::llm::{CompletionOptions, TextGenerator};
use crate::retrieval::{Passage, PassageRetriever};

/// Free-text recommendation plus the query that produced it. Immutable
/// once produced; input to itinerary synthesis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendationResult {
    pub query: String,
    pub result: String,
}

/// Retrieval-augmented destination recommendation. Zero retrieved
/// passages skips augmentation entirely and falls back to direct model
/// knowledge; this binary branch is deliberate.
pub struct DestinationRecommender {
    generator: Arc<dyn TextGenerator>,
    retriever: Arc<dyn PassageRetriever>,
    top_k: usize,
}

impl DestinationRecommender {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        retriever: Arc<dyn PassageRetriever>,
        top_k: usize,
    ) -> Self {
        Self { generator, retriever, top_k }
    }

    pub async fn recommend(&self, slots: &SlotSet) -> Result<RecommendationResult> {
        let query = recommendation_query(slots);
        let passages = self.retriever.retrieve(&query, self.top_k).await?;

        let result = if passages.is_empty() {
            info!(
                event_name = "pipeline.recommend.retrieval_fallback",
                "no passages retrieved, answering from model knowledge"
            );
            self.generator.complete(&query, CompletionOptions::EXPLORATORY).await?
        } else {
            info!(
                event_name = "pipeline.recommend.augmented",
                passage_count = passages.len(),
                "answering with retrieved context"
            );
            let prompt = augmented_prompt(&query, &passages);
            self.generator.complete(&prompt, CompletionOptions::EXPLORATORY).await?
        };

        Ok(RecommendationResult { query, result })
    }
}

fn recommendation_query(slots: &SlotSet) -> String {
    format!(
        "Recommend cities, activities, hotels to stay with clear budget and some buffer \
         for a {trip_type} trip in {destination} within {budget} and {days} days.",
        trip_type = slots.trip_type(),
        destination = slots.destination(),
        budget = slots.budget(),
        days = slots.days_or_default(),
    )
}

fn augmented_prompt(query: &str, passages: &[Passage]) -> String {
    let context = passages
        .iter()
        .map(|passage| passage.content.trim())
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Answer the travel question using the context below. Prefer details from the \
         context; fill gaps from general knowledge only when the context is silent.\n\
         \n\
         Context:\n{context}\n\
         \n\
         Question: {query}"
    )
}
