use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::warn;

use itinera_core::domain::itinerary::{DayPlan, Itinerary};
use itinera_core::domain::slots::SlotSet;

use crate::llm::{CompletionOptions, TextGenerator};
use crate::recommender::RecommendationResult;

/// Generates the structured day-by-day plan, degrading to the raw
/// provider text when strict parsing fails.
pub struct ItinerarySynthesizer {
    generator: Arc<dyn TextGenerator>,
}

impl ItinerarySynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn synthesize(
        &self,
        recommendation: &RecommendationResult,
        slots: &SlotSet,
    ) -> Result<Itinerary> {
        let days = slots.days_or_default();
        let prompt = synthesis_prompt(recommendation, slots, days);
        let response = self.generator.complete(&prompt, CompletionOptions::EXPLORATORY).await?;
        Ok(parse_itinerary(&response, days as usize))
    }
}

fn synthesis_prompt(recommendation: &RecommendationResult, slots: &SlotSet, days: u32) -> String {
    let day_keys = (1..=days).map(|day| format!("day_{day}")).collect::<Vec<_>>().join(", ");
    format!(
        "You are a helpful travel planner.\n\
         \n\
         Generate a {days}-day travel itinerary based on the recommendation and \
         preferences below. Stay within the recommended destination; do NOT \
         introduce unrelated destinations.\n\
         \n\
         Respond ONLY in this JSON format, with exactly the keys {day_keys}:\n\
         {{\n\
           \"day_1\": {{\n\
             \"activities\": [\"<activity>\", \"<activity>\"],\n\
             \"stay\": \"<where to stay>\",\n\
             \"description\": \"<one-paragraph summary of the day>\"\n\
           }}\n\
         }}\n\
         \n\
         Recommendation: {recommendation}\n\
         Traveller preferences: {preferences}",
        recommendation = recommendation.result,
        preferences = slots.as_preference_string(),
    )
}

/// Strict parse of `day_1..day_N` entries. Surplus days beyond the
/// requested count are truncated; a deficit is kept and logged. Any
/// parse failure returns the raw text unchanged.
fn parse_itinerary(response: &str, requested_days: usize) -> Itinerary {
    let Ok(parsed) = serde_json::from_str::<Value>(response) else {
        warn!(
            event_name = "pipeline.synthesize.parse_fallback",
            "itinerary output was not JSON, keeping raw text"
        );
        return Itinerary::Raw(response.to_string());
    };
    let Some(entries) = parsed.as_object() else {
        warn!(
            event_name = "pipeline.synthesize.parse_fallback",
            "itinerary output was not an object, keeping raw text"
        );
        return Itinerary::Raw(response.to_string());
    };

    let mut days = Vec::new();
    for index in 1.. {
        let Some(entry) = entries.get(&format!("day_{index}")) else {
            break;
        };
        match serde_json::from_value::<DayPlan>(entry.clone()) {
            Ok(plan) => days.push(plan),
            Err(_) => return Itinerary::Raw(response.to_string()),
        }
    }

    if days.is_empty() {
        return Itinerary::Raw(response.to_string());
    }

    if days.len() > requested_days {
        warn!(
            event_name = "pipeline.synthesize.day_count_truncated",
            requested = requested_days,
            returned = days.len(),
            "provider returned surplus days, truncating"
        );
        days.truncate(requested_days);
    } else if days.len() < requested_days {
        warn!(
            event_name = "pipeline.synthesize.day_count_short",
            requested = requested_days,
            returned = days.len(),
            "provider returned fewer days than requested"
        );
    }

    Itinerary::Structured(days)
}
