use std::sync::Arc;

use anyhow::Result;

use itinera_core::domain::itinerary::Itinerary;
use itinera_core::domain::slots::SlotSet;

use crate::llm::{CompletionOptions, TextGenerator};

/// Produces the rationale narrative justifying an itinerary against the
/// stored preferences. Callers always receive trimmed plain text.
pub struct ExplanationGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl ExplanationGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn explain(&self, itinerary: &Itinerary, preferences: &SlotSet) -> Result<String> {
        let prompt = explanation_prompt(itinerary, preferences);
        let response = self
            .generator
            .complete(&prompt, CompletionOptions::with_temperature(0.3))
            .await?;
        Ok(response.trim().to_string())
    }
}

fn explanation_prompt(itinerary: &Itinerary, preferences: &SlotSet) -> String {
    format!(
        "You are an ethical travel assistant. Based on the following user \
         preferences and itinerary, explain why these destinations and \
         activities were chosen.\n\
         \n\
         Be concise and justify each element of the plan, in bullet form, in terms of:\n\
         - budget\n\
         - activity type\n\
         - travel style (solo/family/adventure/etc.)\n\
         - proximity\n\
         - uniqueness or cultural value\n\
         \n\
         User Preferences:\n{preferences}\n\
         \n\
         Itinerary:\n{itinerary}\n\
         \n\
         Explanation:",
        preferences = preferences.as_preference_string(),
        itinerary = itinerary.to_display_text(),
    )
}
