use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::warn;

use itinera_core::domain::slots::{
    Intent, PartialSlotSet, DEFAULT_BUDGET, DEFAULT_DESTINATION, DEFAULT_TRIP_TYPE,
};

use crate::llm::{CompletionOptions, TextGenerator};

const FALLBACK_DAYS: &str = "3";

/// Turns raw query text into an intent tag plus partial slots via a
/// structured-output prompt. Parse failure never reaches the caller:
/// the deterministic fallback slot set is substituted instead.
pub struct SlotExtractor {
    generator: Arc<dyn TextGenerator>,
}

impl SlotExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn extract(&self, query: &str) -> Result<(Intent, PartialSlotSet)> {
        let prompt = extraction_prompt(query);
        let response = self.generator.complete(&prompt, CompletionOptions::DETERMINISTIC).await?;
        Ok(parse_extraction(&response))
    }
}

fn extraction_prompt(query: &str) -> String {
    format!(
        "You are a travel assistant. Classify the user's intent \
         (destination_info / activity / budget / general) and extract the \
         following fields from their query:\n\
         \n\
         - intent (one of: destination_info, activity, budget, general)\n\
         - destination (e.g., Goa, Udaipur)\n\
         - budget (low / moderate / luxury or a currency range)\n\
         - trip_type (e.g., honeymoon, adventure, family)\n\
         - days (number of travel days)\n\
         \n\
         Output must be valid JSON like this:\n\
         {{\n\
           \"intent\": \"...\",\n\
           \"destination\": \"...\",\n\
           \"budget\": \"...\",\n\
           \"trip_type\": \"...\",\n\
           \"days\": \"...\"\n\
         }}\n\
         \n\
         If any field is not clearly stated, make a best guess.\n\
         \n\
         Respond ONLY with JSON. Do NOT include any text outside this format.\n\
         \n\
         {query}"
    )
}

/// Every field carries a default so downstream stages never observe a
/// missing key. Non-JSON output falls back wholesale.
fn parse_extraction(response: &str) -> (Intent, PartialSlotSet) {
    let Ok(parsed) = serde_json::from_str::<Value>(response) else {
        warn!(event_name = "pipeline.extract.parse_fallback", "extraction output was not JSON");
        return fallback();
    };
    let Some(fields) = parsed.as_object() else {
        warn!(event_name = "pipeline.extract.parse_fallback", "extraction output was not an object");
        return fallback();
    };

    let intent = fields
        .get("intent")
        .and_then(Value::as_str)
        .and_then(Intent::from_label)
        .unwrap_or(Intent::Recommend);

    let slots = PartialSlotSet {
        destination: Some(field_string(fields.get("destination"), DEFAULT_DESTINATION)),
        budget: Some(field_string(fields.get("budget"), DEFAULT_BUDGET)),
        trip_type: Some(field_string(fields.get("trip_type"), DEFAULT_TRIP_TYPE)),
        days: Some(field_string(fields.get("days"), FALLBACK_DAYS)),
    };

    (intent, slots)
}

/// Defaults substitute for absent or non-scalar fields only. A present
/// but empty string is kept as-is; the merge step's non-empty rule then
/// preserves whatever the slot store already knows.
fn field_string(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Number(number)) => number.to_string(),
        _ => default.to_string(),
    }
}

fn fallback() -> (Intent, PartialSlotSet) {
    (
        Intent::Recommend,
        PartialSlotSet {
            destination: Some(DEFAULT_DESTINATION.to_string()),
            budget: Some(DEFAULT_BUDGET.to_string()),
            trip_type: Some(DEFAULT_TRIP_TYPE.to_string()),
            days: Some(FALLBACK_DAYS.to_string()),
        },
    )
}
