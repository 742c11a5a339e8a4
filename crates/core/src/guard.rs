use crate::domain::itinerary::{ExplanationBody, Itinerary};
use crate::domain::slots::SlotSet;

/// Payload that survived (or replaced) guarding; input to the formatter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardedPayload {
    pub itinerary: Itinerary,
    pub explanation: Option<ExplanationBody>,
}

impl GuardedPayload {
    pub fn new(itinerary: Itinerary, explanation: String) -> Self {
        Self { itinerary, explanation: Some(ExplanationBody::Text(explanation)) }
    }

    /// Fixed refusal shape: both fields replaced by the advisory text.
    pub fn refusal(message: impl Into<String>) -> Self {
        Self { itinerary: Itinerary::Raw(message.into()), explanation: None }
    }

    /// The advisory text of a refusal payload, for transcript recording.
    pub fn refusal_text(&self) -> Option<&str> {
        match (&self.itinerary, &self.explanation) {
            (Itinerary::Raw(message), None) => Some(message),
            _ => None,
        }
    }
}

/// Unified verdict for both guards. Invariant: `blocked` implies
/// `payload` carries the refusal; an output-guard pass carries the
/// original payload unchanged, an input-guard pass carries none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardVerdict {
    pub blocked: bool,
    pub payload: Option<GuardedPayload>,
}

impl GuardVerdict {
    fn pass() -> Self {
        Self { blocked: false, payload: None }
    }

    fn pass_through(payload: GuardedPayload) -> Self {
        Self { blocked: false, payload: Some(payload) }
    }

    fn refuse(payload: GuardedPayload) -> Self {
        Self { blocked: true, payload: Some(payload) }
    }
}

/// Restricted-destination and sensitive-topic screening.
///
/// Both checks are plain case-insensitive substring containment, not
/// place-name resolution: aliases, misspellings, and substrings inside
/// unrelated names are accepted trade-offs of the fixed lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardPolicy {
    restricted_places: Vec<String>,
    sensitive_keywords: Vec<String>,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            restricted_places: ["north korea", "gaza", "syria"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            sensitive_keywords: [
                "visa",
                "passport",
                "credit card",
                "insurance",
                "loan",
                "bank account",
                "money transfer",
                "legal",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl GuardPolicy {
    pub fn new(restricted_places: Vec<String>, sensitive_keywords: Vec<String>) -> Self {
        Self {
            restricted_places: restricted_places
                .into_iter()
                .map(|entry| entry.to_lowercase())
                .collect(),
            sensitive_keywords: sensitive_keywords
                .into_iter()
                .map(|entry| entry.to_lowercase())
                .collect(),
        }
    }

    /// Screens merged slots before any generation happens. A blocked
    /// verdict terminates the turn with the refusal as the response.
    pub fn screen_input(&self, slots: &SlotSet) -> GuardVerdict {
        let Some(destination) = slots.destination.as_deref() else {
            return GuardVerdict::pass();
        };

        let lowered = destination.to_lowercase();
        let tripped =
            self.restricted_places.iter().any(|place| lowered.contains(place.as_str()));
        if tripped {
            return GuardVerdict::refuse(GuardedPayload::refusal(format!(
                "Travel to {destination} is restricted. Please choose another destination."
            )));
        }
        GuardVerdict::pass()
    }

    /// Scans itinerary + explanation text after generation. A match
    /// replaces the whole payload with the fixed advisory.
    pub fn screen_output(&self, payload: GuardedPayload) -> GuardVerdict {
        let mut haystack = payload.itinerary.to_display_text();
        if let Some(explanation) = &payload.explanation {
            haystack.push('\n');
            haystack.push_str(&explanation_text(explanation));
        }
        let lowered = haystack.to_lowercase();

        let tripped =
            self.sensitive_keywords.iter().any(|keyword| lowered.contains(keyword.as_str()));
        if tripped {
            return GuardVerdict::refuse(GuardedPayload::refusal(
                "I'm not authorized to provide sensitive or financial advice.",
            ));
        }
        GuardVerdict::pass_through(payload)
    }
}

fn explanation_text(explanation: &ExplanationBody) -> String {
    match explanation {
        ExplanationBody::Text(text) => text.clone(),
        ExplanationBody::Bullets(items) => items.join("\n"),
        ExplanationBody::Sections(sections) => sections
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
