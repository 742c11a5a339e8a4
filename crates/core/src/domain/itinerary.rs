use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// One day of a structured itinerary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub activities: Vec<String>,
    pub stay: String,
    pub description: String,
}

/// Day-by-day plan, or the raw provider text when strict parsing of the
/// structured form failed. Consumers must branch on the variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Itinerary {
    /// Ordered, 1-indexed day plans.
    Structured(Vec<DayPlan>),
    /// Soft-degrade: the provider's unparsable output, verbatim.
    Raw(String),
}

impl Itinerary {
    pub fn day_count(&self) -> Option<usize> {
        match self {
            Self::Structured(days) => Some(days.len()),
            Self::Raw(_) => None,
        }
    }

    /// Readable multi-line rendering used for explanation prompts and
    /// output-guard scanning.
    pub fn to_display_text(&self) -> String {
        match self {
            Self::Structured(days) => {
                let mut text = String::new();
                for (index, day) in days.iter().enumerate() {
                    let _ = writeln!(text, "Day {}:", index + 1);
                    if !day.activities.is_empty() {
                        let _ = writeln!(text, "  Activities: {}", day.activities.join(", "));
                    }
                    if !day.stay.trim().is_empty() {
                        let _ = writeln!(text, "  Stay: {}", day.stay);
                    }
                    if !day.description.trim().is_empty() {
                        let _ = writeln!(text, "  Description: {}", day.description);
                    }
                }
                text.trim_end().to_string()
            }
            Self::Raw(text) => text.trim().to_string(),
        }
    }
}

/// Explanation text in whichever shape survived the provider boundary.
/// The formatter must render every variant without failing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExplanationBody {
    Text(String),
    Bullets(Vec<String>),
    Sections(BTreeMap<String, String>),
}
