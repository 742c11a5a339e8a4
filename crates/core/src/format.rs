use std::fmt::Write as _;

use crate::domain::itinerary::{ExplanationBody, Itinerary};
use crate::guard::GuardedPayload;

/// Renders a guarded payload as display markdown. Pure and total: every
/// itinerary and explanation shape renders without failing.
pub fn format_response(payload: &GuardedPayload) -> String {
    let mut formatted = String::new();

    formatted.push_str("### Your Travel Itinerary\n");
    match &payload.itinerary {
        Itinerary::Structured(days) => {
            for (index, day) in days.iter().enumerate() {
                let _ = writeln!(formatted, "**Day {}**", index + 1);
                if !day.activities.is_empty() {
                    let _ = writeln!(formatted, "- Activities: {}", day.activities.join(", "));
                }
                if !day.stay.trim().is_empty() {
                    let _ = writeln!(formatted, "- Stay: {}", day.stay.trim());
                }
                if !day.description.trim().is_empty() {
                    let _ = writeln!(formatted, "- {}", day.description.trim());
                }
                formatted.push('\n');
            }
        }
        Itinerary::Raw(text) => {
            formatted.push_str(text.trim());
            formatted.push_str("\n\n");
        }
    }

    if let Some(explanation) = &payload.explanation {
        let body = render_explanation(explanation);
        if !body.is_empty() {
            formatted.push_str("---\n");
            formatted.push_str("### Why These Suggestions?\n");
            formatted.push_str(&body);
            formatted.push('\n');
        }
    }

    formatted.trim_end().to_string()
}

fn render_explanation(explanation: &ExplanationBody) -> String {
    match explanation {
        ExplanationBody::Text(text) => text.trim().to_string(),
        ExplanationBody::Bullets(items) => items
            .iter()
            .map(|item| format!("- {}", item.trim()))
            .collect::<Vec<_>>()
            .join("\n"),
        ExplanationBody::Sections(sections) => sections
            .iter()
            .map(|(key, value)| format!("- **{key}**: {}", value.trim()))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::format_response;
    use crate::domain::itinerary::{DayPlan, ExplanationBody, Itinerary};
    use crate::guard::GuardedPayload;

    fn three_day_itinerary() -> Itinerary {
        Itinerary::Structured(
            (1..=3)
                .map(|day| DayPlan {
                    activities: vec![format!("morning walk {day}"), format!("museum {day}")],
                    stay: "city-centre hotel".to_string(),
                    description: format!("day {day} around the old town"),
                })
                .collect(),
        )
    }

    #[test]
    fn structured_itinerary_renders_each_day_header() {
        let payload =
            GuardedPayload::new(three_day_itinerary(), "Chosen for the budget.".to_string());
        let output = format_response(&payload);

        assert!(output.contains("### Your Travel Itinerary"));
        assert!(output.contains("**Day 1**"));
        assert!(output.contains("**Day 2**"));
        assert!(output.contains("**Day 3**"));
        assert!(output.contains("### Why These Suggestions?"));
        assert!(output.contains("Chosen for the budget."));
    }

    #[test]
    fn raw_itinerary_renders_verbatim() {
        let payload = GuardedPayload::new(
            Itinerary::Raw("Day 1: wander. Day 2: relax.".to_string()),
            "Low effort trip.".to_string(),
        );
        let output = format_response(&payload);
        assert!(output.contains("Day 1: wander. Day 2: relax."));
    }

    #[test]
    fn refusal_payload_skips_explanation_section() {
        let payload = GuardedPayload::refusal("Travel to this location is restricted.");
        let output = format_response(&payload);
        assert!(output.contains("restricted"));
        assert!(!output.contains("Why These Suggestions?"));
    }

    #[test]
    fn never_fails_for_any_shape_combination() {
        let itineraries = vec![
            three_day_itinerary(),
            Itinerary::Raw("just a string plan".to_string()),
            Itinerary::Structured(Vec::new()),
        ];
        let explanations = vec![
            None,
            Some(ExplanationBody::Text("plain text".to_string())),
            Some(ExplanationBody::Bullets(vec![
                "fits the budget".to_string(),
                "close to the lake".to_string(),
            ])),
            Some(ExplanationBody::Sections(BTreeMap::from([
                ("budget".to_string(), "well within range".to_string()),
                ("style".to_string(), "relaxed".to_string()),
            ]))),
        ];

        for itinerary in &itineraries {
            for explanation in &explanations {
                let payload = GuardedPayload {
                    itinerary: itinerary.clone(),
                    explanation: explanation.clone(),
                };
                let output = format_response(&payload);
                assert!(output.contains("### Your Travel Itinerary"));
            }
        }
    }

    #[test]
    fn bullet_explanation_renders_as_list() {
        let payload = GuardedPayload {
            itinerary: Itinerary::Raw("short plan".to_string()),
            explanation: Some(ExplanationBody::Bullets(vec!["cheap".to_string()])),
        };
        assert!(format_response(&payload).contains("- cheap"));
    }
}
