use serde::{Deserialize, Serialize};

/// Defaults substituted whenever a slot was never stated by the user.
pub const DEFAULT_DESTINATION: &str = "India";
pub const DEFAULT_BUDGET: &str = "moderate";
pub const DEFAULT_TRIP_TYPE: &str = "general";
pub const DEFAULT_DAYS: u32 = 3;

/// Intent classification tag. Used for logging and branching hooks only;
/// it does not gate the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    DestinationInfo,
    Activity,
    Budget,
    General,
    /// Fallback label when classification output could not be parsed.
    Recommend,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DestinationInfo => "destination_info",
            Self::Activity => "activity",
            Self::Budget => "budget",
            Self::General => "general",
            Self::Recommend => "recommend",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "destination_info" => Some(Self::DestinationInfo),
            "activity" => Some(Self::Activity),
            "budget" => Some(Self::Budget),
            "general" => Some(Self::General),
            "recommend" => Some(Self::Recommend),
            _ => None,
        }
    }
}

/// Per-conversation slot memory. The only state that survives a turn.
///
/// `days` is carried as free text and parsed to an integer at synthesis
/// time, so a malformed value degrades to the default rather than
/// erasing what the user said.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSet {
    pub destination: Option<String>,
    pub trip_type: Option<String>,
    pub budget: Option<String>,
    pub days: Option<String>,
}

/// Slots extracted from a single query. Keys absent here leave the
/// stored slot untouched on merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSlotSet {
    pub destination: Option<String>,
    pub trip_type: Option<String>,
    pub budget: Option<String>,
    pub days: Option<String>,
}

impl SlotSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-destructive update: a stored value is only overwritten when
    /// the incoming value is non-empty after trimming. Idempotent.
    pub fn merge(&mut self, incoming: &PartialSlotSet) {
        merge_slot(&mut self.destination, &incoming.destination);
        merge_slot(&mut self.trip_type, &incoming.trip_type);
        merge_slot(&mut self.budget, &incoming.budget);
        merge_slot(&mut self.days, &incoming.days);
    }

    pub fn destination(&self) -> &str {
        self.destination.as_deref().unwrap_or(DEFAULT_DESTINATION)
    }

    pub fn trip_type(&self) -> &str {
        self.trip_type.as_deref().unwrap_or(DEFAULT_TRIP_TYPE)
    }

    pub fn budget(&self) -> &str {
        self.budget.as_deref().unwrap_or(DEFAULT_BUDGET)
    }

    /// Requested day count, defaulting when the slot is absent or does
    /// not parse as a positive integer.
    pub fn days_or_default(&self) -> u32 {
        self.days
            .as_deref()
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_DAYS)
    }

    /// Flattens known slots into `key: value, key: value` form for
    /// prompt embedding.
    pub fn as_preference_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(destination) = &self.destination {
            parts.push(format!("destination: {destination}"));
        }
        if let Some(trip_type) = &self.trip_type {
            parts.push(format!("trip_type: {trip_type}"));
        }
        if let Some(budget) = &self.budget {
            parts.push(format!("budget: {budget}"));
        }
        if let Some(days) = &self.days {
            parts.push(format!("days: {days}"));
        }
        parts.join(", ")
    }
}

fn merge_slot(current: &mut Option<String>, incoming: &Option<String>) {
    if let Some(value) = incoming {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            *current = Some(trimmed.to_string());
        }
    }
}
