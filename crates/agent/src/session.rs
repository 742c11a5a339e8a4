use chrono::{DateTime, Utc};

use itinera_core::domain::slots::{PartialSlotSet, SlotSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One visible transcript entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Per-conversation state: the slot store plus the visible transcript.
/// The slot store is the only state that outlives a pipeline run.
/// `handle_turn` takes `&mut Session`, so at most one turn is in flight
/// per session by construction.
#[derive(Clone, Debug, Default)]
pub struct Session {
    slots: SlotSet,
    transcript: Vec<Turn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &SlotSet {
        &self.slots
    }

    pub fn merge_slots(&mut self, incoming: &PartialSlotSet) {
        self.slots.merge(incoming);
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn record_user(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn { role: Role::User, text: text.into(), at: Utc::now() });
    }

    pub fn record_assistant(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn { role: Role::Assistant, text: text.into(), at: Utc::now() });
    }

    /// Conversation reset: forgets slots and transcript alike.
    pub fn reset(&mut self) {
        self.slots = SlotSet::new();
        self.transcript.clear();
    }
}
