use serde::{Deserialize, Serialize};

/// Judge scores for one formatted response, 1..=5 per criterion.
/// Write-once and observability-only: never surfaced to the user and
/// never fed back into any pipeline stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationScores {
    pub relevance: u8,
    pub completeness: u8,
    pub correctness: u8,
    pub clarity: u8,
    pub safety: u8,
    pub overall_feedback: String,
}

/// Evaluation outcome. Parse failure degrades to `Unparsed` rather than
/// aborting the turn, since evaluation is purely observational.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvaluationReport {
    Scored(EvaluationScores),
    Unparsed(String),
}
