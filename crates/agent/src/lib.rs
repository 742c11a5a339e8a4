//! Planner Runtime - LLM-powered travel-planning pipeline
//!
//! This crate provides the "brain" of the itinera system - the runtime that:
//! - Extracts intent and trip slots from natural language queries
//! - Accumulates slot memory across conversation turns
//! - Enforces destination and topic guardrails
//! - Generates retrieval-augmented recommendations, itineraries, and rationales
//!
//! # Architecture
//!
//! One user query drives one linear pass:
//! 1. **Slot Extraction** (`extractor`) - Parse NL → `Intent` + `PartialSlotSet`
//! 2. **Slot Merge** (`session`) - Fold new slots into conversation memory
//! 3. **Input Guard** - Refuse restricted destinations before any generation
//! 4. **Recommendation** (`recommender`) - RAG over the travel knowledge index
//! 5. **Synthesis** (`itinerary`) - Day-by-day plan, soft-degrading to raw text
//! 6. **Explanation** (`explainer`) - Rationale against the stored preferences
//! 7. **Output Guard + Formatting** - Scrub sensitive topics, render markdown
//! 8. **Evaluation** (`evaluator`) - Rubric scoring, telemetry only
//!
//! # Key Types
//!
//! - `PlannerRuntime` - Main orchestrator (see `runtime` module)
//! - `TextGenerator` / `PassageRetriever` - Pluggable provider traits
//! - `Session` - Per-conversation slot store and transcript
//!
//! # Safety Principle
//!
//! Guard verdicts are deterministic policy checks, never LLM output. A
//! blocked turn terminates before any further provider call is made.

pub mod evaluator;
pub mod explainer;
pub mod extractor;
pub mod itinerary;
pub mod llm;
pub mod recommender;
pub mod retrieval;
pub mod runtime;
pub mod session;
