pub mod config;
pub mod domain;
pub mod errors;
pub mod format;
pub mod guard;

pub use domain::evaluation::{EvaluationReport, EvaluationScores};
pub use domain::itinerary::{DayPlan, ExplanationBody, Itinerary};
pub use domain::slots::{Intent, PartialSlotSet, SlotSet};
pub use errors::{InterfaceError, PipelineError, PipelineStage};
pub use format::format_response;
pub use guard::{GuardPolicy, GuardVerdict, GuardedPayload};
