//! Domain entities for program workflow management
//!
//! These types mirror the clinical record model: a `Program` is a care pathway
//! composed of `ProgramWorkflow` stages, each stage composed of
//! `ProgramWorkflowState`s. A `ConceptStateConversion` maps a clinical concept
//! to a transition into a given workflow state.

pub mod conversion;
pub mod program;

pub use conversion::ConceptStateConversion;
pub use program::{Concept, Program, ProgramWorkflow, ProgramWorkflowState};

pub type ConceptId = u64;
pub type ProgramId = u64;
pub type WorkflowId = u64;
pub type StateId = u64;
pub type ConversionId = u64;
