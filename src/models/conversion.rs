use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::program::{Concept, ProgramWorkflow, ProgramWorkflowState};
use super::ConversionId;

/// A rule mapping a clinical concept to a transition into a workflow state.
///
/// All three references are required for persistence; the service rejects a
/// conversion with any of them missing before touching the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptStateConversion {
    pub id: Option<ConversionId>,
    pub uuid: Uuid,
    pub concept: Option<Concept>,
    pub program_workflow: Option<ProgramWorkflow>,
    pub program_workflow_state: Option<ProgramWorkflowState>,
}

impl ConceptStateConversion {
    pub fn new() -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            concept: None,
            program_workflow: None,
            program_workflow_state: None,
        }
    }
}

impl Default for ConceptStateConversion {
    fn default() -> Self {
        Self::new()
    }
}
