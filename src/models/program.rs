use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ConceptId, ProgramId, StateId, WorkflowId};

/// A reference to a clinical concept.
///
/// The full concept model (answers, mappings, numeric ranges) lives in the
/// terminology service; this layer only needs identity and a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub id: Option<ConceptId>,
    pub uuid: Uuid,
    pub name: Option<String>,
}

impl Concept {
    pub fn new() -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: None,
        }
    }

    pub fn named(name: &str) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: Some(name.to_string()),
        }
    }
}

impl Default for Concept {
    fn default() -> Self {
        Self::new()
    }
}

/// A top-level care pathway composed of workflow stages.
///
/// `id` is assigned by the store on first save; `uuid` identifies the record
/// across systems from the moment it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: Option<ProgramId>,
    pub uuid: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub concept: Option<Concept>,
    pub workflows: Vec<ProgramWorkflow>,
    pub retired: bool,
    pub retire_reason: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_changed: Option<DateTime<Utc>>,
}

impl Program {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            concept: None,
            workflows: Vec::new(),
            retired: false,
            retire_reason: None,
            date_created: Utc::now(),
            date_changed: None,
        }
    }

    pub fn add_workflow(&mut self, workflow: ProgramWorkflow) {
        self.workflows.push(workflow);
    }

    /// Workflows that have not been retired.
    pub fn active_workflows(&self) -> impl Iterator<Item = &ProgramWorkflow> {
        self.workflows.iter().filter(|w| !w.retired)
    }
}

/// A stage/axis within a program, itself composed of states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramWorkflow {
    pub id: Option<WorkflowId>,
    pub uuid: Uuid,
    pub concept: Option<Concept>,
    pub states: Vec<ProgramWorkflowState>,
    pub retired: bool,
}

impl ProgramWorkflow {
    pub fn new() -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            concept: None,
            states: Vec::new(),
            retired: false,
        }
    }

    pub fn add_state(&mut self, state: ProgramWorkflowState) {
        self.states.push(state);
    }
}

impl Default for ProgramWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

/// A specific state within a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramWorkflowState {
    pub id: Option<StateId>,
    pub uuid: Uuid,
    pub concept: Option<Concept>,
    pub initial: bool,
    pub terminal: bool,
    pub retired: bool,
}

impl ProgramWorkflowState {
    pub fn new() -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            concept: None,
            initial: false,
            terminal: false,
            retired: false,
        }
    }
}

impl Default for ProgramWorkflowState {
    fn default() -> Self {
        Self::new()
    }
}
