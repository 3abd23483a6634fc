//! Persistence preconditions for program workflow records.
//!
//! Checks run before any store call; a failure names the entity and field so
//! callers can report exactly which reference is missing.

use crate::models::{ConceptStateConversion, Program};

use super::ServiceError;

pub(crate) fn validate_program(program: &Program) -> Result<(), ServiceError> {
    if program.concept.is_none() {
        return Err(ServiceError::MissingReference {
            entity: "Program",
            field: "concept",
        });
    }
    // The program concept is known to be set here, so every owned workflow
    // must carry one too.
    for workflow in &program.workflows {
        if workflow.concept.is_none() {
            return Err(ServiceError::MissingReference {
                entity: "ProgramWorkflow",
                field: "concept",
            });
        }
    }
    Ok(())
}

pub(crate) fn validate_conversion(
    conversion: &ConceptStateConversion,
) -> Result<(), ServiceError> {
    let missing = |field: &'static str| ServiceError::MissingReference {
        entity: "ConceptStateConversion",
        field,
    };
    if conversion.concept.is_none() {
        return Err(missing("concept"));
    }
    if conversion.program_workflow.is_none() {
        return Err(missing("program_workflow"));
    }
    if conversion.program_workflow_state.is_none() {
        return Err(missing("program_workflow_state"));
    }
    Ok(())
}
