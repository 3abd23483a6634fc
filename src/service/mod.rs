//! Program workflow service
//!
//! Validates and persists `Program` and `ConceptStateConversion` records,
//! resolving programs by name with uniqueness enforcement. Storage is an
//! injected [`ProgramStore`] fixed at construction; every operation validates
//! first and only then issues its gateway call, so a rejected input never
//! reaches the store.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{ConceptStateConversion, ConversionId, Program, ProgramId};
use crate::storage::{ProgramStore, StorageError};

pub mod validation;

use validation::{validate_conversion, validate_program};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("required reference is missing: {entity}.{field}")]
    MissingReference {
        entity: &'static str,
        field: &'static str,
    },
    #[error("multiple programs found with name: {name}")]
    DuplicateProgramName { name: String },
    #[error("storage error: {source}")]
    Storage {
        #[from]
        source: StorageError,
    },
}

/// Service facade over the persistence gateway.
pub struct ProgramWorkflowService {
    store: Arc<dyn ProgramStore>,
}

impl ProgramWorkflowService {
    pub fn new(store: Arc<dyn ProgramStore>) -> Self {
        Self { store }
    }

    /// Resolve a program by exact name.
    ///
    /// Queries the store twice, once restricted to non-retired programs and
    /// once including retired ones, and requires the combined result to hold
    /// at most one distinct record. Two or more distinct programs with the
    /// same name is a data-integrity condition surfaced as
    /// [`ServiceError::DuplicateProgramName`], not a lookup miss.
    pub async fn get_program_by_name(&self, name: &str) -> Result<Option<Program>, ServiceError> {
        debug!(name = name, "resolving program by name");
        let active = self.store.find_programs_by_name(name, false).await?;
        let with_retired = self.store.find_programs_by_name(name, true).await?;
        resolve_unique_program(name, active.into_iter().chain(with_retired))
    }

    pub async fn get_program(&self, id: ProgramId) -> Result<Option<Program>, ServiceError> {
        Ok(self.store.get_program(id).await?)
    }

    pub async fn get_all_programs(
        &self,
        include_retired: bool,
    ) -> Result<Vec<Program>, ServiceError> {
        Ok(self.store.get_all_programs(include_retired).await?)
    }

    /// Validate and persist a program.
    ///
    /// The program's concept must be set, and so must the concept of every
    /// owned workflow. Validation failures are raised before any store call.
    pub async fn save_program(&self, program: Program) -> Result<Program, ServiceError> {
        validate_program(&program)?;
        debug!(name = %program.name, "saving program");
        Ok(self.store.save_program(program).await?)
    }

    /// Retire a program along with all of its workflows and states.
    pub async fn retire_program(
        &self,
        mut program: Program,
        reason: &str,
    ) -> Result<Program, ServiceError> {
        let now = Utc::now();
        program.retired = true;
        program.retire_reason = Some(reason.to_string());
        program.date_changed = Some(now);
        for workflow in &mut program.workflows {
            workflow.retired = true;
            for state in &mut workflow.states {
                state.retired = true;
            }
        }
        self.save_program(program).await
    }

    /// Bring a retired program back, clearing the retire metadata on the
    /// program and its children.
    pub async fn unretire_program(&self, mut program: Program) -> Result<Program, ServiceError> {
        program.retired = false;
        program.retire_reason = None;
        program.date_changed = Some(Utc::now());
        for workflow in &mut program.workflows {
            workflow.retired = false;
            for state in &mut workflow.states {
                state.retired = false;
            }
        }
        self.save_program(program).await
    }

    /// Remove a program from storage entirely. No validation applies.
    pub async fn purge_program(&self, id: ProgramId) -> Result<(), ServiceError> {
        Ok(self.store.delete_program(id).await?)
    }

    /// Validate and persist a concept state conversion.
    ///
    /// All three references (concept, workflow, workflow state) must be set;
    /// the error names whichever is missing.
    pub async fn save_concept_state_conversion(
        &self,
        conversion: ConceptStateConversion,
    ) -> Result<ConceptStateConversion, ServiceError> {
        validate_conversion(&conversion)?;
        Ok(self.store.save_concept_state_conversion(conversion).await?)
    }

    pub async fn get_concept_state_conversion(
        &self,
        id: ConversionId,
    ) -> Result<Option<ConceptStateConversion>, ServiceError> {
        Ok(self.store.get_concept_state_conversion(id).await?)
    }

    pub async fn purge_concept_state_conversion(
        &self,
        id: ConversionId,
    ) -> Result<(), ServiceError> {
        Ok(self.store.delete_concept_state_conversion(id).await?)
    }
}

/// Reduce the concatenated results of both name queries to zero-or-one program.
///
/// A record returned by both queries (a non-retired program shows up in the
/// retired-inclusive query too) counts once: records are deduplicated by id
/// when both sides carry one, by uuid otherwise. Independent of how the two
/// queries were issued, so it stays unit-testable without a store.
pub fn resolve_unique_program(
    name: &str,
    candidates: impl IntoIterator<Item = Program>,
) -> Result<Option<Program>, ServiceError> {
    let mut distinct: Vec<Program> = Vec::new();
    for candidate in candidates {
        if !distinct.iter().any(|seen| same_record(seen, &candidate)) {
            distinct.push(candidate);
        }
    }
    match distinct.len() {
        0 => Ok(None),
        1 => Ok(distinct.pop()),
        n => {
            warn!(name = name, matches = n, "duplicate program name");
            Err(ServiceError::DuplicateProgramName {
                name: name.to_string(),
            })
        }
    }
}

fn same_record(a: &Program, b: &Program) -> bool {
    match (a.id, b.id) {
        (Some(left), Some(right)) => left == right,
        _ => a.uuid == b.uuid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Concept, ProgramWorkflow, ProgramWorkflowState};
    use crate::storage::MockProgramStore;

    fn service(store: MockProgramStore) -> ProgramWorkflowService {
        ProgramWorkflowService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn get_program_by_name_queries_store_with_and_without_retired() {
        let mut store = MockProgramStore::new();
        store
            .expect_find_programs_by_name()
            .withf(|name, include_retired| name == "A name" && !include_retired)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        store
            .expect_find_programs_by_name()
            .withf(|name, include_retired| name == "A name" && *include_retired)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let result = service(store).get_program_by_name("A name").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn get_program_by_name_returns_single_match() {
        let program = Program::new("A name");
        let expected_uuid = program.uuid;

        let mut store = MockProgramStore::new();
        let for_active = program.clone();
        store
            .expect_find_programs_by_name()
            .withf(|_, include_retired| !include_retired)
            .returning(move |_, _| Ok(vec![for_active.clone()]));
        let for_all = program.clone();
        store
            .expect_find_programs_by_name()
            .withf(|_, include_retired| *include_retired)
            .returning(move |_, _| Ok(vec![for_all.clone()]));

        let found = service(store).get_program_by_name("A name").await.unwrap();
        assert_eq!(found.unwrap().uuid, expected_uuid);
    }

    #[tokio::test]
    async fn get_program_by_name_finds_retired_only_match() {
        let mut retired = Program::new("Old pathway");
        retired.retired = true;
        let expected_uuid = retired.uuid;

        let mut store = MockProgramStore::new();
        store
            .expect_find_programs_by_name()
            .withf(|_, include_retired| !include_retired)
            .returning(|_, _| Ok(Vec::new()));
        store
            .expect_find_programs_by_name()
            .withf(|_, include_retired| *include_retired)
            .returning(move |_, _| Ok(vec![retired.clone()]));

        let found = service(store)
            .get_program_by_name("Old pathway")
            .await
            .unwrap();
        assert_eq!(found.unwrap().uuid, expected_uuid);
    }

    #[tokio::test]
    async fn get_program_by_name_fails_on_two_programs_with_same_name() {
        let first = Program::new("A name");
        let second = Program::new("A name");

        let mut store = MockProgramStore::new();
        let pair = vec![first.clone(), second.clone()];
        let pair_again = pair.clone();
        store
            .expect_find_programs_by_name()
            .withf(|_, include_retired| !include_retired)
            .returning(move |_, _| Ok(pair.clone()));
        store
            .expect_find_programs_by_name()
            .withf(|_, include_retired| *include_retired)
            .returning(move |_, _| Ok(pair_again.clone()));

        let result = service(store).get_program_by_name("A name").await;
        assert!(matches!(
            result,
            Err(ServiceError::DuplicateProgramName { name }) if name == "A name"
        ));
    }

    #[tokio::test]
    async fn save_program_fails_when_concept_is_missing() {
        let mut store = MockProgramStore::new();
        store.expect_save_program().times(0);

        let result = service(store).save_program(Program::new("A name")).await;
        assert!(matches!(
            result,
            Err(ServiceError::MissingReference {
                entity: "Program",
                field: "concept"
            })
        ));
    }

    #[tokio::test]
    async fn save_program_passes_with_concept_and_no_workflows() {
        let mut program = Program::new("A name");
        program.concept = Some(Concept::new());

        let mut store = MockProgramStore::new();
        store
            .expect_save_program()
            .times(1)
            .returning(|program| Ok(program));

        let saved = service(store).save_program(program.clone()).await.unwrap();
        assert_eq!(saved.uuid, program.uuid);
    }

    #[tokio::test]
    async fn save_program_fails_when_workflow_concept_is_missing() {
        let mut program = Program::new("A name");
        program.concept = Some(Concept::new());
        program.add_workflow(ProgramWorkflow::new());

        let mut store = MockProgramStore::new();
        store.expect_save_program().times(0);

        let result = service(store).save_program(program).await;
        assert!(matches!(
            result,
            Err(ServiceError::MissingReference {
                entity: "ProgramWorkflow",
                field: "concept"
            })
        ));
    }

    #[tokio::test]
    async fn save_program_passes_when_all_workflow_concepts_are_set() {
        let mut program = Program::new("A name");
        program.concept = Some(Concept::new());
        let mut workflow = ProgramWorkflow::new();
        workflow.concept = Some(Concept::new());
        program.add_workflow(workflow);

        let mut store = MockProgramStore::new();
        store
            .expect_save_program()
            .times(1)
            .returning(|program| Ok(program));

        assert!(service(store).save_program(program).await.is_ok());
    }

    fn complete_conversion() -> ConceptStateConversion {
        let mut conversion = ConceptStateConversion::new();
        conversion.concept = Some(Concept::new());
        conversion.program_workflow = Some(ProgramWorkflow::new());
        conversion.program_workflow_state = Some(ProgramWorkflowState::new());
        conversion
    }

    #[tokio::test]
    async fn save_conversion_fails_when_concept_is_missing() {
        let mut conversion = complete_conversion();
        conversion.concept = None;

        let mut store = MockProgramStore::new();
        store.expect_save_concept_state_conversion().times(0);

        let result = service(store).save_concept_state_conversion(conversion).await;
        assert!(matches!(
            result,
            Err(ServiceError::MissingReference {
                field: "concept",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn save_conversion_fails_when_workflow_is_missing() {
        let mut conversion = complete_conversion();
        conversion.program_workflow = None;

        let mut store = MockProgramStore::new();
        store.expect_save_concept_state_conversion().times(0);

        let result = service(store).save_concept_state_conversion(conversion).await;
        assert!(matches!(
            result,
            Err(ServiceError::MissingReference {
                field: "program_workflow",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn save_conversion_fails_when_state_is_missing() {
        let mut conversion = complete_conversion();
        conversion.program_workflow_state = None;

        let mut store = MockProgramStore::new();
        store.expect_save_concept_state_conversion().times(0);

        let result = service(store).save_concept_state_conversion(conversion).await;
        assert!(matches!(
            result,
            Err(ServiceError::MissingReference {
                field: "program_workflow_state",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn save_conversion_delegates_the_same_record_to_the_store() {
        let conversion = complete_conversion();
        let expected_uuid = conversion.uuid;

        let mut store = MockProgramStore::new();
        store
            .expect_save_concept_state_conversion()
            .withf(move |c| c.uuid == expected_uuid)
            .times(1)
            .returning(|conversion| Ok(conversion));

        let saved = service(store)
            .save_concept_state_conversion(conversion)
            .await
            .unwrap();
        assert_eq!(saved.uuid, expected_uuid);
    }

    #[tokio::test]
    async fn retire_program_marks_children_and_saves() {
        let mut program = Program::new("A name");
        program.concept = Some(Concept::new());
        let mut workflow = ProgramWorkflow::new();
        workflow.concept = Some(Concept::new());
        workflow.add_state(ProgramWorkflowState::new());
        program.add_workflow(workflow);

        let mut store = MockProgramStore::new();
        store
            .expect_save_program()
            .withf(|p| {
                p.retired
                    && p.retire_reason.as_deref() == Some("superseded")
                    && p.workflows.iter().all(|w| w.retired)
                    && p.workflows[0].states.iter().all(|s| s.retired)
            })
            .times(1)
            .returning(|program| Ok(program));

        let retired = service(store)
            .retire_program(program, "superseded")
            .await
            .unwrap();
        assert!(retired.date_changed.is_some());
    }

    #[tokio::test]
    async fn unretire_program_clears_retire_metadata() {
        let mut program = Program::new("A name");
        program.concept = Some(Concept::new());
        program.retired = true;
        program.retire_reason = Some("superseded".to_string());

        let mut store = MockProgramStore::new();
        store
            .expect_save_program()
            .withf(|p| !p.retired && p.retire_reason.is_none())
            .times(1)
            .returning(|program| Ok(program));

        let restored = service(store).unretire_program(program).await.unwrap();
        assert!(!restored.retired);
    }

    mod resolver {
        use super::*;

        #[test]
        fn empty_input_resolves_to_none() {
            let result = resolve_unique_program("A name", Vec::new()).unwrap();
            assert!(result.is_none());
        }

        #[test]
        fn record_returned_by_both_queries_counts_once() {
            let mut program = Program::new("A name");
            program.id = Some(7);

            let candidates = vec![program.clone(), program.clone()];
            let resolved = resolve_unique_program("A name", candidates).unwrap();
            assert_eq!(resolved.unwrap().id, Some(7));
        }

        #[test]
        fn unsaved_records_are_distinguished_by_uuid() {
            // Two unsaved programs share no id, so uuid identity keeps them
            // apart and the lookup correctly reports a duplicate.
            let first = Program::new("A name");
            let second = Program::new("A name");

            let result = resolve_unique_program("A name", vec![first, second]);
            assert!(matches!(
                result,
                Err(ServiceError::DuplicateProgramName { .. })
            ));
        }

        #[test]
        fn saved_and_unsaved_with_same_name_is_a_duplicate() {
            let mut saved = Program::new("A name");
            saved.id = Some(3);
            let unsaved = Program::new("A name");

            let result = resolve_unique_program("A name", vec![saved, unsaved]);
            assert!(matches!(
                result,
                Err(ServiceError::DuplicateProgramName { .. })
            ));
        }
    }
}
