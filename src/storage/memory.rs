//! In-memory reference implementation of the persistence gateway
//!
//! Backs integration tests and embedded/demo deployments. A real deployment
//! would put a database-backed implementation behind the same trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{ConceptStateConversion, ConversionId, Program, ProgramId};

use super::{ProgramStore, StorageError};

#[derive(Default)]
struct Tables {
    programs: HashMap<ProgramId, Program>,
    conversions: HashMap<ConversionId, ConceptStateConversion>,
}

/// Hashmap-backed store guarded by a single async lock.
///
/// Id assignment uses one counter across record types, so ids are unique
/// store-wide, not just per table.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgramStore for InMemoryStore {
    async fn find_programs_by_name(
        &self,
        name: &str,
        include_retired: bool,
    ) -> Result<Vec<Program>, StorageError> {
        let tables = self.tables.read().await;
        let matches: Vec<Program> = tables
            .programs
            .values()
            .filter(|p| p.name == name && (include_retired || !p.retired))
            .cloned()
            .collect();
        debug!(
            name = name,
            include_retired = include_retired,
            matches = matches.len(),
            "program name lookup"
        );
        Ok(matches)
    }

    async fn get_program(&self, id: ProgramId) -> Result<Option<Program>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.programs.get(&id).cloned())
    }

    async fn get_all_programs(&self, include_retired: bool) -> Result<Vec<Program>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .programs
            .values()
            .filter(|p| include_retired || !p.retired)
            .cloned()
            .collect())
    }

    async fn save_program(&self, mut program: Program) -> Result<Program, StorageError> {
        let id = match program.id {
            Some(id) => id,
            None => {
                let id = self.allocate_id();
                program.id = Some(id);
                id
            }
        };
        for workflow in &mut program.workflows {
            if workflow.id.is_none() {
                workflow.id = Some(self.allocate_id());
            }
            for state in &mut workflow.states {
                if state.id.is_none() {
                    state.id = Some(self.allocate_id());
                }
            }
        }

        let mut tables = self.tables.write().await;
        tables.programs.insert(id, program.clone());
        debug!(program_id = id, name = %program.name, "program saved");
        Ok(program)
    }

    async fn delete_program(&self, id: ProgramId) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables
            .programs
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::ProgramNotFound { id })
    }

    async fn save_concept_state_conversion(
        &self,
        mut conversion: ConceptStateConversion,
    ) -> Result<ConceptStateConversion, StorageError> {
        let id = match conversion.id {
            Some(id) => id,
            None => {
                let id = self.allocate_id();
                conversion.id = Some(id);
                id
            }
        };
        let mut tables = self.tables.write().await;
        tables.conversions.insert(id, conversion.clone());
        debug!(conversion_id = id, "concept state conversion saved");
        Ok(conversion)
    }

    async fn get_concept_state_conversion(
        &self,
        id: ConversionId,
    ) -> Result<Option<ConceptStateConversion>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.conversions.get(&id).cloned())
    }

    async fn delete_concept_state_conversion(
        &self,
        id: ConversionId,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        tables
            .conversions
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::ConversionNotFound { id })
    }
}
