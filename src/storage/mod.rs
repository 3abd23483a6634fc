//! Persistence gateway abstractions
//!
//! Provides the trait-based storage boundary for program workflow records,
//! enabling testable services through dependency injection.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ConceptStateConversion, ConversionId, Program, ProgramId};

pub mod memory;

pub use memory::InMemoryStore;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("program not found: {id}")]
    ProgramNotFound { id: ProgramId },
    #[error("concept state conversion not found: {id}")]
    ConversionNotFound { id: ConversionId },
    #[error("storage backend error: {message}")]
    Backend { message: String },
}

/// Trait for program workflow persistence
///
/// This abstraction enables testing the service layer without a real storage
/// backend, while preserving the exact interface used by the application code.
/// Implementations own all durability and consistency concerns; the service
/// layer issues one logical call per operation.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ProgramStore: Send + Sync {
    /// Find programs by exact name match.
    ///
    /// With `include_retired` false the result is restricted to non-retired
    /// programs; with true it covers retired records as well.
    async fn find_programs_by_name(
        &self,
        name: &str,
        include_retired: bool,
    ) -> Result<Vec<Program>, StorageError>;

    /// Fetch a program by its store-assigned id.
    async fn get_program(&self, id: ProgramId) -> Result<Option<Program>, StorageError>;

    /// List all programs, optionally including retired ones.
    async fn get_all_programs(&self, include_retired: bool) -> Result<Vec<Program>, StorageError>;

    /// Persist a program, assigning an id on first save.
    async fn save_program(&self, program: Program) -> Result<Program, StorageError>;

    /// Remove a program from storage entirely.
    async fn delete_program(&self, id: ProgramId) -> Result<(), StorageError>;

    /// Persist a concept state conversion, assigning an id on first save.
    async fn save_concept_state_conversion(
        &self,
        conversion: ConceptStateConversion,
    ) -> Result<ConceptStateConversion, StorageError>;

    /// Fetch a conversion by its store-assigned id.
    async fn get_concept_state_conversion(
        &self,
        id: ConversionId,
    ) -> Result<Option<ConceptStateConversion>, StorageError>;

    /// Remove a conversion from storage entirely.
    async fn delete_concept_state_conversion(&self, id: ConversionId)
        -> Result<(), StorageError>;
}
