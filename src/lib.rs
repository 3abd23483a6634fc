// Careflow Library - Program Workflow Management for Healthcare Records
// This exposes the core components for testing and integration

pub mod models;
pub mod service;
pub mod storage;
pub mod telemetry;

// Re-export key types for easy access
pub use models::{
    Concept, ConceptStateConversion, Program, ProgramWorkflow, ProgramWorkflowState,
};
pub use service::{resolve_unique_program, ProgramWorkflowService, ServiceError};
pub use storage::{InMemoryStore, ProgramStore, StorageError};
pub use telemetry::{create_service_span, init_telemetry};
