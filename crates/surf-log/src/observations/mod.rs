//! Surf-session observations: scoring, normalization, validation, the
//! create/edit/delete workflow, and the persistence adapters behind it.

pub mod domain;
pub mod ingest;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod storage;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use domain::{
    CompassBearing, ObservationRecord, RecordId, Suitability, SwellObservation, SwellSuitability,
    TideDirection, TideObservation, Visibility, WindObservation,
};
pub use ingest::{
    coerce_float, coerce_int, ensure_schema, ingest, migrate_legacy_fields, prepare_for_save,
    to_raw, RawRecord, COLUMNS,
};
pub use repository::{
    ObservationRepository, RecordFilter, RepositoryError, SortKey, SortOrder, StoredObservation,
};
pub use router::observation_router;
pub use scoring::{final_score, score_record, total_score, ScoreCard, Weighted};
pub use service::{ObservationService, ServiceError};
pub use validation::{validate_for_submission, validate_page, ValidationReport, Violation};
pub use workflow::{DraftPage, WorkflowError, WorkflowSession, WorkflowState};
