use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::observations::domain::{
    CompassBearing, ObservationRecord, RecordId, Suitability, SwellSuitability, TideDirection,
};
use crate::observations::repository::{
    ObservationRepository, RecordFilter, RepositoryError, StoredObservation,
};
use crate::observations::storage::{
    CsvTableRepository, InMemoryObjectStore, InMemoryRowBackend, RowStoreRepository,
};
use crate::observations::ObservationService;

pub(super) const TABLE_KEY: &str = "Rotto_Tracker.csv";

pub(super) type MemoryTable = CsvTableRepository<InMemoryObjectStore>;

pub(super) type SharedRows = RowStoreRepository<Arc<InMemoryRowBackend>>;

/// A complete session: 8/Yes swell, 6/Ok wind, 4/Yes tide.
pub(super) fn session_record() -> ObservationRecord {
    let mut record = ObservationRecord {
        break_name: "Strickland".to_string(),
        zone: "West End".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2024, 3, 2),
        time: chrono::NaiveTime::from_hms_opt(7, 30, 0),
        ..ObservationRecord::default()
    };
    record.swell.primary_size_m = Some(1.8);
    record.swell.period_s = Some(14);
    record.swell.direction_deg = Some(240);
    record.swell.suitable = Some(SwellSuitability::Yes);
    record.swell.score = Some(8);
    record.swell.comments = "long lines wrapping in".to_string();
    record.wind.bearing = Some(CompassBearing::ESE);
    record.wind.speed_kn = Some(12);
    record.wind.suitable = Some(Suitability::Ok);
    record.wind.score = Some(6);
    record.tide.reading_m = Some(0.6);
    record.tide.direction = Some(TideDirection::Rising);
    record.tide.suitable = Some(Suitability::Yes);
    record.tide.score = Some(4);
    record
}

pub(super) fn record_with_scores(break_name: &str, swell: u8, wind: u8, tide: u8) -> ObservationRecord {
    let mut record = session_record();
    record.break_name = break_name.to_string();
    record.swell.score = Some(swell);
    record.wind.score = Some(wind);
    record.wind.suitable = Some(Suitability::Yes);
    record.tide.score = Some(tide);
    record
}

pub(super) fn build_service() -> (ObservationService<MemoryTable>, Arc<MemoryTable>) {
    let repository = Arc::new(CsvTableRepository::new(InMemoryObjectStore::new(), TABLE_KEY));
    (ObservationService::new(repository.clone()), repository)
}

/// Service acting as `owner` over a row table shared with other owners.
pub(super) fn build_row_service(
    backend: &Arc<InMemoryRowBackend>,
    owner: &str,
) -> ObservationService<SharedRows> {
    ObservationService::new(Arc::new(RowStoreRepository::new(backend.clone(), owner)))
}

/// Repository whose backing store is always unreachable.
pub(super) struct UnavailableRepository;

impl ObservationRepository for UnavailableRepository {
    fn load_all(&self, _filter: &RecordFilter) -> Result<Vec<StoredObservation>, RepositoryError> {
        Err(RepositoryError::Storage("bucket unreachable".to_string()))
    }

    fn save(&self, _record: ObservationRecord) -> Result<RecordId, RepositoryError> {
        Err(RepositoryError::Storage("bucket unreachable".to_string()))
    }

    fn update(&self, _id: &RecordId, _record: ObservationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Storage("bucket unreachable".to_string()))
    }

    fn delete(&self, _id: &RecordId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Storage("bucket unreachable".to_string()))
    }
}

/// Repository where every stored record belongs to someone else.
pub(super) struct ForeignRepository;

impl ObservationRepository for ForeignRepository {
    fn load_all(&self, _filter: &RecordFilter) -> Result<Vec<StoredObservation>, RepositoryError> {
        Ok(Vec::new())
    }

    fn save(&self, _record: ObservationRecord) -> Result<RecordId, RepositoryError> {
        Ok(RecordId::from("1"))
    }

    fn update(&self, _id: &RecordId, _record: ObservationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Forbidden)
    }

    fn delete(&self, _id: &RecordId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Forbidden)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
