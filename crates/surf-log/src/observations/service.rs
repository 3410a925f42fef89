use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{ObservationRecord, RecordId};
use super::ingest::{ingest, prepare_for_save, RawRecord};
use super::repository::{
    ObservationRepository, RecordFilter, RepositoryError, SortKey, SortOrder, StoredObservation,
};
use super::scoring::{score_record, ScoreCard};
use super::validation::{validate_for_submission, ValidationReport};

/// Service composing normalization, scoring, validation, and the repository.
pub struct ObservationService<R> {
    repository: Arc<R>,
}

impl<R> Clone for ObservationService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> ObservationService<R>
where
    R: ObservationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Live score preview for a draft; never fails and never persists.
    pub fn preview(&self, record: &ObservationRecord) -> ScoreCard {
        score_record(record)
    }

    /// Normalize, re-score, validate, and persist a new record.
    pub fn submit(&self, record: ObservationRecord) -> Result<StoredObservation, ServiceError> {
        let record = checked(record)?;
        let id = self.repository.save(record.clone())?;
        info!(record_id = %id, total = record.total_score, "observation saved");
        Ok(StoredObservation { id, record })
    }

    /// [`submit`](Self::submit) for a loosely typed record.
    pub fn submit_raw(&self, raw: &RawRecord) -> Result<StoredObservation, ServiceError> {
        self.submit(ingest(raw))
    }

    /// Replace a stored record, applying the same checks as a new submission.
    pub fn update(
        &self,
        id: &RecordId,
        record: ObservationRecord,
    ) -> Result<StoredObservation, ServiceError> {
        let record = checked(record)?;
        self.repository.update(id, record.clone())?;
        info!(record_id = %id, total = record.total_score, "observation updated");
        Ok(StoredObservation {
            id: id.clone(),
            record,
        })
    }

    /// [`update`](Self::update) for a loosely typed record.
    ///
    /// When `raw` carries no visibility the stored record's tag is kept.
    pub fn update_raw(
        &self,
        id: &RecordId,
        raw: &RawRecord,
    ) -> Result<StoredObservation, ServiceError> {
        let mut record = ingest(raw);
        if record.visibility.is_none() {
            match self.repository.find(id) {
                Ok(stored) => record.visibility = stored.record.visibility,
                // the update itself reports missing or foreign records
                Err(RepositoryError::NotFound) => {}
                Err(err) => return Err(err.into()),
            }
        }
        self.update(id, record)
    }

    pub fn delete(&self, id: &RecordId) -> Result<(), ServiceError> {
        self.repository.delete(id)?;
        info!(record_id = %id, "observation deleted");
        Ok(())
    }

    pub fn find(&self, id: &RecordId) -> Result<StoredObservation, ServiceError> {
        Ok(self.repository.find(id)?)
    }

    /// Visible records passing `filter`, in the order it asks for.
    ///
    /// Best sessions come first by default. Records missing the sort value
    /// always sort last; ties keep storage order.
    pub fn list(&self, filter: &RecordFilter) -> Result<Vec<StoredObservation>, ServiceError> {
        let mut records = self.repository.load_all(filter)?;
        let (key, order) = filter.ordering();
        records.sort_by(|a, b| compare_by(key, order, &a.record, &b.record));
        Ok(records)
    }
}

fn checked(record: ObservationRecord) -> Result<ObservationRecord, ServiceError> {
    let record = prepare_for_save(record);
    let report = validate_for_submission(&record);
    if report.is_valid() {
        Ok(record)
    } else {
        warn!(violations = ?report.violations, "observation rejected");
        Err(ServiceError::Validation(report))
    }
}

fn compare_by(
    key: SortKey,
    order: SortOrder,
    a: &ObservationRecord,
    b: &ObservationRecord,
) -> Ordering {
    match key {
        SortKey::Total => present_first(a.total_score, b.total_score, order, f64::total_cmp),
        SortKey::Date => present_first(
            a.date.map(|date| (date, a.time)),
            b.date.map(|date| (date, b.time)),
            order,
            Ord::cmp,
        ),
        SortKey::Break => present_first(
            folded(&a.break_name),
            folded(&b.break_name),
            order,
            Ord::cmp,
        ),
        SortKey::PrimarySwell => present_first(
            a.swell.primary_size_m,
            b.swell.primary_size_m,
            order,
            f64::total_cmp,
        ),
        SortKey::SecondarySwell => present_first(
            a.swell.secondary_size_m,
            b.swell.secondary_size_m,
            order,
            f64::total_cmp,
        ),
        SortKey::SwellDirection => present_first(
            a.swell.direction_deg,
            b.swell.direction_deg,
            order,
            Ord::cmp,
        ),
    }
}

fn present_first<T>(
    a: Option<T>,
    b: Option<T>,
    order: SortOrder,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => order.apply(cmp(&a, &b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn folded(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_lowercase())
}

/// Error raised by the observation service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Missing / invalid: {}", .0.messages().join("; "))]
    Validation(ValidationReport),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
