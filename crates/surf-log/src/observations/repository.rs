use serde::{Deserialize, Serialize};

use super::domain::{ObservationRecord, RecordId, Visibility};

/// A record together with the identifier its adapter assigned on load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredObservation {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: ObservationRecord,
}

/// Optional narrowing applied to a listing after access rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecordFilter {
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default, rename = "break")]
    pub break_name: Option<String>,
    /// Listing order; best total score first when absent.
    #[serde(default)]
    pub sort: Option<SortKey>,
    #[serde(default)]
    pub order: Option<SortOrder>,
}

/// Column a listing can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Total,
    Date,
    Break,
    PrimarySwell,
    SecondarySwell,
    SwellDirection,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "total" | "total_score" => Some(Self::Total),
            "date" => Some(Self::Date),
            "break" => Some(Self::Break),
            "primary_swell" | "surfline" => Some(Self::PrimarySwell),
            "secondary_swell" | "seabreeze" => Some(Self::SecondarySwell),
            "swell_direction" | "direction" => Some(Self::SwellDirection),
            _ => None,
        }
    }

    /// Scores read best-first, everything else ascending.
    pub fn default_order(self) -> SortOrder {
        match self {
            SortKey::Total => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl RecordFilter {
    /// The effective key and direction for a listing.
    pub fn ordering(&self) -> (SortKey, SortOrder) {
        let key = self.sort.unwrap_or_default();
        (key, self.order.unwrap_or_else(|| key.default_order()))
    }

    pub fn matches(&self, record: &ObservationRecord) -> bool {
        let visibility_ok = self
            .visibility
            .map_or(true, |wanted| record.effective_visibility() == wanted);
        let zone_ok = label_matches(self.zone.as_deref(), &record.zone);
        let break_ok = label_matches(self.break_name.as_deref(), &record.break_name);
        visibility_ok && zone_ok && break_ok
    }
}

fn label_matches(wanted: Option<&str>, actual: &str) -> bool {
    match wanted.map(str::trim) {
        None | Some("") => true,
        Some(wanted) => wanted.eq_ignore_ascii_case(actual.trim()),
    }
}

/// Storage abstraction so the service and workflow can be exercised against
/// any adapter.
pub trait ObservationRepository: Send + Sync {
    /// Every record visible to the caller that passes `filter`.
    fn load_all(&self, filter: &RecordFilter) -> Result<Vec<StoredObservation>, RepositoryError>;
    fn save(&self, record: ObservationRecord) -> Result<RecordId, RepositoryError>;
    /// Replaces a stored record. Fails when it is missing or not owned by the caller.
    fn update(&self, id: &RecordId, record: ObservationRecord) -> Result<(), RepositoryError>;
    /// Removes a stored record. Fails when it is missing or not owned by the caller.
    fn delete(&self, id: &RecordId) -> Result<(), RepositoryError>;

    fn find(&self, id: &RecordId) -> Result<StoredObservation, RepositoryError> {
        self.load_all(&RecordFilter::default())?
            .into_iter()
            .find(|stored| &stored.id == id)
            .ok_or(RepositoryError::NotFound)
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("record is owned by another user")]
    Forbidden,
    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub(crate) fn storage(error: impl std::fmt::Display) -> Self {
        Self::Storage(error.to_string())
    }
}
