use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use surf_log::config::{ConfigError, StorageConfig, StoreBackend};
use surf_log::observations::storage::{
    CsvTableRepository, FilesystemObjectStore, InMemoryRowBackend, RowStoreRepository,
};
use surf_log::observations::{
    CompassBearing, ObservationRecord, ObservationRepository, RecordFilter, RecordId,
    RepositoryError, SortKey, SortOrder, StoredObservation, Suitability, SwellSuitability,
    Visibility,
};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The adapter selected by `SURF_STORE`, behind a single concrete type.
pub(crate) enum ConfiguredRepository {
    CsvTable(CsvTableRepository<FilesystemObjectStore>),
    Rows(RowStoreRepository<InMemoryRowBackend>),
}

impl ConfiguredRepository {
    pub(crate) fn from_config(config: &StorageConfig) -> Self {
        match config.backend {
            StoreBackend::CsvTable => {
                info!(
                    data_dir = %config.data_dir.display(),
                    key = %config.table_key,
                    "using csv table store"
                );
                Self::CsvTable(CsvTableRepository::new(
                    FilesystemObjectStore::new(&config.data_dir),
                    config.table_key.clone(),
                ))
            }
            StoreBackend::Rows => {
                warn!(owner = %config.owner_id, "row store is held in memory for this process only");
                Self::Rows(RowStoreRepository::new(
                    InMemoryRowBackend::new(),
                    config.owner_id.clone(),
                ))
            }
        }
    }

    /// Like [`from_config`](Self::from_config), for commands whose writes must
    /// outlive the process.
    pub(crate) fn durable(config: &StorageConfig) -> Result<Self, ConfigError> {
        if !config.backend.is_durable() {
            return Err(ConfigError::EphemeralStore(config.backend));
        }
        Ok(Self::from_config(config))
    }

    fn inner(&self) -> &dyn ObservationRepository {
        match self {
            Self::CsvTable(repository) => repository,
            Self::Rows(repository) => repository,
        }
    }
}

impl ObservationRepository for ConfiguredRepository {
    fn load_all(&self, filter: &RecordFilter) -> Result<Vec<StoredObservation>, RepositoryError> {
        self.inner().load_all(filter)
    }

    fn save(&self, record: ObservationRecord) -> Result<RecordId, RepositoryError> {
        self.inner().save(record)
    }

    fn update(&self, id: &RecordId, record: ObservationRecord) -> Result<(), RepositoryError> {
        self.inner().update(id, record)
    }

    fn delete(&self, id: &RecordId) -> Result<(), RepositoryError> {
        self.inner().delete(id)
    }
}

pub(crate) fn parse_visibility(raw: &str) -> Result<Visibility, String> {
    Visibility::parse(raw)
        .ok_or_else(|| format!("'{raw}' is not one of Public, Private, Community"))
}

pub(crate) fn parse_sort_key(raw: &str) -> Result<SortKey, String> {
    SortKey::parse(raw).ok_or_else(|| {
        format!(
            "'{raw}' is not one of total, date, break, primary-swell, secondary-swell, swell-direction"
        )
    })
}

pub(crate) fn parse_sort_order(raw: &str) -> Result<SortOrder, String> {
    SortOrder::parse(raw).ok_or_else(|| format!("'{raw}' is not one of asc, desc"))
}

pub(crate) fn parse_suitability(raw: &str) -> Result<Suitability, String> {
    Suitability::parse(raw).ok_or_else(|| format!("'{raw}' is not one of Yes, Ok, No"))
}

pub(crate) fn parse_swell_suitability(raw: &str) -> Result<SwellSuitability, String> {
    SwellSuitability::parse(raw)
        .ok_or_else(|| format!("'{raw}' is not one of Yes, Ok, No, Too Big"))
}

pub(crate) fn parse_bearing(raw: &str) -> Result<CompassBearing, String> {
    CompassBearing::parse(raw).ok_or_else(|| format!("'{raw}' is not a 16-point compass bearing"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn storage_config(backend: StoreBackend, dir: &str) -> StorageConfig {
        StorageConfig {
            backend,
            data_dir: std::env::temp_dir().join(format!("surf-log-api-{dir}-{}", std::process::id())),
            table_key: StorageConfig::DEFAULT_TABLE_KEY.to_string(),
            owner_id: "tester".to_string(),
        }
    }

    fn record() -> ObservationRecord {
        ObservationRecord {
            break_name: "Strickland".to_string(),
            ..ObservationRecord::default()
        }
    }

    #[test]
    fn csv_backend_persists_under_data_dir() {
        let config = storage_config(StoreBackend::CsvTable, "csv");
        let _ = std::fs::remove_dir_all(&config.data_dir);
        let repository = ConfiguredRepository::from_config(&config);

        let id = repository.save(record()).expect("save");
        assert_eq!(id, RecordId::from("0"));
        let path: PathBuf = config.data_dir.join(&config.table_key);
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&config.data_dir);
    }

    #[test]
    fn row_backend_tags_rows_with_owner() {
        let config = storage_config(StoreBackend::Rows, "rows");
        let repository = ConfiguredRepository::from_config(&config);

        let id = repository.save(record()).expect("save");
        let stored = repository.find(&id).expect("find");
        assert_eq!(stored.record.owner_id.as_deref(), Some("tester"));
    }

    #[test]
    fn durable_repository_refuses_in_memory_rows() {
        let config = storage_config(StoreBackend::Rows, "durable-rows");
        let error = ConfiguredRepository::durable(&config)
            .err()
            .expect("row store is process-local");
        assert!(matches!(error, ConfigError::EphemeralStore(StoreBackend::Rows)));
        assert!(error.to_string().contains("SURF_STORE=csv"));

        let config = storage_config(StoreBackend::CsvTable, "durable-csv");
        assert!(matches!(
            ConfiguredRepository::durable(&config),
            Ok(ConfiguredRepository::CsvTable(_))
        ));
    }

    #[test]
    fn parsers_accept_labels_and_reject_garbage() {
        assert_eq!(parse_visibility("public"), Ok(Visibility::Public));
        assert_eq!(parse_swell_suitability("Too Big"), Ok(SwellSuitability::TooBig));
        assert_eq!(parse_suitability("ok"), Ok(Suitability::Ok));
        assert_eq!(parse_bearing("wsw"), Ok(CompassBearing::WSW));
        assert!(parse_bearing("up").is_err());
    }
}
