use std::io::Cursor;
use std::sync::Mutex;

use tracing::{debug, info};

use super::object_store::ObjectStore;
use crate::observations::domain::{ObservationRecord, RecordId};
use crate::observations::ingest::parser::{read_table, write_table};
use crate::observations::ingest::{ensure_schema, ingest, migrate_legacy_fields, to_raw, RawRecord};
use crate::observations::repository::{
    ObservationRepository, RecordFilter, RepositoryError, StoredObservation,
};

/// The whole log as a single CSV object, read whole and rewritten whole.
///
/// Record ids are row positions as of the latest load, so an id is only
/// meaningful until the next delete. The table carries no ownership or
/// visibility metadata: every row belongs to the single user and reads as
/// private.
pub struct CsvTableRepository<S> {
    store: S,
    key: String,
    write_lock: Mutex<()>,
}

impl<S: ObjectStore> CsvTableRepository<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rows as stored, migrated to current column names and padded to the schema.
    fn read_rows(&self) -> Result<Vec<RawRecord>, RepositoryError> {
        let Some(bytes) = self.store.get(&self.key).map_err(RepositoryError::storage)? else {
            debug!(key = %self.key, "no table object yet; treating as empty");
            return Ok(Vec::new());
        };
        let rows = read_table(Cursor::new(bytes)).map_err(RepositoryError::storage)?;
        Ok(rows
            .into_iter()
            .map(|row| ensure_schema(&migrate_legacy_fields(row)))
            .collect())
    }

    fn write_rows(&self, rows: &[RawRecord]) -> Result<(), RepositoryError> {
        let mut buffer = Vec::new();
        write_table(&mut buffer, rows).map_err(RepositoryError::storage)?;
        self.store
            .put(&self.key, buffer)
            .map_err(RepositoryError::storage)?;
        info!(key = %self.key, rows = rows.len(), "observation table rewritten");
        Ok(())
    }

    /// Applies `change` to the loaded rows and rewrites the table, holding
    /// the write lock for the whole read-modify-write.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Vec<RawRecord>) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RepositoryError::Storage("table lock poisoned".to_string()))?;
        let mut rows = self.read_rows()?;
        let outcome = change(&mut rows)?;
        self.write_rows(&rows)?;
        Ok(outcome)
    }
}

fn row_index(id: &RecordId, len: usize) -> Result<usize, RepositoryError> {
    id.0.parse::<usize>()
        .ok()
        .filter(|index| *index < len)
        .ok_or(RepositoryError::NotFound)
}

impl<S: ObjectStore> ObservationRepository for CsvTableRepository<S> {
    fn load_all(&self, filter: &RecordFilter) -> Result<Vec<StoredObservation>, RepositoryError> {
        let rows = self.read_rows()?;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(index, row)| StoredObservation {
                id: RecordId(index.to_string()),
                record: ingest(row),
            })
            .filter(|stored| filter.matches(&stored.record))
            .collect())
    }

    fn save(&self, record: ObservationRecord) -> Result<RecordId, RepositoryError> {
        self.mutate(|rows| {
            rows.push(to_raw(&record));
            Ok(RecordId((rows.len() - 1).to_string()))
        })
    }

    fn update(&self, id: &RecordId, record: ObservationRecord) -> Result<(), RepositoryError> {
        self.mutate(|rows| {
            let index = row_index(id, rows.len())?;
            rows[index] = to_raw(&record);
            Ok(())
        })
    }

    fn delete(&self, id: &RecordId) -> Result<(), RepositoryError> {
        self.mutate(|rows| {
            let index = row_index(id, rows.len())?;
            rows.remove(index);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observations::domain::{TideDirection, Visibility};
    use crate::observations::ingest::COLUMNS;
    use crate::observations::storage::InMemoryObjectStore;

    const KEY: &str = "tracker.csv";

    fn repository(initial: Option<&str>) -> CsvTableRepository<InMemoryObjectStore> {
        let store = match initial {
            Some(csv) => InMemoryObjectStore::with_object(KEY, csv),
            None => InMemoryObjectStore::new(),
        };
        CsvTableRepository::new(store, KEY)
    }

    fn stored_text(repository: &CsvTableRepository<InMemoryObjectStore>) -> String {
        let bytes = repository.store().get(KEY).expect("get").expect("object");
        String::from_utf8(bytes).expect("utf8")
    }

    #[test]
    fn missing_object_is_an_empty_table() {
        let repo = repository(None);
        assert!(repo.load_all(&RecordFilter::default()).expect("load").is_empty());
    }

    #[test]
    fn save_appends_and_writes_canonical_header() {
        let repo = repository(None);
        let record = ObservationRecord {
            break_name: "Strickland".to_string(),
            ..ObservationRecord::default()
        };
        let first = repo.save(record.clone()).expect("save");
        let second = repo.save(record).expect("save");
        assert_eq!(first, RecordId::from("0"));
        assert_eq!(second, RecordId::from("1"));

        let text = stored_text(&repo);
        assert_eq!(text.lines().next(), Some(COLUMNS.join(",").as_str()));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn legacy_rows_load_migrated_and_private() {
        let repo = repository(Some(
            "Break,Swell Size,Tide Direction\nSalmon Bay,1.4,Dropping\n",
        ));
        let loaded = repo.load_all(&RecordFilter::default()).expect("load");
        assert_eq!(loaded.len(), 1);
        let record = &loaded[0].record;
        assert_eq!(record.swell.primary_size_m, Some(1.4));
        assert_eq!(record.tide.direction, Some(TideDirection::Falling));
        assert_eq!(record.effective_visibility(), Visibility::Private);

        let public_only = RecordFilter {
            visibility: Some(Visibility::Public),
            ..RecordFilter::default()
        };
        assert!(repo.load_all(&public_only).expect("load").is_empty());
    }

    #[test]
    fn update_and_delete_address_rows_by_position() {
        let repo = repository(Some("Break\nA\nB\nC\n"));
        let replacement = ObservationRecord {
            break_name: "B2".to_string(),
            ..ObservationRecord::default()
        };
        repo.update(&RecordId::from("1"), replacement).expect("update");
        repo.delete(&RecordId::from("0")).expect("delete");

        let names: Vec<String> = repo
            .load_all(&RecordFilter::default())
            .expect("load")
            .into_iter()
            .map(|stored| stored.record.break_name)
            .collect();
        assert_eq!(names, vec!["B2", "C"]);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let repo = repository(Some("Break\nA\n"));
        assert!(matches!(
            repo.delete(&RecordId::from("7")),
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.update(&RecordId::from("abc"), ObservationRecord::default()),
            Err(RepositoryError::NotFound)
        ));
    }
}
