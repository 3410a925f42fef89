use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Number, Value};
use tracing::{info, warn};

use crate::observations::domain::{ObservationRecord, RecordId, Visibility};
use crate::observations::ingest::mapping::{display_column_for, native_column_for};
use crate::observations::ingest::{ingest, to_raw, RawRecord, NUMERIC_COLUMNS};
use crate::observations::repository::{
    ObservationRepository, RecordFilter, RepositoryError, StoredObservation,
};

/// One row in storage-native (snake_case) form.
pub type Row = Map<String, Value>;

const ID_COLUMN: &str = "id";
const OWNER_COLUMN: &str = "user_id";
const VISIBILITY_COLUMN: &str = "publicity";

/// Per-record table access, scoped by the acting user's id.
pub trait RowBackend: Send + Sync {
    /// Rows owned by `owner_id` plus rows tagged public.
    fn select(&self, owner_id: &str) -> Result<Vec<Row>, RepositoryError>;
    /// Stores a new row and returns the id the backend assigned to it.
    fn insert(&self, row: Row) -> Result<String, RepositoryError>;
    fn update(&self, id: &str, owner_id: &str, row: Row) -> Result<(), RepositoryError>;
    fn delete(&self, id: &str, owner_id: &str) -> Result<(), RepositoryError>;
}

impl<T: RowBackend + ?Sized> RowBackend for Arc<T> {
    fn select(&self, owner_id: &str) -> Result<Vec<Row>, RepositoryError> {
        (**self).select(owner_id)
    }

    fn insert(&self, row: Row) -> Result<String, RepositoryError> {
        (**self).insert(row)
    }

    fn update(&self, id: &str, owner_id: &str, row: Row) -> Result<(), RepositoryError> {
        (**self).update(id, owner_id, row)
    }

    fn delete(&self, id: &str, owner_id: &str) -> Result<(), RepositoryError> {
        (**self).delete(id, owner_id)
    }
}

#[derive(Debug, Default)]
struct RowTable {
    next_id: u64,
    rows: BTreeMap<u64, Row>,
}

/// Row backend held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRowBackend {
    table: Mutex<RowTable>,
}

impl InMemoryRowBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_table<T>(
        &self,
        f: impl FnOnce(&mut RowTable) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut guard = self
            .table
            .lock()
            .map_err(|_| RepositoryError::Storage("row table lock poisoned".to_string()))?;
        f(&mut guard)
    }
}

fn text_column<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}

fn owned_row<'a>(
    table: &'a mut RowTable,
    id: &str,
    owner_id: &str,
) -> Result<(u64, &'a mut Row), RepositoryError> {
    let key = id.parse::<u64>().map_err(|_| RepositoryError::NotFound)?;
    let row = table.rows.get_mut(&key).ok_or(RepositoryError::NotFound)?;
    if text_column(row, OWNER_COLUMN) != Some(owner_id) {
        return Err(RepositoryError::Forbidden);
    }
    Ok((key, row))
}

impl RowBackend for InMemoryRowBackend {
    fn select(&self, owner_id: &str) -> Result<Vec<Row>, RepositoryError> {
        self.with_table(|table| {
            Ok(table
                .rows
                .values()
                .filter(|row| {
                    text_column(row, OWNER_COLUMN) == Some(owner_id)
                        || text_column(row, VISIBILITY_COLUMN) == Some(Visibility::Public.label())
                })
                .cloned()
                .collect())
        })
    }

    fn insert(&self, mut row: Row) -> Result<String, RepositoryError> {
        self.with_table(|table| {
            table.next_id += 1;
            let id = table.next_id;
            row.insert(ID_COLUMN.to_string(), Value::from(id));
            table.rows.insert(id, row);
            Ok(id.to_string())
        })
    }

    fn update(&self, id: &str, owner_id: &str, mut row: Row) -> Result<(), RepositoryError> {
        self.with_table(|table| {
            let (key, existing) = owned_row(table, id, owner_id)?;
            row.insert(ID_COLUMN.to_string(), Value::from(key));
            row.insert(OWNER_COLUMN.to_string(), Value::from(owner_id));
            *existing = row;
            Ok(())
        })
    }

    fn delete(&self, id: &str, owner_id: &str) -> Result<(), RepositoryError> {
        self.with_table(|table| {
            let (key, _) = owned_row(table, id, owner_id)?;
            table.rows.remove(&key);
            Ok(())
        })
    }
}

/// Multi-user adapter translating records to and from snake_case rows.
pub struct RowStoreRepository<B> {
    backend: B,
    owner_id: String,
}

impl<B: RowBackend> RowStoreRepository<B> {
    pub fn new(backend: B, owner_id: impl Into<String>) -> Self {
        Self {
            backend,
            owner_id: owner_id.into(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn to_row(&self, record: &ObservationRecord) -> Row {
        let mut row = Row::new();
        for (display, value) in to_raw(record).iter() {
            if let Some(native) = native_column_for(display) {
                row.insert(native.to_string(), json_value(display, value));
            }
        }
        row.insert(OWNER_COLUMN.to_string(), Value::from(self.owner_id.as_str()));
        row.insert(
            VISIBILITY_COLUMN.to_string(),
            Value::from(record.effective_visibility().label()),
        );
        row
    }
}

fn json_value(display: &str, value: Option<&str>) -> Value {
    let Some(text) = value else {
        return Value::Null;
    };
    if NUMERIC_COLUMNS.contains(&display) {
        if let Ok(whole) = text.parse::<i64>() {
            return Value::from(whole);
        }
        if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }
    Value::String(text.to_string())
}

fn from_row(row: &Row) -> Result<StoredObservation, RepositoryError> {
    let id = match row.get(ID_COLUMN) {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(RepositoryError::Storage("row is missing its id".to_string())),
    };

    let display_fields: Map<String, Value> = row
        .iter()
        .filter_map(|(native, value)| {
            display_column_for(native).map(|display| (display.to_string(), value.clone()))
        })
        .collect();
    let mut record = ingest(&RawRecord::from_json_map(&display_fields));
    record.owner_id = text_column(row, OWNER_COLUMN).map(str::to_string);
    record.visibility = text_column(row, VISIBILITY_COLUMN).and_then(Visibility::parse);

    Ok(StoredObservation {
        id: RecordId(id),
        record,
    })
}

impl<B: RowBackend> ObservationRepository for RowStoreRepository<B> {
    fn load_all(&self, filter: &RecordFilter) -> Result<Vec<StoredObservation>, RepositoryError> {
        let rows = self.backend.select(&self.owner_id)?;
        let mut stored = Vec::with_capacity(rows.len());
        for row in &rows {
            match from_row(row) {
                Ok(observation) if filter.matches(&observation.record) => stored.push(observation),
                Ok(_) => {}
                Err(err) => warn!(error = %err, "skipping unreadable row"),
            }
        }
        Ok(stored)
    }

    fn save(&self, record: ObservationRecord) -> Result<RecordId, RepositoryError> {
        let id = self.backend.insert(self.to_row(&record))?;
        info!(record_id = %id, owner = %self.owner_id, "observation row inserted");
        Ok(RecordId(id))
    }

    fn update(&self, id: &RecordId, record: ObservationRecord) -> Result<(), RepositoryError> {
        self.backend
            .update(&id.0, &self.owner_id, self.to_row(&record))?;
        info!(record_id = %id, owner = %self.owner_id, "observation row updated");
        Ok(())
    }

    fn delete(&self, id: &RecordId) -> Result<(), RepositoryError> {
        self.backend.delete(&id.0, &self.owner_id)?;
        info!(record_id = %id, owner = %self.owner_id, "observation row deleted");
        Ok(())
    }
}
