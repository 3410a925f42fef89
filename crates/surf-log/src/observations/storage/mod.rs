//! Persistence adapters for the observation log.
//!
//! [`CsvTableRepository`] keeps the whole log as one CSV object and rewrites it
//! on every change. [`RowStoreRepository`] keeps one row per record in a
//! multi-user store and scopes every mutation to the owning user.

mod csv_table;
mod object_store;
mod row_store;

pub use csv_table::CsvTableRepository;
pub use object_store::{FilesystemObjectStore, InMemoryObjectStore, ObjectStore, ObjectStoreError};
pub use row_store::{InMemoryRowBackend, Row, RowBackend, RowStoreRepository};
