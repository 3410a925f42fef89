use serde_json::{Map, Value};

/// Column names of the human-readable tabular schema.
pub mod column {
    pub const DATE: &str = "Date";
    pub const TIME: &str = "Time";
    pub const BREAK: &str = "Break";
    pub const ZONE: &str = "Zone";
    pub const TOTAL_SCORE: &str = "TOTAL SCORE";
    pub const PRIMARY_SWELL: &str = "Surfline Primary Swell Size (m)";
    pub const SECONDARY_SWELL: &str = "Seabreeze Swell (m)";
    pub const SWELL_PERIOD: &str = "Swell Period (s)";
    pub const SWELL_DIRECTION: &str = "Swell Direction";
    pub const SWELL_SUITABLE: &str = "Suitable Swell?";
    pub const SWELL_SCORE: &str = "Swell Score";
    pub const SWELL_FINAL: &str = "Final Swell Score";
    pub const SWELL_COMMENTS: &str = "Swell Comments";
    pub const WIND_BEARING: &str = "Wind Bearing";
    pub const WIND_SPEED: &str = "Wind Speed (kn)";
    pub const WIND_SUITABLE: &str = "Suitable Wind?";
    pub const WIND_SCORE: &str = "Wind Score";
    pub const WIND_FINAL: &str = "Wind Final Score";
    pub const WIND_COMMENTS: &str = "Wind Comments";
    pub const TIDE_READING: &str = "Tide Reading (m)";
    pub const TIDE_DIRECTION: &str = "Tide Direction";
    pub const TIDE_SUITABLE: &str = "Tide Suitable?";
    pub const TIDE_SCORE: &str = "Tide Score";
    pub const TIDE_FINAL: &str = "Tide Final Score";
    pub const TIDE_COMMENTS: &str = "Tide Comments";
    pub const FULL_COMMENTARY: &str = "Full Commentary";
}

/// Canonical column order used for storage and display.
pub const COLUMNS: [&str; 26] = [
    column::DATE,
    column::TIME,
    column::BREAK,
    column::ZONE,
    column::TOTAL_SCORE,
    column::PRIMARY_SWELL,
    column::SECONDARY_SWELL,
    column::SWELL_PERIOD,
    column::SWELL_DIRECTION,
    column::SWELL_SUITABLE,
    column::SWELL_SCORE,
    column::SWELL_FINAL,
    column::SWELL_COMMENTS,
    column::WIND_BEARING,
    column::WIND_SPEED,
    column::WIND_SUITABLE,
    column::WIND_SCORE,
    column::WIND_FINAL,
    column::WIND_COMMENTS,
    column::TIDE_READING,
    column::TIDE_DIRECTION,
    column::TIDE_SUITABLE,
    column::TIDE_SCORE,
    column::TIDE_FINAL,
    column::TIDE_COMMENTS,
    column::FULL_COMMENTARY,
];

/// Columns holding numbers rather than text.
pub(crate) const NUMERIC_COLUMNS: [&str; 13] = [
    column::TOTAL_SCORE,
    column::PRIMARY_SWELL,
    column::SECONDARY_SWELL,
    column::SWELL_PERIOD,
    column::SWELL_DIRECTION,
    column::SWELL_SCORE,
    column::SWELL_FINAL,
    column::WIND_SPEED,
    column::WIND_SCORE,
    column::WIND_FINAL,
    column::TIDE_READING,
    column::TIDE_SCORE,
    column::TIDE_FINAL,
];

/// Loosely typed record as it arrives from a form, a CSV row, or a JSON body.
///
/// Field order is preserved. A field may be present with no value (`None`),
/// which is distinct from the field being absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<(String, Option<String>)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.set(key, Some(value.into()));
        }
        record
    }

    /// Builds a record from a JSON object, stringifying scalar values.
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let mut record = Self::new();
        for (key, value) in map {
            let text = match value {
                Value::Null => None,
                Value::String(text) => Some(text.clone()),
                Value::Bool(flag) => Some(flag.to_string()),
                Value::Number(number) => Some(number.to_string()),
                other => Some(other.to_string()),
            };
            record.set(key.clone(), text);
        }
        record
    }

    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Value of a column; `None` when the column is absent or empty.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.position(column)
            .and_then(|index| self.fields[index].1.as_deref())
            .filter(|value| !value.is_empty())
    }

    /// Replaces the value in place when the column exists, otherwise appends it.
    pub fn set(&mut self, column: impl Into<String>, value: Option<String>) {
        let column = column.into();
        match self.position(&column) {
            Some(index) => self.fields[index].1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<Option<String>> {
        self.position(column)
            .map(|index| self.fields.remove(index).1)
    }

    /// Renames `from` to `to` unless `to` already exists. Returns whether a rename happened.
    pub fn rename_if_absent(&mut self, from: &str, to: &str) -> bool {
        if self.contains(to) {
            return false;
        }
        match self.position(from) {
            Some(index) => {
                self.fields[index].0 = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(column, _)| column.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.fields
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.fields.iter().position(|(name, _)| name == column)
    }
}

/// Returns a record holding exactly the canonical columns, in canonical order.
///
/// Missing columns are added with no value and unrecognized columns are dropped.
pub fn ensure_schema(record: &RawRecord) -> RawRecord {
    let fields = COLUMNS
        .iter()
        .map(|column| {
            let value = record
                .position(column)
                .and_then(|index| record.fields[index].1.clone());
            (column.to_string(), value)
        })
        .collect();
    RawRecord { fields }
}
