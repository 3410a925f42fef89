use super::schema::column;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Column names written by earlier versions of the log, paired with their
/// current names. Checked in order; the first legacy column found wins.
pub(crate) const LEGACY_COLUMNS: &[(&str, &str)] = &[
    ("Swell Size", column::PRIMARY_SWELL),
    ("Surfline Primary Swell Size", column::PRIMARY_SWELL),
    ("Seabreeze Swell Size", column::SECONDARY_SWELL),
    ("Swell Period", column::SWELL_PERIOD),
    ("Wind Speed", column::WIND_SPEED),
    ("Tide Reading", column::TIDE_READING),
    ("Swell Direction ", column::SWELL_DIRECTION),
    ("Wind Bearing ", column::WIND_BEARING),
];

/// Display column to storage-native (snake_case) column for row stores.
const NATIVE_COLUMNS: &[(&str, &str)] = &[
    (column::DATE, "date"),
    (column::TIME, "time"),
    (column::BREAK, "break"),
    (column::ZONE, "zone"),
    (column::TOTAL_SCORE, "total_score"),
    (column::PRIMARY_SWELL, "surfline_primary_swell_size_m"),
    (column::SECONDARY_SWELL, "seabreeze_swell_m"),
    (column::SWELL_PERIOD, "swell_period_s"),
    (column::SWELL_DIRECTION, "swell_direction"),
    (column::SWELL_SUITABLE, "suitable_swell"),
    (column::SWELL_SCORE, "swell_score"),
    (column::SWELL_FINAL, "final_swell_score"),
    (column::SWELL_COMMENTS, "swell_comments"),
    (column::WIND_BEARING, "wind_bearing"),
    (column::WIND_SPEED, "wind_speed_kn"),
    (column::WIND_SUITABLE, "suitable_wind"),
    (column::WIND_SCORE, "wind_score"),
    (column::WIND_FINAL, "wind_final_score"),
    (column::WIND_COMMENTS, "wind_comments"),
    (column::TIDE_READING, "tide_reading_m"),
    (column::TIDE_DIRECTION, "tide_direction"),
    (column::TIDE_SUITABLE, "tide_suitable"),
    (column::TIDE_SCORE, "tide_score"),
    (column::TIDE_FINAL, "tide_final_score"),
    (column::TIDE_COMMENTS, "tide_comments"),
    (column::FULL_COMMENTARY, "full_commentary"),
];

static DISPLAY_TO_NATIVE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
static NATIVE_TO_DISPLAY: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

pub fn native_column_for(display: &str) -> Option<&'static str> {
    DISPLAY_TO_NATIVE
        .get_or_init(|| NATIVE_COLUMNS.iter().copied().collect())
        .get(display)
        .copied()
}

pub fn display_column_for(native: &str) -> Option<&'static str> {
    NATIVE_TO_DISPLAY
        .get_or_init(|| {
            NATIVE_COLUMNS
                .iter()
                .map(|(display, native)| (*native, *display))
                .collect()
        })
        .get(native)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observations::ingest::COLUMNS;

    #[test]
    fn every_canonical_column_has_a_native_name() {
        for display in COLUMNS {
            let native = native_column_for(display).expect("native column");
            assert_eq!(display_column_for(native), Some(display));
        }
    }

    #[test]
    fn native_names_are_snake_case() {
        assert_eq!(native_column_for("Swell Period (s)"), Some("swell_period_s"));
        assert_eq!(display_column_for("tide_suitable"), Some("Tide Suitable?"));
        assert_eq!(display_column_for("user_id"), None);
    }
}
