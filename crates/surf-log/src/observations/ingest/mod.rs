//! Record normalization: legacy migration, schema enforcement, lenient
//! coercion into the typed record, and the canonical textual form used for
//! storage.

mod coerce;
pub mod mapping;
pub mod parser;
mod schema;

pub use coerce::{
    coerce_float, coerce_int, lenient_date, lenient_float, lenient_int, lenient_text,
    lenient_time,
};
pub use schema::{column, ensure_schema, RawRecord, COLUMNS};
pub(crate) use schema::NUMERIC_COLUMNS;

use super::domain::{
    CompassBearing, ObservationRecord, Suitability, SwellObservation, SwellSuitability,
    TideDirection, TideObservation, Visibility, WindObservation,
};
use super::scoring::{round1, score_record};
use mapping::LEGACY_COLUMNS;

/// Brings legacy column names and values up to date.
///
/// Column names are trimmed, legacy names are renamed only when the current
/// name is not already present, and the legacy tide label "Dropping" becomes
/// "Falling". Values under already-present current names are never touched.
pub fn migrate_legacy_fields(mut record: RawRecord) -> RawRecord {
    let padded: Vec<String> = record
        .columns()
        .filter(|name| name.trim() != *name)
        .map(str::to_string)
        .collect();
    for name in padded {
        if LEGACY_COLUMNS.iter().any(|(legacy, _)| *legacy == name) {
            continue;
        }
        if !record.rename_if_absent(&name, name.trim()) {
            record.remove(&name);
        }
    }

    for (legacy, current) in LEGACY_COLUMNS {
        record.rename_if_absent(legacy, current);
    }

    if let Some(direction) = record.get(column::TIDE_DIRECTION) {
        if direction.trim() == TideDirection::LEGACY_FALLING {
            record.set(
                column::TIDE_DIRECTION,
                Some(TideDirection::Falling.label().to_string()),
            );
        }
    }

    record
}

/// Keys that may carry a record's visibility; they sit outside the canonical table.
const VISIBILITY_KEYS: [&str; 2] = ["Visibility", "publicity"];

/// Visibility tag supplied alongside the canonical columns, if any.
pub fn visibility_of(raw: &RawRecord) -> Option<Visibility> {
    raw.iter()
        .filter(|(name, _)| {
            VISIBILITY_KEYS
                .iter()
                .any(|key| key.eq_ignore_ascii_case(name.trim()))
        })
        .find_map(|(_, value)| value.and_then(Visibility::parse))
}

/// Normalizes a raw record into the typed canonical record.
///
/// Stored final and total scores are carried over as found; use
/// [`prepare_for_save`] to recompute them. A `Visibility` (or `publicity`)
/// key is read even though it is not a table column.
pub fn ingest(raw: &RawRecord) -> ObservationRecord {
    let record = ensure_schema(&migrate_legacy_fields(raw.clone()));
    let text = |name: &str| lenient_text(record.get(name));
    let one_decimal = |name: &str| lenient_float(record.get(name)).map(round1);
    let sub_score = |name: &str| lenient_int(record.get(name)).map(|score| score.clamp(0, 10) as u8);

    ObservationRecord {
        date: lenient_date(record.get(column::DATE)),
        time: lenient_time(record.get(column::TIME)),
        break_name: text(column::BREAK),
        zone: text(column::ZONE),
        swell: SwellObservation {
            primary_size_m: one_decimal(column::PRIMARY_SWELL),
            secondary_size_m: one_decimal(column::SECONDARY_SWELL),
            period_s: lenient_int(record.get(column::SWELL_PERIOD)),
            direction_deg: lenient_float(record.get(column::SWELL_DIRECTION))
                .map(|degrees| (degrees.round() as i64).rem_euclid(360) as u16),
            suitable: record.get(column::SWELL_SUITABLE).and_then(SwellSuitability::parse),
            score: sub_score(column::SWELL_SCORE),
            final_score: one_decimal(column::SWELL_FINAL),
            comments: text(column::SWELL_COMMENTS),
        },
        wind: WindObservation {
            bearing: record.get(column::WIND_BEARING).and_then(CompassBearing::parse),
            speed_kn: lenient_int(record.get(column::WIND_SPEED)),
            suitable: record.get(column::WIND_SUITABLE).and_then(Suitability::parse),
            score: sub_score(column::WIND_SCORE),
            final_score: one_decimal(column::WIND_FINAL),
            comments: text(column::WIND_COMMENTS),
        },
        tide: TideObservation {
            reading_m: one_decimal(column::TIDE_READING),
            direction: record.get(column::TIDE_DIRECTION).and_then(TideDirection::parse),
            suitable: record.get(column::TIDE_SUITABLE).and_then(Suitability::parse),
            score: sub_score(column::TIDE_SCORE),
            final_score: one_decimal(column::TIDE_FINAL),
            comments: text(column::TIDE_COMMENTS),
        },
        total_score: one_decimal(column::TOTAL_SCORE),
        full_commentary: text(column::FULL_COMMENTARY),
        owner_id: None,
        visibility: visibility_of(raw),
    }
}

/// Re-scores a record and rebuilds its derived fields ahead of persistence.
pub fn prepare_for_save(mut record: ObservationRecord) -> ObservationRecord {
    record.break_name = record.break_name.trim().to_string();
    record.zone = record.zone.trim().to_string();
    for comments in [
        &mut record.swell.comments,
        &mut record.wind.comments,
        &mut record.tide.comments,
    ] {
        *comments = comments.trim().to_string();
    }

    let card = score_record(&record);
    record.swell.final_score = Some(card.swell);
    record.wind.final_score = Some(card.wind);
    record.tide.final_score = Some(card.tide);
    record.total_score = Some(card.total);
    record.full_commentary = record.joined_commentary();
    record
}

/// Canonical textual form of a record, in canonical column order.
pub fn to_raw(record: &ObservationRecord) -> RawRecord {
    fn text(value: &str) -> Option<String> {
        (!value.is_empty()).then(|| value.to_string())
    }
    fn decimal(value: Option<f64>) -> Option<String> {
        value.map(|value| format!("{:.1}", value))
    }
    fn whole<T: ToString>(value: Option<T>) -> Option<String> {
        value.map(|value| value.to_string())
    }

    let fields = [
        (column::DATE, record.date.map(|date| date.format("%Y-%m-%d").to_string())),
        (column::TIME, record.time.map(|time| time.format("%H:%M:%S").to_string())),
        (column::BREAK, text(&record.break_name)),
        (column::ZONE, text(&record.zone)),
        (column::TOTAL_SCORE, decimal(record.total_score)),
        (column::PRIMARY_SWELL, decimal(record.swell.primary_size_m)),
        (column::SECONDARY_SWELL, decimal(record.swell.secondary_size_m)),
        (column::SWELL_PERIOD, whole(record.swell.period_s)),
        (column::SWELL_DIRECTION, whole(record.swell.direction_deg)),
        (
            column::SWELL_SUITABLE,
            record.swell.suitable.map(|s| s.label().to_string()),
        ),
        (column::SWELL_SCORE, whole(record.swell.score)),
        (column::SWELL_FINAL, decimal(record.swell.final_score)),
        (column::SWELL_COMMENTS, text(&record.swell.comments)),
        (
            column::WIND_BEARING,
            record.wind.bearing.map(|b| b.label().to_string()),
        ),
        (column::WIND_SPEED, whole(record.wind.speed_kn)),
        (
            column::WIND_SUITABLE,
            record.wind.suitable.map(|s| s.label().to_string()),
        ),
        (column::WIND_SCORE, whole(record.wind.score)),
        (column::WIND_FINAL, decimal(record.wind.final_score)),
        (column::WIND_COMMENTS, text(&record.wind.comments)),
        (column::TIDE_READING, decimal(record.tide.reading_m)),
        (
            column::TIDE_DIRECTION,
            record.tide.direction.map(|d| d.label().to_string()),
        ),
        (
            column::TIDE_SUITABLE,
            record.tide.suitable.map(|s| s.label().to_string()),
        ),
        (column::TIDE_SCORE, whole(record.tide.score)),
        (column::TIDE_FINAL, decimal(record.tide.final_score)),
        (column::TIDE_COMMENTS, text(&record.tide.comments)),
        (column::FULL_COMMENTARY, text(&record.full_commentary)),
    ];

    let mut raw = RawRecord::new();
    for (name, value) in fields {
        raw.set(name, value);
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_row() -> RawRecord {
        RawRecord::from_pairs([
            ("Date", "2023-11-04"),
            ("Break", " Strickland "),
            ("Swell Size", "1.25"),
            ("Swell Period", "11.7"),
            ("Wind Speed", "12"),
            ("Tide Reading", "0.6"),
            ("Tide Direction", "Dropping"),
            ("Wind Bearing ", "ESE"),
            ("Swell Direction", "247.6"),
        ])
    }

    #[test]
    fn migration_renames_legacy_columns() {
        let migrated = migrate_legacy_fields(legacy_row());
        assert_eq!(migrated.get(column::PRIMARY_SWELL), Some("1.25"));
        assert_eq!(migrated.get(column::SWELL_PERIOD), Some("11.7"));
        assert_eq!(migrated.get(column::WIND_SPEED), Some("12"));
        assert_eq!(migrated.get(column::TIDE_READING), Some("0.6"));
        assert_eq!(migrated.get(column::WIND_BEARING), Some("ESE"));
        assert_eq!(migrated.get(column::TIDE_DIRECTION), Some("Falling"));
        assert!(!migrated.contains("Swell Size"));
    }

    #[test]
    fn migration_never_overwrites_current_columns() {
        let raw = RawRecord::from_pairs([
            ("Swell Size", "3.0"),
            (column::PRIMARY_SWELL, "1.0"),
        ]);
        let migrated = migrate_legacy_fields(raw);
        assert_eq!(migrated.get(column::PRIMARY_SWELL), Some("1.0"));
        assert_eq!(migrated.get("Swell Size"), Some("3.0"));
    }

    #[test]
    fn migration_prefers_first_legacy_alias() {
        let raw = RawRecord::from_pairs([
            ("Surfline Primary Swell Size", "2.0"),
            ("Swell Size", "1.0"),
        ]);
        let migrated = migrate_legacy_fields(raw);
        assert_eq!(migrated.get(column::PRIMARY_SWELL), Some("1.0"));
    }

    #[test]
    fn ingest_coerces_typed_fields() {
        let record = ingest(&legacy_row());
        assert_eq!(record.break_name, "Strickland");
        assert_eq!(record.swell.primary_size_m, Some(1.3));
        assert_eq!(record.swell.period_s, Some(11));
        assert_eq!(record.swell.direction_deg, Some(248));
        assert_eq!(record.wind.bearing, Some(CompassBearing::ESE));
        assert_eq!(record.wind.speed_kn, Some(12));
        assert_eq!(record.tide.direction, Some(TideDirection::Falling));
        assert_eq!(record.swell.secondary_size_m, None);
    }

    #[test]
    fn ingest_wraps_direction_and_clamps_scores() {
        let raw = RawRecord::from_pairs([
            (column::SWELL_DIRECTION, "359.7"),
            (column::SWELL_SCORE, "14"),
            (column::WIND_SCORE, "-3"),
            (column::WIND_BEARING, "nan"),
            (column::WIND_SUITABLE, "Maybe"),
        ]);
        let record = ingest(&raw);
        assert_eq!(record.swell.direction_deg, Some(0));
        assert_eq!(record.swell.score, Some(10));
        assert_eq!(record.wind.score, Some(0));
        assert_eq!(record.wind.bearing, None);
        assert_eq!(record.wind.suitable, None);
    }

    #[test]
    fn prepare_for_save_rescores_and_joins_commentary() {
        let mut record = ObservationRecord::default();
        record.swell.score = Some(8);
        record.swell.suitable = Some(SwellSuitability::Yes);
        record.swell.comments = " clean lines ".to_string();
        record.wind.score = Some(6);
        record.wind.suitable = Some(Suitability::Ok);
        record.tide.score = Some(4);
        record.tide.suitable = Some(Suitability::Yes);
        record.tide.comments = "pushing".to_string();

        let prepared = prepare_for_save(record);
        assert_eq!(prepared.swell.final_score, Some(8.0));
        assert_eq!(prepared.wind.final_score, Some(3.0));
        assert_eq!(prepared.tide.final_score, Some(4.0));
        assert_eq!(prepared.total_score, Some(32.0));
        assert_eq!(prepared.full_commentary, "clean lines  pushing");
    }

    #[test]
    fn to_raw_formats_decimals_and_integers() {
        let mut record = ObservationRecord::default();
        record.swell.primary_size_m = Some(1.0);
        record.swell.period_s = Some(12);
        record.total_score = Some(32.0);
        record.wind.bearing = Some(CompassBearing::NE);

        let raw = to_raw(&record);
        assert!(raw.columns().eq(COLUMNS.iter().copied()));
        assert_eq!(raw.get(column::PRIMARY_SWELL), Some("1.0"));
        assert_eq!(raw.get(column::SWELL_PERIOD), Some("12"));
        assert_eq!(raw.get(column::TOTAL_SCORE), Some("32.0"));
        assert_eq!(raw.get(column::WIND_BEARING), Some("NE"));
        assert_eq!(raw.get(column::BREAK), None);
    }

    #[test]
    fn ingest_reads_visibility_outside_the_table() {
        let mut raw = legacy_row();
        raw.set("Visibility", Some("community".to_string()));
        assert_eq!(ingest(&raw).visibility, Some(Visibility::Community));

        let row = RawRecord::from_pairs([("publicity", "Public")]);
        assert_eq!(ingest(&row).visibility, Some(Visibility::Public));
        assert_eq!(ingest(&legacy_row()).visibility, None);
    }

    #[test]
    fn ingest_of_canonical_form_is_stable() {
        let mut record = ingest(&legacy_row());
        record = prepare_for_save(record);
        let again = ingest(&to_raw(&record));
        assert_eq!(again, record);
    }
}
