use std::sync::Arc;

use surf_log::observations::storage::{CsvTableRepository, InMemoryObjectStore, ObjectStore};
use surf_log::observations::{
    prepare_for_save, validate_for_submission, CompassBearing, ObservationRepository,
    ObservationService, RecordFilter, RecordId, SwellSuitability, TideDirection, Violation,
    COLUMNS,
};

const KEY: &str = "Rotto_Tracker.csv";

fn legacy_repository() -> Arc<CsvTableRepository<InMemoryObjectStore>> {
    let data = include_bytes!("../Rotto_Tracker_legacy.csv");
    Arc::new(CsvTableRepository::new(
        InMemoryObjectStore::with_object(KEY, &data[..]),
        KEY,
    ))
}

#[test]
fn legacy_export_loads_with_current_columns() {
    let repository = legacy_repository();
    let loaded = repository
        .load_all(&RecordFilter::default())
        .expect("legacy table loads");
    assert_eq!(loaded.len(), 3);

    let strickland = &loaded[0].record;
    assert_eq!(strickland.break_name, "Strickland");
    assert_eq!(strickland.swell.primary_size_m, Some(1.6));
    assert_eq!(strickland.swell.secondary_size_m, Some(0.9));
    assert_eq!(strickland.swell.period_s, Some(13));
    assert_eq!(strickland.swell.direction_deg, Some(245));
    assert_eq!(strickland.wind.bearing, Some(CompassBearing::ESE));
    assert_eq!(strickland.wind.speed_kn, Some(10));
    assert_eq!(strickland.tide.reading_m, Some(0.5));
    assert_eq!(strickland.tide.direction, Some(TideDirection::Falling));

    let chicken_reef = &loaded[1].record;
    assert_eq!(chicken_reef.swell.suitable, Some(SwellSuitability::TooBig));
    assert_eq!(chicken_reef.swell.secondary_size_m, None);
}

#[test]
fn legacy_rows_rescore_and_validate() {
    let repository = legacy_repository();
    let loaded = repository
        .load_all(&RecordFilter::default())
        .expect("legacy table loads");
    let prepared: Vec<_> = loaded
        .into_iter()
        .map(|stored| prepare_for_save(stored.record))
        .collect();

    assert_eq!(prepared[0].total_score, Some(32.0));
    assert_eq!(prepared[0].full_commentary, "Long lines Light offshore");
    assert_eq!(prepared[1].swell.final_score, Some(0.0));
    assert_eq!(prepared[1].total_score, Some(0.0));
    assert_eq!(prepared[2].total_score, Some(28.0));

    assert!(validate_for_submission(&prepared[0]).is_valid());
    assert_eq!(
        validate_for_submission(&prepared[2]).violations,
        vec![Violation::NoPositiveSwellSize, Violation::MissingComments]
    );
}

#[test]
fn first_write_rewrites_the_table_in_canonical_form() {
    let repository = legacy_repository();
    let service = ObservationService::new(repository.clone());

    let stored = service
        .find(&RecordId::from("0"))
        .expect("first row present");
    service
        .update(&stored.id, stored.record)
        .expect("valid row updates");

    let bytes = repository
        .store()
        .get(KEY)
        .expect("store readable")
        .expect("table present");
    let text = String::from_utf8(bytes).expect("utf8 table");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(COLUMNS.join(",").as_str()));
    assert!(!text.contains("Dropping"));
    assert!(!text.contains("Swell Size,"));

    let first = lines.next().expect("first row");
    assert!(first.starts_with("2023-11-04,07:15:00,Strickland,West End,32.0,1.6,0.9,13,245,Yes,8,8.0"));
    assert_eq!(text.lines().count(), 4);
}
