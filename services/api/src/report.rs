use crate::infra::{
    parse_bearing, parse_sort_key, parse_sort_order, parse_suitability, parse_swell_suitability,
    parse_visibility, ConfiguredRepository,
};
use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use surf_log::config::AppConfig;
use surf_log::error::AppError;
use surf_log::observations::ingest::parser::{read_table, write_table};
use surf_log::observations::{
    ingest, prepare_for_save, score_record, to_raw, validate_for_submission, CompassBearing,
    ObservationRecord, ObservationService, RawRecord, RecordFilter, ScoreCard, SortKey, SortOrder,
    StoredObservation, Suitability, SwellSuitability, Violation, Visibility,
};

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// Raw swell score (0-10)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub(crate) swell_score: Option<u8>,
    /// Swell suitability: Yes, Ok, No, or Too Big
    #[arg(long, value_parser = parse_swell_suitability)]
    pub(crate) swell_suitable: Option<SwellSuitability>,
    /// Raw wind score (0-10)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub(crate) wind_score: Option<u8>,
    /// Wind suitability: Yes, Ok, or No
    #[arg(long, value_parser = parse_suitability)]
    pub(crate) wind_suitable: Option<Suitability>,
    /// Wind bearing, shown alongside the card
    #[arg(long, value_parser = parse_bearing)]
    pub(crate) wind_bearing: Option<CompassBearing>,
    /// Raw tide score (0-10)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub(crate) tide_score: Option<u8>,
    /// Tide suitability: Yes, Ok, or No
    #[arg(long, value_parser = parse_suitability)]
    pub(crate) tide_suitable: Option<Suitability>,
    /// Print the card as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV export to normalize
    pub(crate) path: PathBuf,
    /// Write the normalized, re-scored table to this path
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Also save every valid row to the configured store
    #[arg(long)]
    pub(crate) save: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Only show records from this zone
    #[arg(long)]
    pub(crate) zone: Option<String>,
    /// Only show records from this break
    #[arg(long = "break")]
    pub(crate) break_name: Option<String>,
    /// Only show records with this visibility (Public, Private, Community)
    #[arg(long, value_parser = parse_visibility)]
    pub(crate) visibility: Option<Visibility>,
    /// Order by total, date, break, primary-swell, secondary-swell, or swell-direction
    #[arg(long, value_parser = parse_sort_key)]
    pub(crate) sort: Option<SortKey>,
    /// asc or desc; totals default to desc, everything else to asc
    #[arg(long, value_parser = parse_sort_order)]
    pub(crate) order: Option<SortOrder>,
    /// Maximum number of records to print
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

pub(crate) fn run_score(args: ScoreArgs) {
    let json = args.json;
    let bearing = args.wind_bearing;
    let card = score_card_for(args);

    if json {
        match serde_json::to_string_pretty(&card) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("Score card unavailable: {err}"),
        }
        return;
    }

    println!("Session score card");
    println!("  Swell: {:.1}", card.swell);
    match bearing {
        Some(bearing) => println!("  Wind:  {:.1} ({})", card.wind, bearing.label()),
        None => println!("  Wind:  {:.1}", card.wind),
    }
    println!("  Tide:  {:.1}", card.tide);
    println!("  Total: {:.1}", card.total);
}

pub(crate) fn score_card_for(args: ScoreArgs) -> ScoreCard {
    let mut record = ObservationRecord::default();
    record.swell.score = args.swell_score;
    record.swell.suitable = args.swell_suitable;
    record.wind.score = args.wind_score;
    record.wind.suitable = args.wind_suitable;
    record.wind.bearing = args.wind_bearing;
    record.tide.score = args.tide_score;
    record.tide.suitable = args.tide_suitable;
    score_record(&record)
}

/// One row of an import after normalization and re-scoring.
#[derive(Debug, Clone)]
pub(crate) struct ImportedRow {
    pub(crate) line: usize,
    pub(crate) record: ObservationRecord,
    pub(crate) violations: Vec<Violation>,
}

pub(crate) fn normalize_rows(rows: Vec<RawRecord>) -> Vec<ImportedRow> {
    rows.iter()
        .enumerate()
        .map(|(index, raw)| {
            let record = prepare_for_save(ingest(raw));
            let violations = validate_for_submission(&record).violations;
            ImportedRow {
                // header is line 1
                line: index + 2,
                record,
                violations,
            }
        })
        .collect()
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs { path, output, save } = args;

    let service = if save {
        let config = AppConfig::load()?;
        Some(ObservationService::new(Arc::new(ConfiguredRepository::durable(
            &config.storage,
        )?)))
    } else {
        None
    };

    let rows = read_table(File::open(&path)?)?;
    let imported = normalize_rows(rows);
    let invalid = imported.iter().filter(|row| !row.violations.is_empty()).count();

    println!("Imported {} rows from {}", imported.len(), path.display());
    for row in imported.iter().filter(|row| !row.violations.is_empty()) {
        let reasons: Vec<String> = row.violations.iter().map(ToString::to_string).collect();
        println!(
            "  line {} ({}): {}",
            row.line,
            display_break(&row.record),
            reasons.join("; ")
        );
    }
    println!("Valid: {}  Needs attention: {}", imported.len() - invalid, invalid);

    if let Some(output) = output {
        let canonical: Vec<RawRecord> = imported.iter().map(|row| to_raw(&row.record)).collect();
        write_table(BufWriter::new(File::create(&output)?), &canonical)?;
        println!("Canonical table written to {}", output.display());
    }

    if let Some(service) = service {
        let mut saved = 0usize;
        for row in imported.into_iter().filter(|row| row.violations.is_empty()) {
            service.submit(row.record)?;
            saved += 1;
        }
        println!("Saved {saved} rows to the configured store");
    }

    Ok(())
}

pub(crate) fn run_list(args: ListArgs) -> Result<(), AppError> {
    let ListArgs {
        zone,
        break_name,
        visibility,
        sort,
        order,
        limit,
    } = args;

    let config = AppConfig::load()?;
    let service = ObservationService::new(Arc::new(ConfiguredRepository::durable(&config.storage)?));
    let filter = RecordFilter {
        visibility,
        zone,
        break_name,
        sort,
        order,
    };

    let records = service.list(&filter)?;
    if records.is_empty() {
        println!("No records yet.");
        return Ok(());
    }

    let shown = limit.unwrap_or(records.len()).min(records.len());
    println!("{} records (showing {})", records.len(), shown);
    for stored in records.iter().take(shown) {
        println!("{}", list_line(stored));
    }
    Ok(())
}

fn display_break(record: &ObservationRecord) -> &str {
    if record.break_name.is_empty() {
        "no break"
    } else {
        &record.break_name
    }
}

pub(crate) fn list_line(stored: &StoredObservation) -> String {
    let record = &stored.record;
    let when = match (record.date, record.time) {
        (Some(date), Some(time)) => format!("{} {}", date.format("%Y-%m-%d"), time.format("%H:%M")),
        (Some(date), None) => date.format("%Y-%m-%d").to_string(),
        _ => "undated".to_string(),
    };
    let zone = if record.zone.is_empty() {
        String::new()
    } else {
        format!(" [{}]", record.zone)
    };
    format!(
        "#{:<4} {:>6.1}  {}{}  {}",
        stored.id.0,
        record.total_score.unwrap_or(0.0),
        display_break(record),
        zone,
        when
    )
}
