use super::schema::{ensure_schema, RawRecord, COLUMNS};
use std::io::{Read, Write};

/// Reads a comma-separated table into raw records keyed by its header row.
///
/// Headers are taken as written (after trimming), so legacy column names
/// survive until migration. Empty cells become valueless fields.
pub fn read_table<R: Read>(reader: R) -> Result<Vec<RawRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let mut record = RawRecord::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            let value = (!cell.is_empty()).then(|| cell.to_string());
            record.set(header, value);
        }
        records.push(record);
    }

    Ok(records)
}

/// Writes the fixed canonical header followed by one row per record.
pub fn write_table<W: Write>(writer: W, records: &[RawRecord]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(COLUMNS)?;

    for record in records {
        let canonical = ensure_schema(record);
        csv_writer.write_record(canonical.iter().map(|(_, value)| value.unwrap_or("")))?;
    }

    csv_writer.flush()?;
    Ok(())
}
