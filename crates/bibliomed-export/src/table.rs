//! CSV export of the record table.
//!
//! Header row is `title,date,source,abstract,url,summary`; the source column
//! carries the record's tag (`literature-index` / `web`) so a file written here
//! reads back into identical records.

use std::io::{Read, Write};
use std::path::Path;

use bibliomed_common::{BibliomedError, Result};
use bibliomed_ingestion::models::{Record, COLUMNS};
use tracing::debug;

/// Write `records` as CSV, header first. An empty slice still produces the header.
pub fn write_csv<W: Write>(records: &[Record], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(COLUMNS)?;
    for record in records {
        wtr.write_record(record.to_row())?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_bytes(records: &[Record]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(buf)
}

pub fn write_csv_file(records: &[Record], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(records, file)?;
    debug!(path = %path.display(), rows = records.len(), "Wrote CSV export");
    Ok(())
}

/// Read a CSV produced by `write_csv` back into records.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?;
    if !headers.iter().eq(COLUMNS.iter().copied()) {
        return Err(BibliomedError::InvalidRow(format!(
            "unexpected header: {}",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let fields: Vec<&str> = row.iter().collect();
        records.push(Record::from_row(&fields)?);
    }
    Ok(records)
}
