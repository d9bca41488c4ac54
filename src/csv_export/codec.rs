//! Table rows to and from CSV text.

use crate::error::{BcError, Result};
use crate::storage::TableData;

/// Serialize `table` as CSV: a header row of column names, then one record
/// per row. NULL becomes an empty cell.
pub fn table_to_csv(table: &TableData) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|v| v.as_deref().unwrap_or("")))?;
    }
    bytes_to_string(writer)
}

/// Parse CSV text produced by [`table_to_csv`]. Empty cells become NULL.
pub fn csv_to_table(name: &str, text: &str) -> Result<TableData> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(strip_bom(text).as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                .collect(),
        );
    }

    Ok(TableData {
        name: name.to_string(),
        columns,
        rows,
    })
}

/// Read raw records including the header, for passes that rewrite a file
/// without interpreting it.
pub(crate) fn read_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(strip_bom(text).as_bytes());
    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?.iter().map(str::to_string).collect());
    }
    Ok(records)
}

pub(crate) fn write_records(records: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .flexible(true)
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record)?;
    }
    bytes_to_string(writer)
}

fn bytes_to_string(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|err| BcError::Csv(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| BcError::Csv(err.to_string()))
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}
