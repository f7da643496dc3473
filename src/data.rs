//! CSV ingestion of customer records and CSV output of predictions

use crate::error::Result;
use crate::pipeline::Prediction;
use crate::record::{CustomerRecord, FieldValue};
use std::io;
use std::path::Path;

/// Customer records read from a CSV table, with the header row kept for output.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    /// Column names in file order
    pub headers: Vec<String>,
    pub records: Vec<CustomerRecord>,
}

impl RecordTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load customer records from a CSV file
///
/// # Arguments
/// * `file_path` - Path to a CSV file whose header row names the fields
///
/// # Returns
/// * `RecordTable` with one record per data row
pub fn load_records(file_path: impl AsRef<Path>) -> Result<RecordTable> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?;
    read_table(reader)
}

/// Parse customer records from any CSV source
pub fn read_records<R: io::Read>(source: R) -> Result<RecordTable> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    read_table(reader)
}

fn read_table<R: io::Read>(mut reader: csv::Reader<R>) -> Result<RecordTable> {
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record = headers
            .iter()
            .zip(row.iter())
            // Empty cells are absent fields
            .filter(|(_, cell)| !cell.trim().is_empty())
            .map(|(field, cell)| (field.clone(), FieldValue::parse(cell)))
            .collect::<CustomerRecord>();
        records.push(record);
    }

    tracing::debug!(rows = records.len(), columns = headers.len(), "read CSV records");
    Ok(RecordTable { headers, records })
}

/// Write the input columns followed by `cluster_id` and `segment_name`
pub fn write_predictions<W: io::Write>(
    sink: W,
    table: &RecordTable,
    predictions: &[Prediction],
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);

    let mut header: Vec<&str> = table.headers.iter().map(String::as_str).collect();
    header.extend(["cluster_id", "segment_name"]);
    writer.write_record(&header)?;

    for (record, prediction) in table.records.iter().zip(predictions) {
        let mut row: Vec<String> = table
            .headers
            .iter()
            .map(|field| record.get(field).map(FieldValue::to_string).unwrap_or_default())
            .collect();
        row.push(prediction.cluster_id.to_string());
        row.push(prediction.segment_name.clone());
        writer.write_record(&row)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
