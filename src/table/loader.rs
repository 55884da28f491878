//! CSV loading for observation tables

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::{ObservationTable, Value};
use crate::utils::error::{ReportError, Result};

impl ObservationTable {
    /// Load a table from a CSV file with a header row
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ReportError::config(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let table = Self::from_reader(file)?;
        info!(
            "Loaded {} rows x {} columns from {}",
            table.len(),
            table.columns().len(),
            path.display()
        );
        Ok(table)
    }

    /// Load a table from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(ReportError::validation("CSV input has no header row"));
        }
        let mut table = ObservationTable::new(headers);

        for record in csv_reader.records() {
            let record = record?;
            let row: Vec<Value> = record.iter().map(Value::parse).collect();
            table.push_row(row)?;
        }

        debug!("Parsed {} CSV records", table.len());
        Ok(table)
    }
}
