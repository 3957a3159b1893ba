mod normalizer;
mod parser;

use crate::workflows::quality::domain::BatchSnapshot;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum BatchImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for BatchImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchImportError::Io(err) => write!(f, "failed to read batch import: {}", err),
            BatchImportError::Csv(err) => write!(f, "invalid batch CSV data: {}", err),
        }
    }
}

impl std::error::Error for BatchImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchImportError::Io(err) => Some(err),
            BatchImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BatchImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BatchImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// A row that could not be imported, with the raw cells for correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRowError {
    pub row: usize,
    pub data: BTreeMap<String, String>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    /// The first few failures; `failed` carries the full count.
    pub errors: Vec<ImportRowError>,
}

/// Bulk CSV import. Rows are handed one by one to a sink (usually the quality
/// service, which derives and stores them); a failing row is recorded and
/// the import carries on.
pub struct BatchImporter {
    error_limit: usize,
}

impl BatchImporter {
    pub fn new(error_limit: usize) -> Self {
        Self { error_limit }
    }

    pub fn from_path<P, F>(&self, path: P, sink: F) -> Result<ImportSummary, BatchImportError>
    where
        P: AsRef<Path>,
        F: FnMut(BatchSnapshot) -> Result<(), String>,
    {
        let file = std::fs::File::open(path)?;
        self.from_reader(file, sink)
    }

    pub fn from_reader<R, F>(
        &self,
        reader: R,
        mut sink: F,
    ) -> Result<ImportSummary, BatchImportError>
    where
        R: Read,
        F: FnMut(BatchSnapshot) -> Result<(), String>,
    {
        let mut summary = ImportSummary::default();

        for parsed in parser::parse_rows(reader)? {
            let outcome = parsed.snapshot.and_then(&mut sink);
            match outcome {
                Ok(()) => summary.imported += 1,
                Err(error) => {
                    warn!(row = parsed.row, %error, "skipping batch import row");
                    summary.failed += 1;
                    if summary.errors.len() < self.error_limit {
                        summary.errors.push(ImportRowError {
                            row: parsed.row,
                            data: parsed.data,
                            error,
                        });
                    }
                }
            }
        }

        debug!(
            imported = summary.imported,
            failed = summary.failed,
            "batch import finished"
        );
        Ok(summary)
    }
}

impl Default for BatchImporter {
    fn default() -> Self {
        Self::new(10)
    }
}
