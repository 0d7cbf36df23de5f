//! CSV-backed row source.

use async_trait::async_trait;
use slidewright_core::rows::{CellValue, Record, RowSource};
use slidewright_core::{Result, SlideError};
use std::path::{Path, PathBuf};
use tokio::task;

/// Looks up rows of a headered CSV file by the value of a key column.
///
/// The file is re-read on every lookup so edits are picked up between tool
/// calls. Keys and cells are compared after trimming surrounding whitespace;
/// returned values are the cells as written.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
    key_column: Option<String>,
}

impl CsvRowSource {
    /// Uses the first column as the key column.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key_column: None,
        }
    }

    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lookup_sync(&self, key: &str) -> Result<Option<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| csv_error(&self.path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| csv_error(&self.path, e))?
            .clone();

        let key_index = match &self.key_column {
            Some(column) => headers
                .iter()
                .position(|h| h.trim() == column.trim())
                .ok_or_else(|| SlideError::not_found("column", column.clone()))?,
            None => 0,
        };

        let wanted = key.trim();
        for row in reader.records() {
            let row = row.map_err(|e| csv_error(&self.path, e))?;
            if row.get(key_index).map(str::trim) != Some(wanted) {
                continue;
            }

            let mut record = Record::new();
            for (index, header) in headers.iter().enumerate() {
                let cell = row.get(index).unwrap_or("");
                record.push(header, CellValue::parse(cell));
            }
            return Ok(Some(record));
        }

        Ok(None)
    }
}

fn csv_error(path: &Path, e: csv::Error) -> SlideError {
    match e.kind() {
        csv::ErrorKind::Io(io) => SlideError::io(format!("{}: {}", path.display(), io)),
        _ => SlideError::Serialization {
            format: "CSV".to_string(),
            message: format!("{}: {}", path.display(), e),
        },
    }
}

#[async_trait]
impl RowSource for CsvRowSource {
    async fn lookup(&self, key: &str) -> Result<Option<Record>> {
        let source = self.clone();
        let wanted = key.to_string();
        let record = task::spawn_blocking(move || source.lookup_sync(&wanted))
            .await
            .map_err(|e| SlideError::io(format!("Failed to spawn blocking task: {e}")))??;
        tracing::debug!(
            path = %self.path.display(),
            key,
            found = record.is_some(),
            "CSV lookup"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const COMPANIES: &str = "\
Company,Industry,Employees,Revenue (M),Ticker
Acme,Manufacturing,120,3.5,ACM
Globex,Energy,4500,120.25,007
Initech, Software ,75,0.8,INI
";

    fn source(dir: &TempDir) -> CsvRowSource {
        let path = dir.path().join("companies.csv");
        fs::write(&path, COMPANIES).unwrap();
        CsvRowSource::new(path)
    }

    #[tokio::test]
    async fn test_lookup_returns_row_verbatim() {
        let dir = TempDir::new().unwrap();
        let record = source(&dir).lookup("Globex").await.unwrap().unwrap();

        let headers: Vec<&str> = record.headers().collect();
        assert_eq!(
            headers,
            vec!["Company", "Industry", "Employees", "Revenue (M)", "Ticker"]
        );

        let values: Vec<String> = record.iter().map(|(_, v)| v.to_string()).collect();
        assert_eq!(values, vec!["Globex", "Energy", "4500", "120.25", "007"]);
        assert_eq!(record.get("Employees"), Some(&CellValue::Integer(4500)));
        assert_eq!(record.get("Ticker"), Some(&CellValue::Text("007".into())));
    }

    #[tokio::test]
    async fn test_cells_keep_their_whitespace() {
        let dir = TempDir::new().unwrap();
        let record = source(&dir).lookup(" Initech ").await.unwrap().unwrap();
        assert_eq!(record.get("Industry").unwrap().to_string(), " Software ");
    }

    #[tokio::test]
    async fn test_absent_key_is_none_and_file_untouched() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir);

        assert!(src.lookup("Umbrella").await.unwrap().is_none());
        assert_eq!(fs::read_to_string(src.path()).unwrap(), COMPANIES);
    }

    #[tokio::test]
    async fn test_custom_key_column() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir).with_key_column("Ticker");

        let record = src.lookup("ACM").await.unwrap().unwrap();
        assert_eq!(record.get("Company").unwrap().to_string(), "Acme");
    }

    #[tokio::test]
    async fn test_unknown_key_column_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = source(&dir)
            .with_key_column("Nope")
            .lookup("ACM")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = CsvRowSource::new(dir.path().join("missing.csv"))
            .lookup("Acme")
            .await
            .unwrap_err();
        assert!(matches!(err, SlideError::Io { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_lookups() {
        let dir = TempDir::new().unwrap();
        let src = source(&dir);

        let (acme, initech) = tokio::join!(src.lookup("Acme"), src.lookup("Initech"));
        assert_eq!(acme.unwrap().unwrap().get("Ticker").unwrap().to_string(), "ACM");
        assert_eq!(initech.unwrap().unwrap().get("Ticker").unwrap().to_string(), "INI");
    }
}
