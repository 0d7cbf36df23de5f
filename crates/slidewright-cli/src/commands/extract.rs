use anyhow::{Context, Result};
use slidewright_core::rows::RowSource;
use slidewright_infrastructure::CsvRowSource;
use std::path::PathBuf;

pub async fn run(csv: PathBuf, key_column: Option<String>, key: &str) -> Result<()> {
    let mut source = CsvRowSource::new(csv);
    if let Some(column) = key_column {
        source = source.with_key_column(column);
    }

    let record = source
        .lookup(key)
        .await
        .with_context(|| format!("Failed to read {}", source.path().display()))?;

    match record {
        Some(record) => println!("{}", record.to_lines()),
        None => println!("No record found for '{key}'"),
    }
    Ok(())
}
