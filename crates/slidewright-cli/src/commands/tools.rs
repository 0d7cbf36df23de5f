use super::runtime::Runtime;
use anyhow::{Context, Result};
use slidewright_application::PresentationTools;
use slidewright_infrastructure::CsvRowSource;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_CSV: &str = "companies.csv";

pub fn list() -> Result<()> {
    let definitions = PresentationTools::definitions();
    println!("{}", serde_json::to_string_pretty(&definitions)?);
    Ok(())
}

pub async fn call(runtime: &Runtime, tool: &str, args: &str, csv: Option<PathBuf>) -> Result<()> {
    let args: serde_json::Value =
        serde_json::from_str(args).context("Tool arguments must be a JSON object")?;

    let rows = CsvRowSource::new(csv.unwrap_or_else(|| PathBuf::from(DEFAULT_CSV)));
    let tools = PresentationTools::new(runtime.orchestrator(), Arc::new(rows));

    println!("{}", tools.dispatch(tool, args).await);

    if runtime.is_dry_run() {
        if let Some(document_id) = tools.active_document_id().await {
            runtime.show_document(&document_id).await?;
        }
    }
    Ok(())
}
