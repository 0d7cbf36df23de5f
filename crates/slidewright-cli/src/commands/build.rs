use super::runtime::Runtime;
use anyhow::{Context, Result};
use slidewright_core::SessionContext;

pub async fn run(runtime: &Runtime, company: &str) -> Result<()> {
    println!("Building deck for {company}...");

    let mut ctx = SessionContext::new();
    let document_id = runtime
        .orchestrator()
        .build_presentation(&mut ctx, company)
        .await
        .with_context(|| format!("Failed to build deck for {company}"))?;

    println!("Document ID: {document_id}");
    runtime.show_document(&document_id).await
}
