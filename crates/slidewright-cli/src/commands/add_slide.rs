use super::runtime::Runtime;
use anyhow::{Context, Result};
use slidewright_core::SessionContext;
use slidewright_core::presentation::SlideContentRequest;

/// Shells cannot easily pass newlines, so a literal `\n` separates lines.
fn unescape_lines(content: &str) -> String {
    content.replace("\\n", "\n")
}

pub async fn run(
    runtime: &Runtime,
    document_id: &str,
    title: &str,
    content: &str,
    style: &str,
) -> Result<()> {
    let request = SlideContentRequest::parse(title, &unescape_lines(content), style)?;

    let client = runtime
        .credentials()
        .authorize()
        .await
        .context("Failed to authorize")?;
    let mut ctx = SessionContext::with_client(client);
    ctx.set_document_id(document_id);

    let composition = runtime
        .composer()
        .compose(&ctx, document_id, &request)
        .await
        .with_context(|| format!("Failed to add slide '{title}'"))?;

    println!(
        "Added {} slide {} to {}",
        request.style, composition.slide_id, composition.document_id
    );
    if !runtime.is_dry_run() {
        runtime.show_document(document_id).await?;
    }
    Ok(())
}
