//! Startup import of curated questions

use anyhow::{Context, Result};
use progress::{NewQuestion, QuestionCatalog};
use std::path::Path;
use tracing::info;

/// Parse a JSON array of questions
pub fn parse_questions(raw: &str) -> Result<Vec<NewQuestion>> {
    serde_json::from_str(raw).context("Seed file is not a JSON array of questions")
}

/// Import the questions in `path` when the catalog is still empty.
/// Returns how many questions were imported.
pub async fn seed_catalog(catalog: &QuestionCatalog, path: &Path) -> Result<usize> {
    if !catalog.is_empty().await? {
        info!("Catalog already populated, skipping seed");
        return Ok(0);
    }

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let questions = parse_questions(&raw)?;
    let imported = catalog.import(questions).await?;

    info!(count = imported.len(), path = %path.display(), "Seeded question catalog");
    Ok(imported.len())
}
