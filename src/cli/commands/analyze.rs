//! Document analysis commands (text extraction, category analysis, summaries).

use std::path::Path;

use anyhow::Context;
use console::style;

use crate::analysis::AnalysisCategory;
use crate::config::Config;
use crate::services::CloudServices;

use super::super::helpers::read_document_text;

/// Analyze a document for one category and print the structured result.
pub async fn cmd_analyze(config: &Config, file: &Path, analysis_type: &str) -> anyhow::Result<()> {
    let category = AnalysisCategory::from_str(analysis_type).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid analysis type '{}'. Valid types: {}",
            analysis_type,
            AnalysisCategory::names().join(", ")
        )
    })?;

    let services = CloudServices::from_config(config)?;
    let text = read_document_text(&services.extractor(), file).await?;
    if text.trim().is_empty() {
        anyhow::bail!("No text found in {}", file.display());
    }

    println!(
        "{} Analyzing {} ({} characters) for {}",
        style("→").cyan(),
        file.display(),
        text.chars().count(),
        style(category).bold()
    );

    let analysis = services.analysis();
    let result = analysis.analyze(&text, category).await?;

    if let Some(reason) = &result.degraded {
        eprintln!(
            "  {} Model output was not valid JSON, showing defaults ({})",
            style("!").yellow(),
            reason
        );
    }
    match result.confidence() {
        Some(confidence) => println!("  {} Confidence: {}", style("✓").green(), confidence),
        None => println!("  {} Confidence: unknown", style("✓").green()),
    }

    println!("{}", serde_json::to_string_pretty(&result.data)?);
    Ok(())
}

/// Extract text from a document and print it.
pub async fn cmd_extract(config: &Config, file: &Path) -> anyhow::Result<()> {
    let services = CloudServices::from_config(config)?;
    let text = read_document_text(&services.extractor(), file).await?;

    eprintln!(
        "{} Extracted {} characters from {}",
        style("✓").green(),
        text.chars().count(),
        file.display()
    );
    println!("{}", text);
    Ok(())
}

/// Summarize a JSON file of analysis results.
pub async fn cmd_summarize(config: &Config, file: &Path) -> anyhow::Result<()> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let analysis: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let services = CloudServices::from_config(config)?;
    let outcome = services.analysis().summarize(&analysis).await;
    if let Some(reason) = outcome.reason() {
        eprintln!("{} Summary generation failed: {}", style("!").yellow(), reason);
    }
    if let Some(summary) = outcome.into_value() {
        println!("{}", summary);
    }
    Ok(())
}
