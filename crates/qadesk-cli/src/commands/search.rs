use anyhow::Result;
use qadesk_config::Config;
use qadesk_index::{Match, VectorSpaceIndex, rank};
use qadesk_security::obfuscate_urls;

use crate::startup;

pub async fn handle(config: &Config, query: String, limit: usize) -> Result<()> {
    let dataset = startup::load_dataset(config).await?;
    let index = VectorSpaceIndex::build(dataset.questions())?;

    let matches = rank(&query, &index, limit);
    if matches.iter().all(|m| m.score == 0.0) {
        println!("No stored question shares a term with the query.");
        return Ok(());
    }

    println!("Closest questions (threshold {:.2}):", config.threshold);
    for found in &matches {
        let question = dataset.question(found.index).unwrap_or_default();
        println!("{}", format_match(found, question, config.threshold));
    }

    Ok(())
}

/// One result line; questions are shown with URLs obfuscated
fn format_match(found: &Match, question: &str, threshold: f64) -> String {
    let marker = if found.score >= threshold { "✓" } else { " " };
    format!(
        "  {} {:.3}  [{}] {}",
        marker,
        found.score,
        found.index,
        obfuscate_urls(question)
    )
}
