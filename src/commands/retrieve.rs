//! Retrieval and synonym expansion commands

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::retrieval::{retrieve, RetrievedEntry};
use crate::synonyms::expand_prompt;
use colored::Colorize;
use prettytable::{format, row, Table};

/// Ranks the corpus for `prompt` and prints the results
///
/// CLI values override the configured `top_k` and `max_total`. A missing
/// corpus prints a notice and succeeds with no results.
pub fn run_retrieve(
    config: &Config,
    prompt: &str,
    top_k: Option<usize>,
    max_total: Option<usize>,
    json: bool,
) -> Result<()> {
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let max_total = max_total.unwrap_or(config.retrieval.max_total);
    tracing::info!(top_k, max_total, "Retrieving references");

    let dataset = Dataset::from_config(&config.dataset);
    let Some(corpus) = dataset.corpus.get() else {
        if json {
            println!("[]");
        } else {
            println!("{}", "No corpus index found; nothing to retrieve.".yellow());
        }
        return Ok(());
    };

    let results = retrieve(&corpus, prompt, top_k, max_total);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("{}", "No references found.".yellow());
        return Ok(());
    }

    render_results(&results).printstd();
    Ok(())
}

/// Builds the results table
pub fn render_results(results: &[RetrievedEntry<'_>]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(row![
        "#".bold(),
        "ID".bold(),
        "Title".bold(),
        "Score".bold(),
        "Reasons".bold()
    ]);

    for (i, result) in results.iter().enumerate() {
        table.add_row(row![
            i + 1,
            result.entry.id.cyan(),
            super::truncate_chars(&result.entry.title, 40),
            result.score,
            result.reasons.join("; ")
        ]);
    }
    table
}

/// Prints the synonym expansion of `prompt`, one term per line
pub fn run_expand(prompt: &str) -> Result<()> {
    let terms = expand_prompt(prompt);
    println!("{}", terms[0].bold());
    for term in &terms[1..] {
        println!("  {}", term);
    }
    Ok(())
}
