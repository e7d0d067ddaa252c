//! Generation prompt command

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{AudialError, Result};
use crate::prompts::{build_generation_prompt, PromptInput, Reference};
use crate::retrieval::retrieve;
use crate::session::{open_store, GenerationMode};

/// Prints the generation prompt for `text`
///
/// The mode defaults to the session's mode. In edit mode the current code is
/// taken from the session; without a session the new-composition prompt is
/// used.
pub fn run_prompt(
    config: &Config,
    text: &str,
    mode: Option<&str>,
    top_k: Option<usize>,
) -> Result<()> {
    let store = open_store(&config.session)?;
    let mode = match mode {
        Some(name) => GenerationMode::parse_str(name).map_err(AudialError::Config)?,
        None => store.mode(),
    };
    let current_code = store.current_session().map(|s| s.current_code);

    let dataset = Dataset::from_config(&config.dataset);
    let prompt = render_prompt(config, &dataset, mode, text, current_code.as_deref(), top_k);
    println!("{}", prompt);
    Ok(())
}

/// Retrieves references for `text` and assembles the prompt
pub fn render_prompt(
    config: &Config,
    dataset: &Dataset,
    mode: GenerationMode,
    text: &str,
    current_code: Option<&str>,
    top_k: Option<usize>,
) -> String {
    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let max_total = config.retrieval.max_total.max(top_k);

    let references: Vec<Reference> = match dataset.corpus.get() {
        Some(corpus) => retrieve(&corpus, text, top_k, max_total)
            .iter()
            .map(|r| Reference::from_retrieved(r, &dataset.collection_dirs))
            .collect(),
        None => Vec::new(),
    };
    tracing::info!(%mode, references = references.len(), "Building generation prompt");

    let priors = dataset.priors.get();
    build_generation_prompt(&PromptInput {
        mode,
        request: text,
        current_code,
        references: &references,
        priors: priors.as_deref(),
        rules: &config.validation,
    })
}
