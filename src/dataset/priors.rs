//! Style priors: optional hints describing typical corpus scripts

use super::index::{find_existing, read_json};
use super::lazy::LenientLoad;
use super::types::StylePriors;
use std::path::PathBuf;

impl LenientLoad for StylePriors {
    fn load_lenient(candidates: &[PathBuf]) -> Option<Self> {
        let path = find_existing(candidates)?;
        match read_json::<StylePriors>(&path) {
            Ok(priors) => {
                tracing::debug!(path = %path.display(), "Loaded style priors");
                Some(priors)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Style priors unavailable: {}", e);
                None
            }
        }
    }
}

impl StylePriors {
    /// Renders the priors as short hint lines for a generation prompt
    ///
    /// Empty sections are skipped, so an empty document yields no hints.
    pub fn hint_bullets(&self) -> Vec<String> {
        let mut hints: Vec<String> = self.summary_bullets.clone();

        if !self.do_more_of.is_empty() {
            hints.push(format!("Do more of: {}", self.do_more_of.join(", ")));
        }
        if !self.avoid.is_empty() {
            hints.push(format!("Avoid: {}", self.avoid.join(", ")));
        }
        if !self.common_moves.is_empty() {
            hints.push(format!("Common moves: {}", self.common_moves.join(", ")));
        }

        let voices = &self.typical_voice_count;
        if voices.max > 0 {
            hints.push(format!(
                "Typical voice count: {} (range {}-{})",
                voices.common, voices.min, voices.max
            ));
        }

        if let Some(bucket) = self.tempo_distribution.iter().max_by_key(|b| b.count) {
            if bucket.count > 0 {
                hints.push(format!("Most common tempo range: {} cpm", bucket.range));
            }
        }

        let instruments = top_names(&self.most_common_instruments);
        if !instruments.is_empty() {
            hints.push(format!("Popular instruments: {}", instruments));
        }
        let techniques = top_names(&self.most_common_techniques);
        if !techniques.is_empty() {
            hints.push(format!("Popular techniques: {}", techniques));
        }

        hints
    }
}

fn top_names(counts: &[super::types::NamedCount]) -> String {
    counts
        .iter()
        .take(5)
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
