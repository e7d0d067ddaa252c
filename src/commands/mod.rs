/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `retrieve`: rank references and show synonym expansion
- `check`:    review raw model replies and validate scripts
- `prompt`:   assemble the generation prompt for a request
- `session`:  inspect and edit the versioned session
- `dataset`:  inspect and check the reference corpus

Handlers print to stdout and return whether the command succeeded in the
domain sense (for example, a rejected reply) so the entrypoint can set the
exit status.
*/

use crate::error::{AudialError, Result};
use std::io::Read;
use std::path::Path;

pub mod check;
pub mod dataset;
pub mod prompt;
pub mod retrieve;
pub mod session;

/// Reads a whole file, or stdin when `file` is `None`
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            AudialError::Config(format!("Failed to read {}: {}", path.display(), e)).into()
        }),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Shortens `text` to `max` characters, marking the cut with "..."
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
