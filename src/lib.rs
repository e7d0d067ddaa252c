//! Audial - pattern script retrieval, review and versioning
//!
//! This library provides the non-UI core of a chat-driven live-coding music
//! assistant: it finds reference compositions for a prompt, builds the
//! prompt for an external model, checks the model's reply before it reaches
//! the editor and keeps versioned editing sessions.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `dataset`: Corpus and style priors documents, loaded lazily and leniently
//! - `synonyms`: Prompt expansion with related style terms
//! - `retrieval`: Weighted ranking of corpus entries against a prompt
//! - `prompts`: Generation prompt assembly
//! - `output_parser`: Code extraction from raw model replies
//! - `validator`: Static checks on pattern scripts
//! - `pipeline`: Parse, validate and commit a reply in one step
//! - `session`: Session aggregate, sled persistence and change notification
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `metrics`: Usage counters and histograms
//! - `cli`, `commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```
//! use audial::{review_output, Config, Review};
//!
//! let config = Config::default();
//! let reply = "Here you go:\n```js\nsetcpm(90)\n$: s(\"bd ~ sd ~\")\n$: s(\"hh*8\").gain(0.3)\n$: note(\"c2 eb2\").s(\"sine\")\n$: note(\"c4 g4\").s(\"triangle\")\n```";
//! let review = review_output(reply, &config.validation);
//! assert!(matches!(review, Review::Accepted { .. }));
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod output_parser;
pub mod pipeline;
pub mod prompts;
pub mod retrieval;
pub mod session;
pub mod synonyms;
pub mod validator;

// Re-export commonly used types
pub use config::Config;
pub use dataset::{CorpusEntry, CorpusIndex, Dataset, StylePriors};
pub use error::{AudialError, Result};
pub use output_parser::{parse_model_output, ParseFailure};
pub use pipeline::{commit, review_output, Review};
pub use retrieval::{retrieve, RetrievedEntry};
pub use session::{GenerationMode, SessionStore};
pub use validator::{validate_pattern, ValidationResult};

#[cfg(test)]
pub mod test_utils;
