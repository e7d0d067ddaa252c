//! Configuration management for Audial
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AudialError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Audial
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the corpus index and style priors live
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Exemplar retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Static checks applied to generated pattern scripts
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Session storage settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Dataset location configuration
///
/// The loader probes each directory in `search_dirs` in order and uses the
/// first one that contains the requested file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Candidate dataset directories, relative to the working directory
    #[serde(default = "default_search_dirs")]
    pub search_dirs: Vec<PathBuf>,

    /// File name of the corpus index document
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// File name of the style priors document
    #[serde(default = "default_priors_file")]
    pub priors_file: String,

    /// Subdirectory holding the raw song files referenced by `source_path`
    #[serde(default = "default_collection_dir")]
    pub collection_dir: String,
}

fn default_search_dirs() -> Vec<PathBuf> {
    vec![
        PathBuf::from("public/assets/dataset"),
        PathBuf::from("audial/public/assets/dataset"),
        PathBuf::from("dataset"),
    ]
}

fn default_index_file() -> String {
    "index.json".to_string()
}

fn default_priors_file() -> String {
    "style_priors.json".to_string()
}

fn default_collection_dir() -> String {
    "strudel-songs-collection".to_string()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            search_dirs: default_search_dirs(),
            index_file: default_index_file(),
            priors_file: default_priors_file(),
            collection_dir: default_collection_dir(),
        }
    }
}

impl DatasetConfig {
    /// Candidate paths for the corpus index, in probe order
    pub fn index_candidates(&self) -> Vec<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&self.index_file))
            .collect()
    }

    /// Candidate paths for the style priors, in probe order
    pub fn priors_candidates(&self) -> Vec<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&self.priors_file))
            .collect()
    }

    /// Candidate song collection directories, in probe order
    pub fn collection_dirs(&self) -> Vec<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| dir.join(&self.collection_dir))
            .collect()
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of best-scoring exemplars to return
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Upper bound on returned exemplars, diverse pick included
    #[serde(default = "default_max_total")]
    pub max_total: usize,
}

fn default_top_k() -> usize {
    3
}

fn default_max_total() -> usize {
    4
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_total: default_max_total(),
        }
    }
}

/// Limits used by the pattern script validator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum number of `$:` voice bindings
    #[serde(default = "default_max_voices")]
    pub max_voices: usize,

    /// Maximum number of non-blank, non-comment lines
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Minimum number of non-blank, non-comment lines
    #[serde(default = "default_min_lines")]
    pub min_lines: usize,

    /// Maximum combined count of random and probabilistic calls
    #[serde(default = "default_max_random_usage")]
    pub max_random_usage: usize,

    /// Recommended effects per voice chain; exceeding it only warns
    #[serde(default = "default_max_effects_per_voice")]
    pub max_effects_per_voice: usize,

    /// Hard limit of effect calls on a single voice line
    #[serde(default = "default_max_effect_calls_per_line")]
    pub max_effect_calls_per_line: usize,

    /// Largest accepted `.delayfeedback()` value
    #[serde(default = "default_max_delay_feedback")]
    pub max_delay_feedback: f64,

    /// Largest accepted `.room()` value
    #[serde(default = "default_max_room")]
    pub max_room: f64,

    /// Require a `setcpm(...)` tempo call
    #[serde(default = "default_true")]
    pub require_setcpm: bool,

    /// Reject sample loading from URLs and localhost
    #[serde(default = "default_true")]
    pub reject_localhost: bool,
}

fn default_max_voices() -> usize {
    6
}

fn default_max_lines() -> usize {
    200
}

fn default_min_lines() -> usize {
    5
}

fn default_max_random_usage() -> usize {
    4
}

fn default_max_effects_per_voice() -> usize {
    3
}

fn default_max_effect_calls_per_line() -> usize {
    5
}

fn default_max_delay_feedback() -> f64 {
    0.5
}

fn default_max_room() -> f64 {
    0.8
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_voices: default_max_voices(),
            max_lines: default_max_lines(),
            min_lines: default_min_lines(),
            max_random_usage: default_max_random_usage(),
            max_effects_per_voice: default_max_effects_per_voice(),
            max_effect_calls_per_line: default_max_effect_calls_per_line(),
            max_delay_feedback: default_max_delay_feedback(),
            max_room: default_max_room(),
            require_setcpm: true,
            reject_localhost: true,
        }
    }
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory of the session database; platform data dir when unset
    #[serde(default)]
    pub storage_path: Option<PathBuf>,

    /// How many archived sessions to keep
    #[serde(default = "default_max_previous_sessions")]
    pub max_previous_sessions: usize,

    /// Code a fresh session starts with; built-in template when unset
    #[serde(default)]
    pub default_code: Option<String>,
}

fn default_max_previous_sessions() -> usize {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            max_previous_sessions: default_max_previous_sessions(),
            default_code: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AudialError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AudialError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(dir) = std::env::var("AUDIAL_DATASET_DIR") {
            tracing::debug!(dir = %dir, "Env override: AUDIAL_DATASET_DIR");
            self.dataset.search_dirs.insert(0, PathBuf::from(dir));
        }

        if let Ok(top_k) = std::env::var("AUDIAL_TOP_K") {
            match top_k.parse::<usize>() {
                Ok(v) => self.retrieval.top_k = v,
                Err(_) => tracing::warn!("Invalid AUDIAL_TOP_K: {}", top_k),
            }
        }

        if let Ok(max_total) = std::env::var("AUDIAL_MAX_TOTAL") {
            match max_total.parse::<usize>() {
                Ok(v) => self.retrieval.max_total = v,
                Err(_) => tracing::warn!("Invalid AUDIAL_MAX_TOTAL: {}", max_total),
            }
        }

        if let Ok(max_voices) = std::env::var("AUDIAL_MAX_VOICES") {
            match max_voices.parse::<usize>() {
                Ok(v) => self.validation.max_voices = v,
                Err(_) => tracing::warn!("Invalid AUDIAL_MAX_VOICES: {}", max_voices),
            }
        }

        if let Ok(db_path) = std::env::var("AUDIAL_SESSION_DB") {
            tracing::debug!(db_path = %db_path, "Env override: AUDIAL_SESSION_DB");
            self.session.storage_path = Some(PathBuf::from(db_path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(path) = &cli.storage_path {
            self.session.storage_path = Some(PathBuf::from(path));
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all limits are usable before any command runs.
    ///
    /// # Errors
    ///
    /// Returns `AudialError::Config` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(
                AudialError::Config("retrieval.top_k must be greater than 0".to_string()).into(),
            );
        }

        if self.retrieval.max_total == 0 {
            return Err(AudialError::Config(
                "retrieval.max_total must be greater than 0".to_string(),
            )
            .into());
        }

        if self.retrieval.max_total < self.retrieval.top_k {
            return Err(AudialError::Config(format!(
                "retrieval.max_total ({}) must be at least retrieval.top_k ({})",
                self.retrieval.max_total, self.retrieval.top_k
            ))
            .into());
        }

        if self.validation.max_voices == 0 {
            return Err(AudialError::Config(
                "validation.max_voices must be greater than 0".to_string(),
            )
            .into());
        }

        if self.validation.max_lines == 0 || self.validation.max_lines < self.validation.min_lines
        {
            return Err(AudialError::Config(
                "validation.max_lines must be greater than 0 and at least min_lines".to_string(),
            )
            .into());
        }

        if self.session.max_previous_sessions == 0 {
            return Err(AudialError::Config(
                "session.max_previous_sessions must be greater than 0".to_string(),
            )
            .into());
        }

        if self.dataset.search_dirs.is_empty() {
            return Err(AudialError::Config(
                "dataset.search_dirs must list at least one directory".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
