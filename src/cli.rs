//! Command-line interface definition for Audial
//!
//! This module defines the CLI structure using clap's derive API, providing
//! commands for retrieval, review of model replies, prompt assembly, session
//! management and dataset inspection.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Audial - pattern script retrieval, review and versioning
///
/// Finds reference compositions for a prompt, checks generated pattern
/// scripts before they reach the editor, and keeps versioned sessions.
#[derive(Parser, Debug, Clone)]
#[command(name = "audial")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override the session database location
    #[arg(long, env = "AUDIAL_SESSION_DB", global = true)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Audial
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rank reference compositions for a prompt
    Retrieve {
        /// Free-text description of the desired music
        prompt: String,

        /// Number of best matches (before the diverse pick)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Maximum number of results
        #[arg(short, long)]
        max_total: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the synonym expansion of a prompt
    Expand {
        /// Prompt to expand
        prompt: String,
    },

    /// Review a raw model reply: extract, validate and optionally apply it
    Check {
        /// File holding the reply (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Commit an accepted script to the current session
        #[arg(long)]
        apply: bool,

        /// Version note used with --apply
        #[arg(short, long)]
        note: Option<String>,

        /// Print the review as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate an already extracted pattern script
    Validate {
        /// Script file (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the generation prompt for a request
    Prompt {
        /// What the user asked for
        text: String,

        /// Generation mode: new or edit (defaults to the session mode)
        #[arg(short, long)]
        mode: Option<String>,

        /// Number of references to include
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Manage the editing session
    Session {
        /// Session subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Inspect the reference dataset
    Dataset {
        /// Dataset subcommand
        #[command(subcommand)]
        command: DatasetCommand,
    },
}

/// Session subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// Show the current session and its code
    Show,

    /// Start a new session, archiving the current one if it has chat
    New {
        /// File with the initial code (defaults to the starter template)
        #[arg(long)]
        code: Option<PathBuf>,
    },

    /// List stored versions of the current session
    History,

    /// Diff a stored version against the current code
    Diff {
        /// Version id or unique id prefix (defaults to the latest version)
        version: Option<String>,
    },

    /// List archived sessions
    Archive,

    /// Clear the current session's chat, keeping code and versions
    Clear,

    /// Record a user message in the current session
    Say {
        /// Message text
        text: String,
    },
}

/// Dataset subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DatasetCommand {
    /// Show where the dataset was found and what it contains
    Info,

    /// Check corpus integrity
    Check,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
