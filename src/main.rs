//! Audial - pattern script retrieval, review and versioning
//!
#![doc = "Audial - pattern script retrieval, review and versioning"]
#![doc = "Main entry point for the Audial command-line tool."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use audial::cli::{Cli, Commands};
use audial::commands;
use audial::config::Config;

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command; `false` means the input was rejected
    let succeeded = match cli.command {
        Commands::Retrieve {
            prompt,
            top_k,
            max_total,
            json,
        } => {
            tracing::info!("Retrieving references");
            commands::retrieve::run_retrieve(&config, &prompt, top_k, max_total, json)?;
            true
        }
        Commands::Expand { prompt } => {
            commands::retrieve::run_expand(&prompt)?;
            true
        }
        Commands::Check {
            file,
            apply,
            note,
            json,
        } => {
            tracing::info!("Reviewing model reply");
            if let Some(path) = &file {
                tracing::debug!("Reading reply from: {}", path.display());
            }
            commands::check::run_check(&config, file.as_deref(), apply, note.as_deref(), json)?
        }
        Commands::Validate { file, json } => {
            tracing::info!("Validating pattern script");
            commands::check::run_validate(&config, file.as_deref(), json)?
        }
        Commands::Prompt { text, mode, top_k } => {
            tracing::info!("Building generation prompt");
            if let Some(m) = &mode {
                tracing::debug!("Using mode override: {}", m);
            }
            commands::prompt::run_prompt(&config, &text, mode.as_deref(), top_k)?;
            true
        }
        Commands::Session { command } => {
            tracing::info!("Starting session command");
            commands::session::handle_session(&config, command)?;
            true
        }
        Commands::Dataset { command } => {
            tracing::info!("Starting dataset command");
            commands::dataset::handle_dataset(&config, command)?
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "audial=debug" } else { "audial=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
