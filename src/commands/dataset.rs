use crate::cli::DatasetCommand;
use crate::config::Config;
use crate::dataset::index::find_existing;
use crate::dataset::{check_index, missing_sources, CorpusIndex, Dataset, IndexReport};
use crate::error::Result;
use colored::Colorize;

/// Handle dataset commands
///
/// Returns false when `check` finds integrity errors.
pub fn handle_dataset(config: &Config, command: DatasetCommand) -> Result<bool> {
    match command {
        DatasetCommand::Info => {
            info(config);
            Ok(true)
        }
        DatasetCommand::Check => check(config),
    }
}

fn info(config: &Config) {
    let dataset = Dataset::from_config(&config.dataset);

    match find_existing(dataset.corpus.candidates()) {
        Some(path) => println!("{} {}", "Index:".bold(), path.display()),
        None => println!("{} {}", "Index:".bold(), "not found".yellow()),
    }
    if let Some(corpus) = dataset.corpus.get() {
        println!("  songs:     {}", corpus.len());
        println!("  version:   {}", display_or_dash(&corpus.version));
        println!("  generated: {}", display_or_dash(&corpus.generated_at));
    }

    match find_existing(dataset.priors.candidates()) {
        Some(path) => println!("{} {}", "Priors:".bold(), path.display()),
        None => println!("{} {}", "Priors:".bold(), "not found".yellow()),
    }
    if let Some(priors) = dataset.priors.get() {
        println!("  hints:     {}", priors.hint_bullets().len());
    }

    match dataset.collection_dirs.iter().find(|dir| dir.is_dir()) {
        Some(dir) => println!("{} {}", "Collection:".bold(), dir.display()),
        None => println!("{} {}", "Collection:".bold(), "not found".yellow()),
    }
}

fn check(config: &Config) -> Result<bool> {
    let dataset = Dataset::from_config(&config.dataset);
    let Some(path) = find_existing(dataset.corpus.candidates()) else {
        println!("{}", "No corpus index found.".yellow());
        return Ok(false);
    };

    let index = CorpusIndex::from_file(&path)?;
    let mut report = check_index(&index);
    let collection: Vec<_> = dataset
        .collection_dirs
        .iter()
        .filter(|dir| dir.is_dir())
        .cloned()
        .collect();
    if !collection.is_empty() {
        report.warnings.extend(missing_sources(&index, &collection));
    }

    println!("Checked {} songs in {}", index.len(), path.display());
    print_report(&report);
    Ok(report.is_valid())
}

fn print_report(report: &IndexReport) {
    for error in &report.errors {
        println!("  {} {}", "error:".red().bold(), error);
    }
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }
    if report.is_valid() {
        println!(
            "{} ({} warnings)",
            "Index OK".green().bold(),
            report.warnings.len()
        );
    } else {
        println!(
            "{} ({} errors)",
            "Index has errors".red().bold(),
            report.errors.len()
        );
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
