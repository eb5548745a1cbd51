//! Command-line interface module for junksort.
//!
//! Parses the single `--source` option, runs the dispatcher over that folder
//! and prints the outcome.

use crate::config::Config;
use crate::dispatcher::{Dispatcher, RunError, RunReport};
use crate::output::OutputFormatter;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Sort a folder into category subfolders and unpack its archives.
#[derive(Debug, Parser)]
#[command(name = "junksort", version, about)]
pub struct Args {
    /// Folder to sort
    #[arg(short, long)]
    pub source: PathBuf,
}

/// Runs a full sort of `dir_path`, loading configuration from the usual places.
///
/// Per-file problems are printed but do not make this fail; only an unusable
/// root, a broken configuration or a pool start failure do.
///
/// ```no_run
/// use junksort::cli::run_cli;
/// use std::path::Path;
///
/// match run_cli(Path::new("/home/user/Downloads")) {
///     Ok(report) => println!("{} files moved", report.moved.len()),
///     Err(e) => eprintln!("Error: {e}"),
/// }
/// ```
pub fn run_cli(dir_path: &Path) -> Result<RunReport, RunError> {
    run_cli_with_config(dir_path, None)
}

/// Same as [`run_cli`], with an explicit configuration file.
pub fn run_cli_with_config(
    dir_path: &Path,
    config_path: Option<&Path>,
) -> Result<RunReport, RunError> {
    let config = Config::load(config_path)?;

    OutputFormatter::info(&format!("Sorting contents of: {}", dir_path.display()));

    let progress = OutputFormatter::create_progress_bar();
    let report = Dispatcher::new(dir_path, config)
        .with_progress(progress)
        .run()?;

    OutputFormatter::success("Files have been sorted");
    if report.archive_phase_ran {
        OutputFormatter::success("Archives have been unpacked");
    }

    OutputFormatter::summary_table(&report);
    OutputFormatter::error_list(&report);

    OutputFormatter::success(&format!("Sorting folder {} completed.", dir_path.display()));
    Ok(report)
}
