//! Output formatting and styling module.
//!
//! Everything the CLI prints to the user goes through [`OutputFormatter`];
//! diagnostics go through `tracing` instead.

use crate::dispatcher::RunReport;
use crate::file_category::Category;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use junksort::output::OutputFormatter;
    /// OutputFormatter::success("Files have been sorted");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar counting folders through the move phase.
    ///
    /// ```no_run
    /// use junksort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar();
    /// pb.set_length(10);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar() -> ProgressBar {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} folders")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints a summary table of delivered files by category.
    pub fn summary_table(report: &RunReport) {
        Self::header("SUMMARY");

        let counts = report.category_counts();
        let width = Category::ALL
            .iter()
            .map(|c| c.dir_name().len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!("{:<width$} | {}", "Category".bold(), "Files".bold());
        println!("{}", "-".repeat(width + 10));

        for category in Category::ALL {
            let Some(count) = counts.get(&category) else {
                continue;
            };
            println!(
                "{:<width$} | {} {}",
                category.dir_name(),
                count.to_string().green(),
                plural(*count, "file", "files")
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            report.moved.len().to_string().green().bold(),
            plural(report.moved.len(), "file", "files")
        );

        if !report.pruned.is_empty() {
            println!(
                "Removed {} empty {}",
                report.pruned.len(),
                plural(report.pruned.len(), "folder", "folders")
            );
        }
        if report.archive_phase_ran {
            println!(
                "Unpacked {} {}",
                report.extracted.len(),
                plural(report.extracted.len(), "archive", "archives")
            );
        }
    }

    /// Lists every non-fatal error of a run.
    pub fn error_list(report: &RunReport) {
        if !report.has_errors() {
            return;
        }

        Self::warning(&format!(
            "{} {} could not be processed:",
            report.errors.len(),
            plural(report.errors.len(), "item", "items")
        ));
        for error in &report.errors {
            Self::error(&error.to_string());
        }
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}
