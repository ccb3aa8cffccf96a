//! CLI presenter for output formatting
//!
//! Status lines go to stderr; stdout is reserved for command output
//! (config values, JSON reports, encoded audio).

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ConversionReport;

/// Presenter for CLI output formatting
pub struct Presenter {
    progress: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { progress: None }
    }

    /// Start a frame progress bar, or a spinner when the total is unknown.
    ///
    /// The returned handle can be moved into a progress callback.
    pub fn start_progress(&mut self, message: &str, total_frames: Option<u64>) -> ProgressBar {
        let bar = match total_frames {
            Some(total) => {
                let bar = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{msg} [{bar:20.cyan}] {pos}/{len} frames ({percent}%)")
                {
                    bar.set_style(style.progress_chars("█░ "));
                }
                bar
            }
            None => {
                let spinner = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::default_spinner()
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                    .template("{spinner:.cyan} {msg} {pos} frames")
                {
                    spinner.set_style(style);
                }
                spinner.enable_steady_tick(Duration::from_millis(80));
                spinner
            }
        };
        bar.set_message(message.to_string());
        self.progress = Some(bar.clone());
        bar
    }

    /// Mark progress as success and finish
    pub fn progress_success(&mut self, message: &str) {
        if let Some(bar) = self.progress.take() {
            bar.finish_and_clear();
        }
        self.success(message);
    }

    /// Mark progress as failed and finish
    pub fn progress_fail(&mut self, message: &str) {
        if let Some(bar) = self.progress.take() {
            bar.finish_and_clear();
        }
        self.error(message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// One-line human summary of a finished conversion
    pub fn format_report(&self, report: &ConversionReport) -> String {
        let ratio = report
            .ratio()
            .map(|r| format!(", {:.1}% of input", r * 100.0))
            .unwrap_or_default();
        format!(
            "Encoded {} frames ({:.2}s, {} Hz, {} ch) to {} ({}{})",
            report.frames,
            report.duration_secs(),
            report.sample_rate,
            report.channels,
            report.output.display(),
            format_size(report.output_bytes),
            ratio
        )
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Human-readable byte size
pub fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}
