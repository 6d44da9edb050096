use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use modmatch_core::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
/// Bar resolution for download progress, which arrives as a fraction.
const DOWNLOAD_STEPS: u64 = 1000;

/// CLI progress reporter using indicatif progress bars.
///
/// - Scan phase: spinner (file count unknown upfront)
/// - Match phase: spinner while the catalog answers
/// - Download phase: bar, or a spinner when the length is unknown
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    /// Clear whatever bar is showing, e.g. when an operation fails midway.
    pub fn abandon(&self) {
        self.finish_bar();
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    fn spinner(&self, message: &str) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars(TICK_CHARS));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }
}

impl Drop for CliReporter {
    fn drop(&mut self) {
        self.finish_bar();
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self) {
        self.spinner("Fingerprinting files...");
    }

    fn on_scan_progress(&self, files_hashed: usize, _current_path: &str) {
        self.with_bar(|pb| pb.set_message(format!("Fingerprinting... {} files", files_hashed)));
    }

    fn on_scan_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} Scan complete: {} files in {:.2}s",
            "✓".green(),
            total_files,
            duration_secs
        );
    }

    fn on_match_start(&self, fingerprints: usize) {
        self.spinner(&format!("Matching {} fingerprints...", fingerprints));
    }

    fn on_match_complete(&self, exact: usize, partial: usize) {
        self.finish_bar();
        eprintln!(
            "  {} Match complete: {} exact, {} partial",
            "✓".green(),
            exact,
            partial
        );
    }

    fn on_download_start(&self, url: &str, expected_length: u64) {
        if expected_length == 0 {
            self.spinner(&format!("Downloading {}", url));
            return;
        }
        let pb = ProgressBar::new(DOWNLOAD_STEPS);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Downloading [{bar:30.cyan/dim}] {percent}% {msg}",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_download_progress(&self, fraction: f64, bytes_written: u64) {
        self.with_bar(|pb| {
            let position = (fraction.clamp(0.0, 1.0) * DOWNLOAD_STEPS as f64) as u64;
            pb.set_position(position);
            pb.set_message(modmatch_core::scanner::format_file_size(bytes_written));
        });
    }

    fn on_download_complete(&self, bytes_written: u64, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} Download complete: {} in {:.2}s",
            "✓".green(),
            modmatch_core::scanner::format_file_size(bytes_written),
            duration_secs
        );
    }
}
