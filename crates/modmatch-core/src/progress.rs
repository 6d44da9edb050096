/// Trait for reporting scan, match and download progress.
///
/// CLI implements with tracing/indicatif; tests record calls.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_progress(&self, _files_hashed: usize, _current_path: &str) {}
    fn on_scan_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_match_start(&self, _fingerprints: usize) {}
    fn on_match_complete(&self, _exact: usize, _partial: usize) {}
    fn on_download_start(&self, _url: &str, _expected_length: u64) {}
    /// `fraction` is `bytes_written / expected_length`, or a fixed
    /// indeterminate value when the length is unknown.
    fn on_download_progress(&self, _fraction: f64, _bytes_written: u64) {}
    fn on_download_complete(&self, _bytes_written: u64, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Caller-supplied yes/no decision taken when a download target exists.
pub trait OverwriteDecision {
    fn confirm_overwrite(&self, file_name: &str) -> bool;
}

impl<F> OverwriteDecision for F
where
    F: Fn(&str) -> bool,
{
    fn confirm_overwrite(&self, file_name: &str) -> bool {
        self(file_name)
    }
}
