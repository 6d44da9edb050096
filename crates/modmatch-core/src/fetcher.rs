use crate::config::AppConfig;
use crate::error::FetchError;
use crate::progress::{OverwriteDecision, ProgressReporter};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::redirect;
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const MAX_REDIRECTS: usize = 10;
pub const CHUNK_SIZE: usize = 4096;
/// Reported as the progress fraction when the expected length is unknown.
pub const INDETERMINATE_PROGRESS: f64 = 0.5;

/// Streams a remote file to disk.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::new(
            &config.user_agent,
            Duration::from_secs(config.download_timeout_secs),
        )
    }

    /// Download `url` into `destination`, returning the bytes written.
    ///
    /// An existing destination is only replaced when `overwrite` agrees;
    /// otherwise nothing is requested and the file is left as it was.
    /// Partial output is not removed on failure.
    pub fn fetch(
        &self,
        url: &str,
        destination: &Path,
        expected_length: u64,
        overwrite: &dyn OverwriteDecision,
        reporter: &dyn ProgressReporter,
    ) -> Result<u64, FetchError> {
        if destination.exists() {
            let file_name = destination
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !overwrite.confirm_overwrite(&file_name) {
                info!("Keeping existing {}", destination.display());
                return Err(FetchError::Conflict {
                    path: destination.to_path_buf(),
                });
            }
            debug!("Overwriting {}", destination.display());
        }

        reporter.on_download_start(url, expected_length);
        let start = Instant::now();

        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, "*/*")
            .send()
            .map_err(|e| {
                if e.is_redirect() {
                    FetchError::TooManyRedirects
                } else {
                    FetchError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("GET {} answered {}", url, status);
            return Err(FetchError::Remote {
                status: status.as_u16(),
            });
        }

        let mut file = File::create(destination).map_err(|source| FetchError::Io {
            path: destination.to_path_buf(),
            source,
        })?;

        let mut buffer = [0u8; CHUNK_SIZE];
        let mut written: u64 = 0;
        loop {
            let read = match response.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FetchError::Stream(e)),
            };
            file.write_all(&buffer[..read])
                .map_err(|source| FetchError::Io {
                    path: destination.to_path_buf(),
                    source,
                })?;
            written += read as u64;
            reporter.on_download_progress(progress_fraction(written, expected_length), written);
        }
        file.flush().map_err(|source| FetchError::Io {
            path: destination.to_path_buf(),
            source,
        })?;

        let elapsed = start.elapsed().as_secs_f64();
        reporter.on_download_complete(written, elapsed);
        info!(
            "Downloaded {} bytes to {} in {:.2}s",
            written,
            destination.display(),
            elapsed
        );
        Ok(written)
    }
}

/// Progress is not clamped: a server sending more than declared yields
/// values above 1.0.
pub fn progress_fraction(written: u64, expected_length: u64) -> f64 {
    if expected_length > 0 {
        written as f64 / expected_length as f64
    } else {
        INDETERMINATE_PROGRESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(50, 100), 0.5);
        assert_eq!(progress_fraction(100, 100), 1.0);
        assert_eq!(progress_fraction(1234, 0), INDETERMINATE_PROGRESS);
        assert!(progress_fraction(150, 100) > 1.0);
    }

    #[test]
    fn test_invalid_user_agent_fails_before_any_request() {
        let err = Fetcher::new("bad\nagent", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, FetchError::Client(_)));
        assert_eq!(err.stage(), crate::error::FetchStage::Setup);
        assert!(!err.is_abandoned());
    }
}
