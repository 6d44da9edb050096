use crate::catalog::{CatalogApi, CatalogClient};
use crate::config::{AppConfig, SettingsProvider};
use crate::error::{Error, FetchError};
use crate::fetcher::Fetcher;
use crate::progress::{OverwriteDecision, ProgressReporter};
use crate::resolver::{ResolvedDownload, Resolver, TargetFile, UrlSource};
use crate::scanner;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Resolves a desired file and downloads it into the mods directory.
pub struct InstallEngine<A: CatalogApi> {
    api: A,
    fetcher: Fetcher,
    config: AppConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstallOutcome {
    Installed {
        path: PathBuf,
        bytes: u64,
        source: UrlSource,
    },
    /// The destination existed and the caller declined to replace it.
    Skipped { path: PathBuf },
    ManualDownload {
        page_url: String,
        mods_directory: PathBuf,
    },
}

impl InstallEngine<CatalogClient> {
    pub fn from_config(config: AppConfig) -> Result<Self, Error> {
        let api = CatalogClient::from_config(&config)?;
        let fetcher = Fetcher::from_config(&config)?;
        Ok(Self::new(api, fetcher, config))
    }
}

impl<A: CatalogApi> InstallEngine<A> {
    pub fn new(api: A, fetcher: Fetcher, config: AppConfig) -> Self {
        Self {
            api,
            fetcher,
            config,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn resolve(&self, target: &TargetFile) -> ResolvedDownload {
        Resolver::from_config(&self.api, &self.config).resolve(target)
    }

    pub fn install(
        &self,
        target: &TargetFile,
        overwrite: &dyn OverwriteDecision,
        reporter: &dyn ProgressReporter,
    ) -> Result<InstallOutcome, Error> {
        let mods_directory = self.config.mods_directory().to_path_buf();

        // The name comes from the catalog and must not reach outside the
        // mods directory.
        let named = !target.file_name.trim().is_empty();
        if named && !scanner::is_plain_file_name(&target.file_name) {
            warn!("Refusing to install file {} as '{}'", target.file_id, target.file_name);
            return Err(Error::UnsafeFileName(target.file_name.clone()));
        }

        let (url, expected_length, source) = match self.resolve(target) {
            ResolvedDownload::Url {
                url,
                expected_length,
                source,
            } => (url, expected_length, source),
            ResolvedDownload::Manual { page_url } => {
                return Ok(InstallOutcome::ManualDownload {
                    page_url,
                    mods_directory,
                });
            }
        };

        if !mods_directory.exists() {
            debug!("Creating {}", mods_directory.display());
            fs::create_dir_all(&mods_directory)?;
        }

        let destination = mods_directory.join(&target.file_name);
        match self
            .fetcher
            .fetch(&url, &destination, expected_length, overwrite, reporter)
        {
            Ok(bytes) => {
                info!("Installed {} ({} bytes)", destination.display(), bytes);
                Ok(InstallOutcome::Installed {
                    path: destination,
                    bytes,
                    source,
                })
            }
            Err(FetchError::Conflict { path }) => Ok(InstallOutcome::Skipped { path }),
            Err(e) => Err(e.into()),
        }
    }
}
