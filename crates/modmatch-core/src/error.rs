use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Download error: {0}")]
    Fetch(#[from] FetchError),

    #[error("'{0}' is not a plain file name")]
    UnsafeFileName(String),
}

/// Failures talking to the catalog's matching and lookup endpoints.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("catalog returned status {status} for {endpoint}")]
    Service {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Which part of a download attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    /// The HTTP client could not be built; nothing was sent.
    Setup,
    Connect,
    Status,
    Stream,
    Write,
    Conflict,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("connection failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("server returned status {status}")]
    Remote { status: u16 },

    #[error("redirect loop detected (more than 10 redirects)")]
    TooManyRedirects,

    #[error("download interrupted: {0}")]
    Stream(#[source] std::io::Error),

    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} already exists and was not overwritten", path.display())]
    Conflict { path: PathBuf },
}

impl FetchError {
    pub fn stage(&self) -> FetchStage {
        match self {
            FetchError::Client(_) => FetchStage::Setup,
            FetchError::Network(_) | FetchError::TooManyRedirects => FetchStage::Connect,
            FetchError::Remote { .. } => FetchStage::Status,
            FetchError::Stream(_) => FetchStage::Stream,
            FetchError::Io { .. } => FetchStage::Write,
            FetchError::Conflict { .. } => FetchStage::Conflict,
        }
    }

    /// A declined overwrite is an abandonment rather than a failure.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, FetchError::Conflict { .. })
    }
}
