pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod hasher;
pub mod identify;
pub mod progress;
pub mod resolver;
pub mod scanner;

pub use catalog::{CatalogApi, CatalogClient};
pub use config::{AppConfig, SettingsProvider};
pub use engine::{InstallEngine, InstallOutcome};
pub use error::{CatalogError, Error, FetchError, FetchStage};
pub use fetcher::Fetcher;
pub use progress::{OverwriteDecision, ProgressReporter, SilentReporter};
pub use resolver::{ResolvedDownload, Resolver, TargetFile, UrlSource};
