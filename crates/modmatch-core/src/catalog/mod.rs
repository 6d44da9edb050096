pub mod client;
pub mod models;

pub use client::{CatalogApi, CatalogClient};
pub use models::{
    CatalogFile, CatalogMod, FileModule, FingerprintMatch, FuzzyMatchResult, MatchKind,
    MatchResult, MatchStatus, ModLinks,
};
