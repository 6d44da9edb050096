//! The subset of the catalog's wire schema the matching and resolution
//! pipeline reads. Unknown fields are ignored.

use crate::hasher::Fingerprint;
use crate::scanner::FolderFingerprintGroup;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every catalog response wraps its payload in `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileModule {
    pub name: String,
    pub fingerprint: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFile {
    pub id: u32,
    pub mod_id: u32,
    pub display_name: String,
    pub file_name: String,
    pub file_length: u64,
    pub download_url: Option<String>,
    pub file_fingerprint: i64,
    pub modules: Vec<FileModule>,
    pub game_versions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModLinks {
    pub website_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogMod {
    pub id: u32,
    pub name: String,
    pub slug: String,
    pub links: ModLinks,
    pub summary: String,
    pub download_count: u64,
    pub main_file_id: u32,
}

/// One candidate returned by the matching service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FingerprintMatch {
    pub id: u32,
    pub file: CatalogFile,
    pub latest_files: Vec<CatalogFile>,
    pub fingerprints: Vec<Fingerprint>,
}

impl FingerprintMatch {
    /// The candidate's download URL when the catalog supplied a non-empty one.
    pub fn download_url(&self) -> Option<&str> {
        self.file
            .download_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Exact,
    Partial,
    Unmatched,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchResult {
    pub is_cache_built: bool,
    pub exact_matches: Vec<FingerprintMatch>,
    pub exact_fingerprints: Vec<Fingerprint>,
    pub partial_matches: Vec<FingerprintMatch>,
    pub partial_match_fingerprints: HashMap<String, Vec<Fingerprint>>,
    pub installed_fingerprints: Vec<Fingerprint>,
    pub unmatched_fingerprints: Vec<Fingerprint>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.exact_matches.is_empty() && self.partial_matches.is_empty()
    }

    pub fn status_of(&self, fingerprint: Fingerprint) -> MatchStatus {
        if self.exact_fingerprints.contains(&fingerprint) {
            return MatchStatus::Exact;
        }
        let key = fingerprint.to_string();
        let partial = self
            .partial_match_fingerprints
            .iter()
            .any(|(matched, local)| *matched == key || local.contains(&fingerprint));
        if partial {
            MatchStatus::Partial
        } else {
            MatchStatus::Unmatched
        }
    }

    /// First candidate carrying a download URL: exact matches in service
    /// order, then partial matches in service order.
    pub fn first_download_url(&self) -> Option<(&str, MatchKind)> {
        let exact = self
            .exact_matches
            .iter()
            .find_map(FingerprintMatch::download_url)
            .map(|url| (url, MatchKind::Exact));
        exact.or_else(|| {
            self.partial_matches
                .iter()
                .find_map(FingerprintMatch::download_url)
                .map(|url| (url, MatchKind::Partial))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FuzzyMatchResult {
    pub fuzzy_matches: Vec<FingerprintMatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FingerprintMatchRequest<'a> {
    pub fingerprints: &'a [Fingerprint],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyMatchRequest<'a> {
    pub game_id: u32,
    pub fingerprints: &'a [FolderFingerprintGroup],
}
