use super::models::{
    CatalogFile, CatalogMod, DataEnvelope, FingerprintMatchRequest, FuzzyMatchRequest,
    FuzzyMatchResult, MatchResult,
};
use crate::config::AppConfig;
use crate::error::CatalogError;
use crate::hasher::Fingerprint;
use crate::scanner::FolderFingerprintGroup;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, trace};

const API_KEY_HEADER: &str = "x-api-key";

/// Matching and lookup operations the resolution pipeline depends on.
pub trait CatalogApi {
    /// Exact/partial matching scoped to the configured game.
    fn match_exact(&self, fingerprints: &[Fingerprint]) -> Result<MatchResult, CatalogError>;

    /// Exact/partial matching across every game in the catalog.
    fn match_exact_generic(
        &self,
        fingerprints: &[Fingerprint],
    ) -> Result<MatchResult, CatalogError>;

    /// Folder-level similarity matching.
    fn match_fuzzy(
        &self,
        groups: &[FolderFingerprintGroup],
    ) -> Result<FuzzyMatchResult, CatalogError>;

    /// The catalog's own download URL for a file, `None` when it has none.
    fn file_download_url(&self, mod_id: u32, file_id: u32)
        -> Result<Option<String>, CatalogError>;
}

/// Blocking client for the catalog REST API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
    game_id: u32,
}

impl CatalogClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        game_id: u32,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CatalogError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            game_id,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        Self::new(
            &config.api_base_url,
            &config.api_key,
            config.game_id,
            Duration::from_secs(config.match_timeout_secs),
        )
    }

    pub fn game_id(&self) -> u32 {
        self.game_id
    }

    pub fn get_mod(&self, mod_id: u32) -> Result<CatalogMod, CatalogError> {
        self.get(&format!("/v1/mods/{}", mod_id))
    }

    pub fn get_mod_files(&self, mod_id: u32) -> Result<Vec<CatalogFile>, CatalogError> {
        self.get(&format!("/v1/mods/{}/files", mod_id))
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, CatalogError> {
        self.request(Method::GET, endpoint, Option::<&()>::None)
    }

    fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, CatalogError> {
        self.request(Method::POST, endpoint, Some(body))
    }

    fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, &self.api_key);
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request.send().map_err(|source| CatalogError::Network {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let status = response.status();
        let text = response.text().map_err(|source| CatalogError::Network {
            endpoint: endpoint.to_string(),
            source,
        })?;
        debug!("{} answered {}", endpoint, status);

        if !status.is_success() {
            return Err(CatalogError::Service {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        trace!("Response preview: {}", preview(&text));
        let envelope: DataEnvelope<T> =
            serde_json::from_str(&text).map_err(|source| CatalogError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })?;
        Ok(envelope.data)
    }
}

impl CatalogApi for CatalogClient {
    fn match_exact(&self, fingerprints: &[Fingerprint]) -> Result<MatchResult, CatalogError> {
        let fingerprints = dedup_preserving_order(fingerprints);
        if fingerprints.is_empty() {
            return Ok(MatchResult::default());
        }
        self.post(
            &format!("/v1/fingerprints/{}", self.game_id),
            &FingerprintMatchRequest {
                fingerprints: &fingerprints,
            },
        )
    }

    fn match_exact_generic(
        &self,
        fingerprints: &[Fingerprint],
    ) -> Result<MatchResult, CatalogError> {
        let fingerprints = dedup_preserving_order(fingerprints);
        if fingerprints.is_empty() {
            return Ok(MatchResult::default());
        }
        self.post(
            "/v1/fingerprints",
            &FingerprintMatchRequest {
                fingerprints: &fingerprints,
            },
        )
    }

    fn match_fuzzy(
        &self,
        groups: &[FolderFingerprintGroup],
    ) -> Result<FuzzyMatchResult, CatalogError> {
        let groups: Vec<FolderFingerprintGroup> = groups
            .iter()
            .filter(|group| !group.fingerprints.is_empty())
            .cloned()
            .collect();
        if groups.is_empty() {
            return Ok(FuzzyMatchResult::default());
        }
        self.post(
            "/v1/fingerprints/fuzzy",
            &FuzzyMatchRequest {
                game_id: self.game_id,
                fingerprints: &groups,
            },
        )
    }

    fn file_download_url(
        &self,
        mod_id: u32,
        file_id: u32,
    ) -> Result<Option<String>, CatalogError> {
        let url: Option<String> =
            self.get(&format!("/v1/mods/{}/files/{}/download-url", mod_id, file_id))?;
        Ok(url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty()))
    }
}

fn dedup_preserving_order(fingerprints: &[Fingerprint]) -> Vec<Fingerprint> {
    let mut seen = HashSet::with_capacity(fingerprints.len());
    fingerprints
        .iter()
        .copied()
        .filter(|fingerprint| seen.insert(*fingerprint))
        .collect()
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(100) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
