//! Download location resolution.
//!
//! A desired file is turned into a concrete URL by trying, in order, the
//! URL the catalog declared, a direct lookup, fingerprint matching and
//! finally a CDN URL built from the file id. Failures of the network-backed
//! steps are logged and the next step is tried; the caller only ever sees a
//! URL or a manual-download page.

use crate::catalog::{CatalogApi, CatalogFile, CatalogMod, MatchKind};
use crate::config::AppConfig;
use crate::hasher::Fingerprint;
use tracing::{debug, info, warn};

/// The file a caller wants installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetFile {
    pub file_id: u32,
    pub mod_id: u32,
    pub file_name: String,
    pub file_length: u64,
    pub download_url: Option<String>,
    pub file_fingerprint: Option<Fingerprint>,
    pub module_fingerprints: Vec<Fingerprint>,
    pub mod_slug: Option<String>,
    pub website_url: Option<String>,
}

impl TargetFile {
    pub fn from_catalog(file: &CatalogFile, owner: Option<&CatalogMod>) -> Self {
        // The catalog encodes fingerprints as signed JSON numbers.
        let file_fingerprint = match file.file_fingerprint {
            0 => None,
            value => Some(value as u64),
        };
        let non_empty = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Self {
            file_id: file.id,
            mod_id: file.mod_id,
            file_name: file.file_name.clone(),
            file_length: file.file_length,
            download_url: file.download_url.clone(),
            file_fingerprint,
            module_fingerprints: file
                .modules
                .iter()
                .map(|module| module.fingerprint as u64)
                .collect(),
            mod_slug: owner.and_then(|m| non_empty(&m.slug)),
            website_url: owner.and_then(|m| non_empty(&m.links.website_url)),
        }
    }

    fn declared_url(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Which fallback step produced a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    Declared,
    DirectLookup,
    FingerprintMatch(MatchKind),
    Constructed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedDownload {
    Url {
        url: String,
        expected_length: u64,
        source: UrlSource,
    },
    /// No URL could be produced; the user has to fetch the file by hand.
    Manual { page_url: String },
}

enum Step {
    TryDeclared,
    TryLookup,
    TryFingerprint,
    TryConstructed,
    Done(ResolvedDownload),
}

pub struct Resolver<'a, A: CatalogApi + ?Sized> {
    api: &'a A,
    cdn_base_url: String,
    manual_page_base: String,
}

impl<'a, A: CatalogApi + ?Sized> Resolver<'a, A> {
    /// `manual_page_base` is the catalog site's game root, e.g.
    /// `https://www.curseforge.com/sims4`.
    pub fn new(api: &'a A, cdn_base_url: &str, manual_page_base: &str) -> Self {
        Self {
            api,
            cdn_base_url: cdn_base_url.trim_end_matches('/').to_string(),
            manual_page_base: manual_page_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(api: &'a A, config: &AppConfig) -> Self {
        let manual_page_base = format!(
            "{}/{}",
            config.website_base_url.trim_end_matches('/'),
            config.game_slug
        );
        Self::new(api, &config.cdn_base_url, &manual_page_base)
    }

    pub fn resolve(&self, target: &TargetFile) -> ResolvedDownload {
        let mut step = Step::TryDeclared;
        loop {
            step = match step {
                Step::TryDeclared => match target.declared_url() {
                    Some(url) => Step::Done(self.found(target, url, UrlSource::Declared)),
                    None => Step::TryLookup,
                },
                Step::TryLookup => match self.lookup(target) {
                    Some(url) => Step::Done(self.found(target, &url, UrlSource::DirectLookup)),
                    None => Step::TryFingerprint,
                },
                Step::TryFingerprint => match self.match_by_fingerprint(target) {
                    Some((url, kind)) => Step::Done(self.found(
                        target,
                        &url,
                        UrlSource::FingerprintMatch(kind),
                    )),
                    None => Step::TryConstructed,
                },
                Step::TryConstructed => {
                    if target.file_name.trim().is_empty() {
                        let page_url = self.manual_page_url(target);
                        warn!(
                            "No download location for file {}; manual download from {}",
                            target.file_id, page_url
                        );
                        Step::Done(ResolvedDownload::Manual { page_url })
                    } else {
                        let url =
                            constructed_url(&self.cdn_base_url, target.file_id, &target.file_name);
                        Step::Done(self.found(target, &url, UrlSource::Constructed))
                    }
                }
                Step::Done(resolved) => return resolved,
            };
        }
    }

    fn found(&self, target: &TargetFile, url: &str, source: UrlSource) -> ResolvedDownload {
        info!("Resolved file {} via {:?}: {}", target.file_id, source, url);
        ResolvedDownload::Url {
            url: url.to_string(),
            expected_length: target.file_length,
            source,
        }
    }

    fn lookup(&self, target: &TargetFile) -> Option<String> {
        match self.api.file_download_url(target.mod_id, target.file_id) {
            Ok(Some(url)) => Some(url),
            Ok(None) => {
                debug!("Catalog has no download URL for file {}", target.file_id);
                None
            }
            Err(e) => {
                warn!("Download URL lookup for file {} failed: {}", target.file_id, e);
                None
            }
        }
    }

    fn match_by_fingerprint(&self, target: &TargetFile) -> Option<(String, MatchKind)> {
        let fingerprints = fallback_fingerprints(target);
        debug!(
            "Matching file {} by {} fingerprint(s)",
            target.file_id,
            fingerprints.len()
        );
        match self.api.match_exact(&fingerprints) {
            Ok(result) => result
                .first_download_url()
                .map(|(url, kind)| (url.to_string(), kind)),
            Err(e) => {
                warn!("Fingerprint match for file {} failed: {}", target.file_id, e);
                None
            }
        }
    }

    fn manual_page_url(&self, target: &TargetFile) -> String {
        if let Some(website_url) = &target.website_url {
            return website_url.clone();
        }
        let project = target
            .mod_slug
            .clone()
            .unwrap_or_else(|| target.mod_id.to_string());
        format!(
            "{}/mods/{}/files/{}",
            self.manual_page_base, project, target.file_id
        )
    }
}

/// Fingerprints submitted when matching a target: its own fingerprint,
/// else its modules' fingerprints, else the file id standing in for one.
/// Never empty.
pub fn fallback_fingerprints(target: &TargetFile) -> Vec<Fingerprint> {
    if let Some(fingerprint) = target.file_fingerprint.filter(|f| *f > 0) {
        return vec![fingerprint];
    }

    let modules: Vec<Fingerprint> = target
        .module_fingerprints
        .iter()
        .copied()
        .filter(|f| *f > 0)
        .collect();
    if !modules.is_empty() {
        return modules;
    }

    vec![Fingerprint::from(target.file_id)]
}

/// CDN URL for a file: ids are sharded by thousands.
pub fn constructed_url(cdn_base_url: &str, file_id: u32, file_name: &str) -> String {
    format!(
        "{}/files/{}/{}/{}",
        cdn_base_url.trim_end_matches('/'),
        file_id / 1000,
        file_id % 1000,
        file_name
    )
}
