use crate::catalog::{CatalogApi, FuzzyMatchResult, MatchResult};
use crate::error::Error;
use crate::hasher::Fingerprint;
use crate::progress::ProgressReporter;
use crate::scanner::{self, FolderFingerprintGroup};
use std::path::Path;
use tracing::info;

/// Outcome of matching a directory's content against the catalog.
#[derive(Debug, Clone)]
pub struct Identification {
    pub fingerprints: Vec<Fingerprint>,
    pub result: MatchResult,
    /// True when the game-scoped match found nothing exact and the
    /// catalog-wide endpoint answered instead.
    pub used_generic: bool,
}

pub fn identify_directory<A: CatalogApi + ?Sized>(
    api: &A,
    root: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<Identification, Error> {
    let fingerprints = scanner::scan_directory_with_progress(root, reporter)?;
    if fingerprints.is_empty() {
        info!("No content files under {}", root.display());
        return Ok(Identification {
            fingerprints,
            result: MatchResult::default(),
            used_generic: false,
        });
    }

    reporter.on_match_start(fingerprints.len());
    let mut result = api.match_exact(&fingerprints)?;
    let mut used_generic = false;
    if result.exact_matches.is_empty() {
        info!("No game-scoped exact matches, retrying catalog-wide");
        result = api.match_exact_generic(&fingerprints)?;
        used_generic = true;
    }
    reporter.on_match_complete(result.exact_matches.len(), result.partial_matches.len());

    Ok(Identification {
        fingerprints,
        result,
        used_generic,
    })
}

/// Folder-level similarity matching. Results are advisory only.
pub fn fuzzy_identify<A: CatalogApi + ?Sized>(
    api: &A,
    root: &Path,
    reporter: &dyn ProgressReporter,
) -> Result<(Vec<FolderFingerprintGroup>, FuzzyMatchResult), Error> {
    let groups = scanner::scan_directory_grouped_with_progress(root, reporter)?;
    let total: usize = groups.iter().map(|group| group.fingerprints.len()).sum();
    reporter.on_match_start(total);
    let result = api.match_fuzzy(&groups)?;
    reporter.on_match_complete(result.fuzzy_matches.len(), 0);
    Ok((groups, result))
}
