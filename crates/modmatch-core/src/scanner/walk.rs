use crate::hasher::{fingerprint_file, Fingerprint};
use crate::progress::{ProgressReporter, SilentReporter};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Extensions of content packages the game loads.
pub const CONTENT_EXTENSIONS: &[&str] = &["package", "ts4script"];

/// Fingerprints of the content files directly inside one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderFingerprintGroup {
    #[serde(rename = "foldername")]
    pub folder_name: String,
    pub fingerprints: Vec<Fingerprint>,
}

pub fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| CONTENT_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Recursively fingerprint every content file under `root`.
///
/// Any walk or read failure aborts the whole scan.
pub fn scan_directory(root: &Path) -> io::Result<Vec<Fingerprint>> {
    scan_directory_with_progress(root, &SilentReporter)
}

pub fn scan_directory_with_progress(
    root: &Path,
    reporter: &dyn ProgressReporter,
) -> io::Result<Vec<Fingerprint>> {
    let mut fingerprints = Vec::new();
    walk_content_files(root, reporter, |_, fingerprint| fingerprints.push(fingerprint))?;
    Ok(fingerprints)
}

/// Same walk as [`scan_directory`], bucketed by the immediate parent folder.
/// Groups and their members keep walk order.
pub fn scan_directory_grouped(root: &Path) -> io::Result<Vec<FolderFingerprintGroup>> {
    scan_directory_grouped_with_progress(root, &SilentReporter)
}

pub fn scan_directory_grouped_with_progress(
    root: &Path,
    reporter: &dyn ProgressReporter,
) -> io::Result<Vec<FolderFingerprintGroup>> {
    let mut groups: Vec<FolderFingerprintGroup> = Vec::new();
    let mut group_index: AHashMap<String, usize> = AHashMap::new();

    walk_content_files(root, reporter, |path, fingerprint| {
        let folder_name = parent_folder_name(path);
        let index = *group_index.entry(folder_name.clone()).or_insert_with(|| {
            groups.push(FolderFingerprintGroup {
                folder_name,
                fingerprints: Vec::new(),
            });
            groups.len() - 1
        });
        groups[index].fingerprints.push(fingerprint);
    })?;

    Ok(groups)
}

fn walk_content_files<F>(
    root: &Path,
    reporter: &dyn ProgressReporter,
    mut on_file: F,
) -> io::Result<()>
where
    F: FnMut(&Path, Fingerprint),
{
    reporter.on_scan_start();
    let start = Instant::now();
    let mut hashed = 0usize;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let location = err
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| root.display().to_string());
            let kind = err
                .io_error()
                .map(|e| e.kind())
                .unwrap_or(io::ErrorKind::Other);
            io::Error::new(kind, format!("Error walking {}: {}", location, err))
        })?;

        if entry.file_type().is_dir() || !is_content_file(entry.path()) {
            continue;
        }

        let path = entry.path();
        let fingerprint = fingerprint_file(path).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("Error calculating fingerprint for {}: {}", path.display(), err),
            )
        })?;
        trace!("{} -> {}", path.display(), fingerprint);

        on_file(path, fingerprint);
        hashed += 1;
        reporter.on_scan_progress(hashed, &path.to_string_lossy());
    }

    let duration = start.elapsed().as_secs_f64();
    debug!(
        "Fingerprinted {} content files under {} in {:.2}s",
        hashed,
        root.display(),
        duration
    );
    reporter.on_scan_complete(hashed, duration);
    Ok(())
}

fn parent_folder_name(path: &Path) -> String {
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_else(PathBuf::new);
    parent
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| parent.display().to_string())
}
