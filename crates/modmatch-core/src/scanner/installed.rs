use super::walk::is_content_file;
use crate::progress::OverwriteDecision;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};
use walkdir::WalkDir;

/// A content file found in the mods directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledMod {
    pub name: String,
    /// Location below the mods directory, e.g. `Hair/long.package`.
    pub relative_path: PathBuf,
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

/// Result of copying a local file into the mods directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalInstall {
    Installed { path: PathBuf, bytes: u64 },
    /// The destination existed and the caller declined to replace it.
    Skipped { path: PathBuf },
}

/// True when `name` is a single normal path component, so joining it to a
/// directory cannot leave that directory.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// List installed content files, most recently modified first.
pub fn list_installed_mods(root: &Path) -> io::Result<Vec<InstalledMod>> {
    let mut mods = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() || !is_content_file(entry.path()) {
            continue;
        }

        let metadata = entry.metadata().map_err(io::Error::from)?;
        let relative_path = entry
            .path()
            .strip_prefix(root)
            .unwrap_or_else(|_| entry.path())
            .to_path_buf();
        mods.push(InstalledMod {
            name: entry.file_name().to_string_lossy().into_owned(),
            relative_path,
            path: entry.path().to_path_buf(),
            size: metadata.len(),
            modified: metadata.modified()?,
        });
    }

    mods.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(mods)
}

/// Delete a content file given by its path relative to `root`, as shown in
/// [`InstalledMod::relative_path`].
pub fn remove_installed_mod(root: &Path, relative_path: &str) -> io::Result<PathBuf> {
    let candidate = Path::new(relative_path);
    let inside_root = candidate.components().next().is_some()
        && candidate
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !inside_root || !is_content_file(candidate) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{}' is not a content file below the mods directory", relative_path),
        ));
    }

    let path = root.join(candidate);
    fs::remove_file(&path)?;
    info!("Removed {}", path.display());
    Ok(path)
}

/// Copy a local content file directly into `root`, creating it if needed.
pub fn install_local_file(
    root: &Path,
    source: &Path,
    overwrite: &dyn OverwriteDecision,
) -> io::Result<LocalInstall> {
    let file_name = match source.file_name() {
        Some(name) if is_content_file(source) => name.to_os_string(),
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a content file", source.display()),
            ))
        }
    };
    if !fs::metadata(source)?.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{}' is not a regular file", source.display()),
        ));
    }

    fs::create_dir_all(root)?;
    let destination = root.join(&file_name);
    if destination.exists() {
        if fs::canonicalize(&destination)? == fs::canonicalize(source)? {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is already installed", source.display()),
            ));
        }
        if !overwrite.confirm_overwrite(&file_name.to_string_lossy()) {
            info!("Keeping existing {}", destination.display());
            return Ok(LocalInstall::Skipped { path: destination });
        }
        debug!("Overwriting {}", destination.display());
    }

    let bytes = fs::copy(source, &destination)?;
    info!("Installed {} ({} bytes)", destination.display(), bytes);
    Ok(LocalInstall::Installed {
        path: destination,
        bytes,
    })
}

/// Format a byte count with binary units, e.g. `1.5 KiB`.
pub fn format_file_size(size: u64) -> String {
    const UNIT: u64 = 1024;
    if size < UNIT {
        return format!("{} B", size);
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = size / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let prefix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}iB", size as f64 / div as f64, prefix)
}
