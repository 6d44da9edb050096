pub mod installed;
pub mod walk;

pub use installed::{
    format_file_size, install_local_file, is_plain_file_name, list_installed_mods,
    remove_installed_mod, InstalledMod, LocalInstall,
};
pub use walk::{
    is_content_file, scan_directory, scan_directory_grouped, scan_directory_grouped_with_progress,
    scan_directory_with_progress, FolderFingerprintGroup, CONTENT_EXTENSIONS,
};
