use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "modmatch")]
#[command(about = "Identify installed mods and download them from the catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fingerprint every content file in the mods directory
    Scan(DirArgs),
    /// Match installed content against the catalog
    Identify(DirArgs),
    /// Folder-level similarity matching of installed content
    Fuzzy(DirArgs),
    /// List installed content files, newest first
    List,
    /// Delete an installed content file
    Remove {
        /// Path relative to the mods directory, as shown by `list`
        name: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Copy a local content file into the mods directory
    Install {
        path: PathBuf,
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Show where a catalog file would be downloaded from
    Resolve(FileArgs),
    /// Download a catalog file into the mods directory
    Download {
        #[command(flatten)]
        file: FileArgs,
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct DirArgs {
    /// Directory to scan instead of the configured mods directory
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FileArgs {
    /// Catalog mod id
    #[arg(long)]
    pub mod_id: u32,
    /// Catalog file id; defaults to the mod's main file
    #[arg(long)]
    pub file_id: Option<u32>,
}
