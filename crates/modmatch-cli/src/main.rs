mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::path::Path;
use std::process;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Local};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, DirArgs, FileArgs};
use dotenv::dotenv;
use modmatch_core::catalog::{CatalogClient, MatchStatus};
use modmatch_core::identify::{fuzzy_identify, identify_directory};
use modmatch_core::scanner::{self, format_file_size, LocalInstall};
use modmatch_core::{
    AppConfig, InstallEngine, InstallOutcome, ResolvedDownload, SettingsProvider, TargetFile,
};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match modmatch_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let outcome = match args.command {
        Some(Commands::Scan(dir)) => run_scan(&config, &dir),
        Some(Commands::Identify(dir)) => run_identify(&config, &dir),
        Some(Commands::Fuzzy(dir)) => run_fuzzy(&config, &dir),
        Some(Commands::List) => run_list(&config),
        Some(Commands::Remove { name, yes }) => run_remove(&config, &name, yes),
        Some(Commands::Install { path, yes }) => run_install(&config, &path, yes),
        Some(Commands::Resolve(file)) => run_resolve(&config, &file),
        Some(Commands::Download { file, yes }) => run_download(&config, &file, yes),
        Some(Commands::PrintConfig) => {
            print_config(&config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn scan_root<'a>(config: &'a AppConfig, dir: &'a DirArgs) -> &'a Path {
    dir.dir.as_deref().unwrap_or_else(|| config.mods_directory())
}

fn run_scan(config: &AppConfig, dir: &DirArgs) -> Result<()> {
    let root = scan_root(config, dir);
    let reporter = CliReporter::new();
    let fingerprints = scanner::scan_directory_with_progress(root, &reporter)
        .with_context(|| format!("scanning {}", root.display()))?;

    for fingerprint in &fingerprints {
        println!("{}", fingerprint);
    }
    info!(
        "{} content files under {}",
        format!("{}", fingerprints.len()).cyan(),
        root.display()
    );
    Ok(())
}

fn run_identify(config: &AppConfig, dir: &DirArgs) -> Result<()> {
    let root = scan_root(config, dir);
    let client = CatalogClient::from_config(config)?;
    let reporter = CliReporter::new();
    let identification = identify_directory(&client, root, &reporter)?;
    let result = &identification.result;

    if identification.used_generic {
        warn!("No matches for game {}; showing catalog-wide results", config.game_id);
    }

    let (mut exact, mut partial, mut unmatched) = (0usize, 0usize, 0usize);
    for fingerprint in &identification.fingerprints {
        let label = match result.status_of(*fingerprint) {
            MatchStatus::Exact => {
                exact += 1;
                "exact".green()
            }
            MatchStatus::Partial => {
                partial += 1;
                "partial".yellow()
            }
            MatchStatus::Unmatched => {
                unmatched += 1;
                "unmatched".red()
            }
        };
        println!("{:>20}  {}", fingerprint, label);
    }

    println!();
    for candidate in result.exact_matches.iter().chain(&result.partial_matches) {
        println!(
            "{} mod {} file {} {}",
            "•".cyan(),
            candidate.id,
            candidate.file.id,
            candidate.file.file_name.bold()
        );
        if let Some(url) = candidate.download_url() {
            println!("    {}", url.dimmed());
        }
    }

    info!(
        "{} exact, {} partial, {} unmatched",
        format!("{}", exact).green(),
        format!("{}", partial).yellow(),
        format!("{}", unmatched).red()
    );
    Ok(())
}

fn run_fuzzy(config: &AppConfig, dir: &DirArgs) -> Result<()> {
    let root = scan_root(config, dir);
    let client = CatalogClient::from_config(config)?;
    let reporter = CliReporter::new();
    let (groups, result) = fuzzy_identify(&client, root, &reporter)?;

    for group in &groups {
        println!(
            "{} ({} files)",
            group.folder_name.bold(),
            group.fingerprints.len()
        );
    }
    println!();
    for candidate in &result.fuzzy_matches {
        let name = if candidate.file.display_name.is_empty() {
            &candidate.file.file_name
        } else {
            &candidate.file.display_name
        };
        println!("{} mod {} {}", "~".yellow(), candidate.id, name);
    }
    info!(
        "{} folders, {} similar catalog entries",
        groups.len(),
        format!("{}", result.fuzzy_matches.len()).yellow()
    );
    Ok(())
}

fn run_list(config: &AppConfig) -> Result<()> {
    let root = config.mods_directory();
    let installed = scanner::list_installed_mods(root)
        .with_context(|| format!("listing {}", root.display()))?;

    for entry in &installed {
        let modified: DateTime<Local> = entry.modified.into();
        println!(
            "{}  {:>10}  {}",
            modified.format("%Y-%m-%d %H:%M"),
            format_file_size(entry.size),
            entry.relative_path.display()
        );
    }
    let total: u64 = installed.iter().map(|entry| entry.size).sum();
    info!(
        "{} files, {} total",
        format!("{}", installed.len()).cyan(),
        format_file_size(total)
    );
    Ok(())
}

fn run_remove(config: &AppConfig, name: &str, yes: bool) -> Result<()> {
    if !yes && !prompt_confirm(&format!("Delete {}?", name), Some(false))? {
        info!("Nothing removed");
        return Ok(());
    }
    let path = scanner::remove_installed_mod(config.mods_directory(), name)
        .with_context(|| format!("removing {}", name))?;
    println!("Removed {}", path.display());
    Ok(())
}

fn run_install(config: &AppConfig, source: &Path, yes: bool) -> Result<()> {
    let confirm = |file_name: &str| {
        yes || prompt_confirm(
            &format!("A mod named {} already exists. Overwrite?", file_name),
            Some(false),
        )
        .unwrap_or(false)
    };

    match scanner::install_local_file(config.mods_directory(), source, &confirm)
        .with_context(|| format!("installing {}", source.display()))?
    {
        LocalInstall::Installed { path, bytes } => info!(
            "{} {} ({})",
            "Installed".green(),
            path.display(),
            format_file_size(bytes)
        ),
        LocalInstall::Skipped { path } => {
            info!("{} {}", "Kept existing".yellow(), path.display())
        }
    }
    Ok(())
}

fn load_target(client: &CatalogClient, args: &FileArgs) -> Result<TargetFile> {
    let owner = client.get_mod(args.mod_id)?;
    let files = client.get_mod_files(args.mod_id)?;
    let file_id = args.file_id.unwrap_or(owner.main_file_id);
    let file = files
        .iter()
        .find(|file| file.id == file_id)
        .ok_or_else(|| anyhow!("mod {} has no file {}", args.mod_id, file_id))?;
    Ok(TargetFile::from_catalog(file, Some(&owner)))
}

fn run_resolve(config: &AppConfig, args: &FileArgs) -> Result<()> {
    let engine = InstallEngine::from_config(config.clone())?;
    let target = load_target(engine.api(), args)?;

    match engine.resolve(&target) {
        ResolvedDownload::Url {
            url,
            expected_length,
            source,
        } => {
            println!("{}", url);
            info!(
                "{} via {:?} ({})",
                target.file_name.bold(),
                source,
                format_file_size(expected_length)
            );
        }
        ResolvedDownload::Manual { page_url } => {
            println!("{}", page_url);
            warn!("No direct download; get the file from the page above");
        }
    }
    Ok(())
}

fn run_download(config: &AppConfig, args: &FileArgs, yes: bool) -> Result<()> {
    if config.api_key.is_empty() {
        bail!("no API key configured; set CURSEFORGE_API_KEY");
    }
    let engine = InstallEngine::from_config(config.clone())?;
    let target = load_target(engine.api(), args)?;
    let reporter = CliReporter::new();
    let confirm = |file_name: &str| {
        yes || prompt_confirm(
            &format!("{} already exists. Overwrite?", file_name),
            Some(false),
        )
        .unwrap_or(false)
    };

    let outcome = engine.install(&target, &confirm, &reporter);
    if outcome.is_err() {
        reporter.abandon();
    }

    match outcome? {
        InstallOutcome::Installed { path, bytes, source } => {
            info!(
                "{} {} ({}, via {:?})",
                "Installed".green(),
                path.display(),
                format_file_size(bytes),
                source
            );
        }
        InstallOutcome::Skipped { path } => {
            info!("{} {}", "Kept existing".yellow(), path.display());
        }
        InstallOutcome::ManualDownload {
            page_url,
            mods_directory,
        } => {
            print_manual_instructions(&page_url, &mods_directory);
        }
    }
    Ok(())
}

fn print_manual_instructions(page_url: &str, mods_directory: &Path) {
    println!("{}", "Manual download required".yellow().bold());
    println!("  1. Open {}", page_url.underline());
    println!("  2. Download the file");
    println!("  3. Move it into {}", mods_directory.display());
}

fn print_config(config: &AppConfig) {
    let key = if config.api_key.is_empty() {
        "(not set)".red().to_string()
    } else {
        format!("{}…", config.api_key.chars().take(4).collect::<String>())
    };
    println!("mods_directory:        {}", config.mods_directory.display());
    println!("api_key:               {}", key);
    println!("api_base_url:          {}", config.api_base_url);
    println!("cdn_base_url:          {}", config.cdn_base_url);
    println!("website_base_url:      {}", config.website_base_url);
    println!("game:                  {} ({})", config.game_slug, config.game_id);
    println!("user_agent:            {}", config.user_agent);
    println!("match_timeout_secs:    {}", config.match_timeout_secs);
    println!("download_timeout_secs: {}", config.download_timeout_secs);
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" | "YES" => return Ok(true),
            "N" | "NO" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
