use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "CURSEFORGE_API_KEY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mods_directory: PathBuf,
    pub api_key: String,
    pub api_base_url: String,
    pub cdn_base_url: String,
    pub website_base_url: String,
    pub game_id: u32,
    pub game_slug: String,
    pub user_agent: String,
    pub match_timeout_secs: u64,
    pub download_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mods_directory: default_mods_directory(),
            api_key: String::new(),
            api_base_url: "https://api.curseforge.com".to_string(),
            cdn_base_url: "https://mediafilez.forgecdn.net".to_string(),
            website_base_url: "https://www.curseforge.com".to_string(),
            game_id: 78062,
            game_slug: "sims4".to_string(),
            user_agent: "ModMatch/1.0".to_string(),
            match_timeout_secs: 30,
            download_timeout_secs: 60,
        }
    }
}

/// Source of the directory installed content lives in.
pub trait SettingsProvider {
    fn mods_directory(&self) -> &Path;
}

impl SettingsProvider for AppConfig {
    fn mods_directory(&self) -> &Path {
        &self.mods_directory
    }
}

/// Load `Config.toml` (optional) overlaid with `MODMATCH_*` environment
/// variables. The API key falls back to `CURSEFORGE_API_KEY`.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("MODMATCH"))
        .build()?;
    let mut config = builder.try_deserialize::<AppConfig>()?;

    if config.api_key.is_empty() {
        if let Ok(key) = env::var(API_KEY_ENV) {
            config.api_key = key.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
        }
    }

    Ok(config)
}

/// The game's Mods folder inside the Steam Proton prefix.
pub fn default_mods_directory() -> PathBuf {
    let home = env::var("HOME").unwrap_or_default();
    [
        home.as_str(),
        ".steam",
        "steam",
        "steamapps",
        "compatdata",
        "1222670",
        "pfx",
        "drive_c",
        "users",
        "steamuser",
        "Documents",
        "Electronic Arts",
        "The Sims 4",
        "Mods",
    ]
    .iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_sims4_catalog() {
        let config = AppConfig::default();
        assert_eq!(config.game_id, 78062);
        assert_eq!(config.match_timeout_secs, 30);
        assert!(config.download_timeout_secs > config.match_timeout_secs);
        assert!(config.mods_directory.ends_with("The Sims 4/Mods"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::builder()
            .set_override("mods_directory", "/tmp/mods")
            .unwrap()
            .set_override("game_id", 432_i64)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>()
            .unwrap();

        assert_eq!(config.mods_directory, PathBuf::from("/tmp/mods"));
        assert_eq!(config.game_id, 432);
        assert_eq!(config.cdn_base_url, "https://mediafilez.forgecdn.net");
        assert_eq!(config.mods_directory(), Path::new("/tmp/mods"));
    }
}
