use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::ClassRequest;

pub const FOLDER_NAME: &str = "fetch-urls";
pub const CONFIG_FILE: &str = "config.json";
pub const ENV_FILE: &str = ".env";

const ENV_TEMPLATE: &str = include_str!("../.env.example");

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to load environment file: {0}")]
    Env(#[from] dotenvy::Error),

    #[error(
        "A default configuration file has been created at {}, please review it before proceeding",
        .0.display()
    )]
    RequiresConfigure(PathBuf),
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the URL map is written. Relative paths are resolved against the
    /// config folder.
    pub output: PathBuf,
    pub classes: Vec<ClassRequest>,
    pub search: SearchOptions,
    pub fetch: FetchOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from("urls_data.json"),
            classes: vec![ClassRequest::new("dog", 100), ClassRequest::new("cat", 100)],
            search: Default::default(),
            fetch: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub license: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            license: Some("1".to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub page_delay_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay_ms: 2_000,
            page_delay_ms: 2_000,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;

        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }
}

pub fn default_folder() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(FOLDER_NAME))
}

/// Loads `config.json` (and `.env`, when present) from `config_folder`.
///
/// On first run the defaults and an `.env` template are written instead and
/// [`Error::RequiresConfigure`] is returned, so they get reviewed before any
/// requests go out.
pub fn configure<P: AsRef<Path>>(config_folder: P) -> Result<Config> {
    let config_folder = config_folder.as_ref();

    if !config_folder.exists() {
        fs::create_dir_all(config_folder)?;
    }

    let config_path = config_folder.join(CONFIG_FILE);
    let env_path = config_folder.join(ENV_FILE);

    if !config_path.exists() {
        if !env_path.exists() {
            fs::write(&env_path, ENV_TEMPLATE)?;
        }
        Config::default().save(&config_path)?;

        return Err(Error::RequiresConfigure(config_path));
    }

    if env_path.exists() {
        dotenvy::from_path(&env_path)?;
    }

    let mut config = Config::load(&config_path)?;
    if config.output.is_relative() {
        config.output = config_folder.join(&config.output);
    }

    Ok(config)
}
