use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Default location: `<config dir>/tackle/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tackle").join("config.toml"))
}

/// Load the configuration.
///
/// An explicit path must exist. The default path is optional: if it is
/// missing, built-in defaults are used.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(AppConfig::default()),
        },
    };

    if !required && !path.exists() {
        return Ok(AppConfig::default());
    }

    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    parse_config(&text).map_err(|e| ConfigError::ParseError { path, source: e })
}

pub fn parse_config(text: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(text)
}
