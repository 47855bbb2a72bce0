//! Run configuration, loaded from an optional TOML file.
//!
//! ```toml
//! root = "midis"
//! output = "midi_info.json"
//! extension = "mid"
//! meta_skip = "fixed"
//! ```
//!
//! Every key is optional. Command line flags override file values.

use crate::event::MetaSkip;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file picked up from the working directory when none is given.
pub const LOCAL_CONFIG: &str = "midistat.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory searched recursively for MIDI files.
    pub root: PathBuf,
    /// Where the JSON report is written.
    pub output: PathBuf,
    /// File extension selecting MIDI files, without the dot.
    pub extension: String,
    pub meta_skip: MetaSkip,
}
impl Default for Config {
    fn default() -> Config {
        Config {
            root: PathBuf::from("midis"),
            output: PathBuf::from("midi_info.json"),
            extension: "mid".to_string(),
            meta_skip: MetaSkip::Fixed,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl Config {
    /// Parse a config from TOML text. `path` is only used in error messages.
    pub fn from_toml(contents: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(contents).map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load a config from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Config::from_toml(&contents, path)
    }

    /// Load the config for a run.
    ///
    /// An explicit `cli_path` must exist. Without one, [`LOCAL_CONFIG`] in the working directory
    /// is used if present, and defaults otherwise.
    pub fn load(cli_path: Option<&Path>) -> Result<Config, ConfigError> {
        match cli_path {
            Some(path) => Config::load_from_file(path),
            None => {
                let local = Path::new(LOCAL_CONFIG);
                if local.exists() {
                    Config::load_from_file(local)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }
}
