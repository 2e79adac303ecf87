//! TOML-backed configuration loading.
//!
//! Every binary in the workspace reads its settings through [`read_toml`] (or
//! [`read_toml_or_default`] when the file is optional), so a malformed config
//! always surfaces as the same [`ConfigError`] with the offending path attached.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML or does not match the expected shape.
    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The file parsed, but a value is out of its allowed range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Reads and deserializes a TOML file.
pub fn read_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Like [`read_toml`], but a file that does not exist yields `T::default()`.
///
/// Any other I/O failure (permissions, a directory in place of the file) is
/// still reported.
pub fn read_toml_or_default<T: DeserializeOwned + Default>(
    path: impl AsRef<Path>,
) -> Result<T, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }
    read_toml(path)
}
