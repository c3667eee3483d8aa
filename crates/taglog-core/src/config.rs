// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config service and storage port for taglog tools.

use std::path::PathBuf;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Key under which [`TaglogConfig`] is stored.
pub const CONFIG_KEY: &str = "taglog";

/// Byte-level storage behind [`ConfigService`].
pub trait ConfigStore {
    /// Fetch the blob stored under `key`; [`ConfigError::NotFound`] if absent.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replace the blob stored under `key`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failures while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing stored under the key.
    #[error("[CONFIG_NOT_FOUND] no config stored")]
    NotFound,
    /// The backing store could not be read or written.
    #[error("[CONFIG_IO] {0}")]
    Io(#[from] std::io::Error),
    /// Stored bytes are not valid JSON for the requested type.
    #[error("[CONFIG_PARSE] config `{key}` is invalid: {source}")]
    Parse {
        /// Key being loaded.
        key: String,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
    /// A value could not be encoded.
    #[error("[CONFIG_ENCODE] {0}")]
    Encode(#[source] serde_json::Error),
    /// The store could not be located.
    #[error("[CONFIG_LOCATION] {0}")]
    Location(String),
}

/// JSON codec in front of a [`ConfigStore`].
///
/// Missing or empty blobs load as `T::default()`, so a fresh install behaves
/// exactly like an empty config file.
pub struct ConfigService<S> {
    store: S,
}

impl<S: ConfigStore> ConfigService<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decode the value under `key`, or `T::default()` when nothing is stored.
    pub fn load<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        let bytes = match self.store.load_raw(key) {
            Ok(bytes) => bytes,
            Err(ConfigError::NotFound) => return Ok(T::default()),
            Err(err) => return Err(err),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            key: key.to_owned(),
            source,
        })
    }

    /// Encode `value` as pretty JSON and store it under `key`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let mut data = serde_json::to_vec_pretty(value).map_err(ConfigError::Encode)?;
        data.push(b'\n');
        self.store.save_raw(key, &data)
    }

    /// Load the CLI defaults stored under [`CONFIG_KEY`].
    pub fn load_taglog(&self) -> Result<TaglogConfig, ConfigError> {
        self.load(CONFIG_KEY)
    }
}

/// Persistent defaults for the `taglog` CLI. Flags override every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaglogConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    /// File to read GUID entropy from instead of the OS generator.
    pub entropy_path: Option<PathBuf>,
    /// Log a summary after each resolve run.
    pub summary: bool,
}
