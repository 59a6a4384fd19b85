use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vitalgen_core::CatalogDocument;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "vitalgen.toml";

/// Errors raised while reading configuration or catalog files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("toml error in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("json error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Values from `vitalgen.toml`; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub seed: Option<u64>,
    pub name_pool_size: Option<usize>,
    /// Catalog document replacing the built-in patient-vitals catalog.
    pub catalog: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub subscriptions: SubscriptionDefaults,
}

/// Default `field=N%` tokens for subscription commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubscriptionDefaults {
    pub fields: Vec<String>,
    pub equality: Option<String>,
}

impl CliConfig {
    /// Load `path`, or `vitalgen.toml` if it exists, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = read(&path)?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml { path, source })
    }
}

/// Read a catalog document; `.json` files are parsed as JSON, anything else
/// as TOML.
pub fn load_catalog_document(path: &Path) -> Result<CatalogDocument, ConfigError> {
    let contents = read(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
