//! Service configuration.
//!
//! Read from a Serverless-style YAML file. Only the keys below are used;
//! everything else in the file is ignored.
//!
//! ```yaml
//! provider:
//!   region: eu-west-1
//! custom:
//!   dynamodb:
//!     start:
//!       port: 8000
//!     migration:
//!       dir: dynamodb
//!       table_prefix: ""
//!       table_suffix: ""
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "serverless.yml";

/// Default port of the local DynamoDB endpoint.
pub const DEFAULT_LOCAL_PORT: u16 = 8000;

/// Default migration directory, relative to the service path.
pub const DEFAULT_MIGRATION_DIR: &str = "dynamodb";

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    provider: RawProvider,
    #[serde(default)]
    custom: RawCustom,
}

#[derive(Debug, Default, Deserialize)]
struct RawProvider {
    region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCustom {
    #[serde(default)]
    dynamodb: RawDynamodb,
}

#[derive(Debug, Default, Deserialize)]
struct RawDynamodb {
    #[serde(default)]
    start: RawStart,
    #[serde(default)]
    migration: RawMigration,
}

#[derive(Debug, Default, Deserialize)]
struct RawStart {
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMigration {
    dir: Option<String>,
    table_prefix: Option<String>,
    table_suffix: Option<String>,
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory the service lives in; migration paths are relative to it.
    pub service_path: PathBuf,
    /// Provider region, used when no region is passed on the command line.
    pub region: Option<String>,
    /// Port of the local DynamoDB endpoint.
    pub local_port: u16,
    pub migration_dir: String,
    pub table_prefix: String,
    pub table_suffix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            service_path: PathBuf::from("."),
            region: None,
            local_port: DEFAULT_LOCAL_PORT,
            migration_dir: DEFAULT_MIGRATION_DIR.to_string(),
            table_prefix: String::new(),
            table_suffix: String::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields defaults rooted at
    /// the file's directory.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let service_path = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let source = match tokio::fs::read_to_string(path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Settings {
                    service_path,
                    ..Settings::default()
                });
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::parse(&source, service_path).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse settings from YAML source.
    pub fn parse(source: &str, service_path: PathBuf) -> Result<Self, serde_yaml::Error> {
        // An empty YAML document deserializes as unit, not as a map.
        let raw: RawConfig = if source.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(source)?
        };
        let dynamodb = raw.custom.dynamodb;

        Ok(Settings {
            service_path,
            region: raw.provider.region,
            local_port: dynamodb.start.port.unwrap_or(DEFAULT_LOCAL_PORT),
            migration_dir: dynamodb
                .migration
                .dir
                .unwrap_or_else(|| DEFAULT_MIGRATION_DIR.to_string()),
            table_prefix: dynamodb.migration.table_prefix.unwrap_or_default(),
            table_suffix: dynamodb.migration.table_suffix.unwrap_or_default(),
        })
    }

    /// Directory holding the migration files.
    pub fn migrations_path(&self) -> PathBuf {
        self.service_path.join(&self.migration_dir)
    }
}
