//! Migration definitions and the loader that reads them from disk.
//!
//! A migration is a `.json` file holding a CreateTable-shaped `Table` and an
//! optional list of `Seeds`:
//!
//! ```json
//! {
//!   "Table": {
//!     "TableName": "Users",
//!     "AttributeDefinitions": [{ "AttributeName": "id", "AttributeType": "S" }],
//!     "KeySchema": [{ "AttributeName": "id", "KeyType": "HASH" }],
//!     "ProvisionedThroughput": { "ReadCapacityUnits": 1, "WriteCapacityUnits": 1 }
//!   },
//!   "Seeds": [{ "id": "u1", "name": "Ada" }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::LoadError;
use crate::naming::TableNamingPolicy;

/// File extension recognized as a migration.
pub const MIGRATION_EXTENSION: &str = "json";

/// A seed record, written document-style (plain JSON values).
pub type SeedItem = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinitionSpec {
    pub attribute_name: String,
    pub attribute_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaSpec {
    pub attribute_name: String,
    pub key_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ThroughputSpec {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_key_attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GlobalSecondaryIndexSpec {
    pub index_name: String,
    pub key_schema: Vec<KeySchemaSpec>,
    #[serde(default)]
    pub projection: ProjectionSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<ThroughputSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocalSecondaryIndexSpec {
    pub index_name: String,
    pub key_schema: Vec<KeySchemaSpec>,
    #[serde(default)]
    pub projection: ProjectionSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamSpec {
    pub stream_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_view_type: Option<String>,
}

/// Table definition in the shape of a DynamoDB CreateTable request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableSchema {
    pub table_name: String,
    #[serde(default)]
    pub attribute_definitions: Vec<AttributeDefinitionSpec>,
    #[serde(default)]
    pub key_schema: Vec<KeySchemaSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioned_throughput: Option<ThroughputSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_secondary_indexes: Vec<GlobalSecondaryIndexSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_secondary_indexes: Vec<LocalSecondaryIndexSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_specification: Option<StreamSpec>,
}

/// On-disk layout of a migration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationFile {
    #[serde(rename = "Table")]
    pub table: TableSchema,
    #[serde(rename = "Seeds", default)]
    pub seeds: Vec<SeedItem>,
}

impl MigrationFile {
    /// Starter migration written by the `create` command.
    pub fn template(table_name: &str) -> Self {
        MigrationFile {
            table: TableSchema {
                table_name: table_name.to_string(),
                attribute_definitions: vec![AttributeDefinitionSpec {
                    attribute_name: "id".to_string(),
                    attribute_type: "S".to_string(),
                }],
                key_schema: vec![KeySchemaSpec {
                    attribute_name: "id".to_string(),
                    key_type: "HASH".to_string(),
                }],
                provisioned_throughput: Some(ThroughputSpec {
                    read_capacity_units: 1,
                    write_capacity_units: 1,
                }),
                billing_mode: None,
                global_secondary_indexes: Vec::new(),
                local_secondary_indexes: Vec::new(),
                stream_specification: None,
            },
            seeds: Vec::new(),
        }
    }
}

/// A loaded migration.
///
/// `table.table_name` is the effective name used against the store. It starts
/// as the declared name and is rewritten by [`MigrationDefinition::decorate`].
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationDefinition {
    pub table: TableSchema,
    pub seeds: Vec<SeedItem>,
    declared_name: String,
}

impl MigrationDefinition {
    pub fn new(table: TableSchema, seeds: Vec<SeedItem>) -> Self {
        let declared_name = table.table_name.clone();
        MigrationDefinition {
            table,
            seeds,
            declared_name,
        }
    }

    /// Table name as written in the migration file.
    pub fn declared_name(&self) -> &str {
        &self.declared_name
    }

    /// Name used for every store call of this run.
    pub fn table_name(&self) -> &str {
        &self.table.table_name
    }

    /// Write the policy's decorated name into the schema.
    ///
    /// Always derived from the declared name, so decorating twice with the
    /// same policy yields the same name.
    pub fn decorate(&mut self, policy: &TableNamingPolicy) {
        self.table.table_name = policy.format(self);
    }
}

impl From<MigrationFile> for MigrationDefinition {
    fn from(file: MigrationFile) -> Self {
        MigrationDefinition::new(file.table, file.seeds)
    }
}

/// Path of the migration file for `name` under `base_path`.
pub fn migration_path(base_path: &Path, name: &str) -> PathBuf {
    base_path.join(format!("{}.{}", name, MIGRATION_EXTENSION))
}

/// Parse a migration from its JSON source.
pub fn parse_migration(path: &Path, source: &str) -> Result<MigrationDefinition, LoadError> {
    serde_json::from_str::<MigrationFile>(source)
        .map(MigrationDefinition::from)
        .map_err(|source| LoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })
}

/// Load the migration named `name` from `base_path`.
pub async fn load_one(base_path: &Path, name: &str) -> Result<MigrationDefinition, LoadError> {
    let path = migration_path(base_path, name);
    let source = match tokio::fs::read_to_string(&path).await {
        Ok(source) => source,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::NotFound { path });
        }
        Err(source) => return Err(LoadError::Io { path, source }),
    };
    parse_migration(&path, &source)
}

/// Load every migration in `base_path`, in directory-listing order.
///
/// Files that cannot be read or parsed are logged and skipped.
pub async fn load_all(base_path: &Path) -> Result<Vec<MigrationDefinition>, LoadError> {
    let directory_error = |source| LoadError::Directory {
        path: base_path.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(base_path)
        .await
        .map_err(directory_error)?;

    let mut migrations = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(directory_error)? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(MIGRATION_EXTENSION) {
            continue;
        }

        let loaded = match tokio::fs::read_to_string(&path).await {
            Ok(source) => parse_migration(&path, &source),
            Err(source) => Err(LoadError::Io {
                path: path.clone(),
                source,
            }),
        };

        match loaded {
            Ok(migration) => {
                debug!(
                    path = %path.display(),
                    table = migration.declared_name(),
                    "loaded migration"
                );
                migrations.push(migration);
            }
            Err(e) => warn!(error = %e, "skipping migration"),
        }
    }

    Ok(migrations)
}
