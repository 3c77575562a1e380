//! Stage-based table name decoration.

use std::path::PathBuf;

use crate::config::Settings;
use crate::migration::MigrationDefinition;
use crate::options::Stage;

/// Prefix, suffix and migration directory shared by every migration of an
/// invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNamingPolicy {
    pub prefix: String,
    pub suffix: String,
    pub base_path: PathBuf,
}

impl TableNamingPolicy {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>, base_path: PathBuf) -> Self {
        TableNamingPolicy {
            prefix: prefix.into(),
            suffix: suffix.into(),
            base_path,
        }
    }

    /// Policy using the configured prefix and suffix verbatim.
    pub fn from_settings(settings: &Settings) -> Self {
        TableNamingPolicy::new(
            settings.table_prefix.clone(),
            settings.table_suffix.clone(),
            settings.migrations_path(),
        )
    }

    /// Policy for execute runs: `"<stage>_"` replaces the configured prefix.
    pub fn for_stage(settings: &Settings, stage: Stage) -> Self {
        TableNamingPolicy {
            prefix: format!("{}_", stage),
            ..TableNamingPolicy::from_settings(settings)
        }
    }

    /// Decorated name for `definition`: prefix + declared name + suffix.
    pub fn format(&self, definition: &MigrationDefinition) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            definition.declared_name(),
            self.suffix
        )
    }
}
