//! Run options and stage validation.

use std::fmt;
use std::str::FromStr;

use crate::errors::MigrationError;

/// Deployment stage. Drives endpoint selection and the table name prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    Test,
    #[default]
    Local,
    Development,
    Production,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Test,
        Stage::Local,
        Stage::Development,
        Stage::Production,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Test => "test",
            Stage::Local => "local",
            Stage::Development => "development",
            Stage::Production => "production",
        }
    }

    /// `test` and `local` always run against the local endpoint.
    pub fn is_local(&self) -> bool {
        matches!(self, Stage::Test | Stage::Local)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| MigrationError::InvalidStage(s.to_string()))
    }
}

/// Options of one invocation, validated and resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// `None` runs every migration in the directory.
    pub migration_name: Option<String>,
    /// Delete an existing table before creating it.
    pub force: bool,
    /// Region to run against. Always `None` for local stages.
    pub region: Option<String>,
    pub stage: Stage,
}

impl RunOptions {
    /// Validate `stage` and resolve the region.
    ///
    /// `region` falls back to `default_region`; local stages drop it.
    pub fn new(
        migration_name: Option<String>,
        stage: &str,
        force: bool,
        region: Option<String>,
        default_region: Option<&str>,
    ) -> Result<Self, MigrationError> {
        let stage: Stage = stage.parse()?;
        let region = if stage.is_local() {
            None
        } else {
            region.or_else(|| default_region.map(str::to_string))
        };

        Ok(RunOptions {
            migration_name,
            force,
            region,
            stage,
        })
    }
}
