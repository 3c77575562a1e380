//! Runs a sequence of migrations, one after another.

use tracing::{error, info};

use crate::errors::MigrationError;
use crate::executor::{MigrationOutcome, SingleMigrationExecutor};
use crate::migration::MigrationDefinition;
use crate::naming::TableNamingPolicy;
use crate::options::RunOptions;

/// Outcome of one migration within a batch.
#[derive(Debug)]
pub struct MigrationReport {
    /// Table name as declared in the migration file.
    pub migration: String,
    pub result: Result<MigrationOutcome, MigrationError>,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-migration outcomes of a batch, in execution order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<MigrationReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drives [`SingleMigrationExecutor`] over an ordered list of migrations.
///
/// Migrations run strictly in order, never overlapping. A failed migration is
/// logged and recorded; the runner moves on to the next one.
pub struct BatchRunner<'a> {
    executor: SingleMigrationExecutor<'a>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(executor: SingleMigrationExecutor<'a>) -> Self {
        BatchRunner { executor }
    }

    pub async fn run_all(
        &self,
        migrations: Vec<MigrationDefinition>,
        policy: &TableNamingPolicy,
        options: &RunOptions,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for mut migration in migrations {
            let name = migration.declared_name().to_string();
            let result = self.executor.apply(&mut migration, policy, options.force).await;

            if let Err(e) = &result {
                error!(migration = %name, error = %e, "migration failed, continuing");
            }
            report.entries.push(MigrationReport {
                migration: name,
                result,
            });
        }

        info!(
            total = report.entries.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch finished"
        );
        report
    }
}
