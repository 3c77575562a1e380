//! Applies a single migration: optional delete, create, then seed.
//!
//! ```text
//! START -> [DELETE] -> CREATE -> [SEED] -> DONE
//!                        |          |
//!                     SKIPPED     FAILED
//! ```
//!
//! A partially applied migration is not rolled back: a table created but not
//! seeded stays in place until the migration is re-run with `force`.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::{MigrationError, StoreError};
use crate::migration::MigrationDefinition;
use crate::naming::TableNamingPolicy;
use crate::store::TableStore;

/// Linear backoff for seed writes against a table that is not visible yet.
///
/// Attempt `n` (0-based) waits `n * step` before firing; attempts stop once
/// the next delay would exceed `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedRetryPolicy {
    pub step: Duration,
    pub ceiling: Duration,
}

impl Default for SeedRetryPolicy {
    fn default() -> Self {
        SeedRetryPolicy {
            step: Duration::from_millis(1000),
            ceiling: Duration::from_millis(5000),
        }
    }
}

impl SeedRetryPolicy {
    /// Delay before each attempt: 0, step, 2*step, ... up to `ceiling`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        let mut next = Some(Duration::ZERO);
        std::iter::from_fn(move || {
            let delay = next?;
            let following = delay + self.step;
            next = (!self.step.is_zero() && following <= self.ceiling).then_some(following);
            Some(delay)
        })
    }
}

/// Result of a migration that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Table created and `seeded` items written.
    Created { table: String, seeded: usize },
    /// Table already existed and `force` was not set.
    Skipped { table: String },
}

impl MigrationOutcome {
    pub fn table(&self) -> &str {
        match self {
            MigrationOutcome::Created { table, .. } | MigrationOutcome::Skipped { table } => table,
        }
    }
}

/// Runs one migration against a [`TableStore`].
pub struct SingleMigrationExecutor<'a> {
    store: &'a dyn TableStore,
    retry: SeedRetryPolicy,
}

impl<'a> SingleMigrationExecutor<'a> {
    pub fn new(store: &'a dyn TableStore) -> Self {
        SingleMigrationExecutor {
            store,
            retry: SeedRetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: SeedRetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Apply `migration`, decorating its table name with `policy` first.
    ///
    /// Issues at most one delete, exactly one create, and a bounded number of
    /// seed writes.
    ///
    /// The delete does not wait for the table to disappear. Against AWS the
    /// table may still be `DELETING` when the create is sent, in which case the
    /// create reports it as existing and the migration is skipped.
    pub async fn apply(
        &self,
        migration: &mut MigrationDefinition,
        policy: &TableNamingPolicy,
        force: bool,
    ) -> Result<MigrationOutcome, MigrationError> {
        migration.decorate(policy);
        let table = migration.table_name().to_string();

        if force {
            match self.store.delete_table(&table).await {
                Ok(()) => debug!(table = %table, "deleted existing table"),
                Err(StoreError::NotFound(_)) => debug!(table = %table, "no table to delete"),
                Err(e) => return Err(MigrationError::store(&table, e)),
            }
        }

        match self.store.create_table(&migration.table).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(_)) => {
                info!(table = %table, "skipped - {} table already exists (-f to replace)", table);
                return Ok(MigrationOutcome::Skipped { table });
            }
            Err(e) => {
                warn!(table = %table, error = %e, "failed to create table");
                return Err(MigrationError::store(&table, e));
            }
        }

        if !migration.seeds.is_empty() {
            self.seed(&table, migration).await?;
        }

        info!(
            table = %table,
            seeded = migration.seeds.len(),
            "{} table created and seeded",
            table
        );
        Ok(MigrationOutcome::Created {
            seeded: migration.seeds.len(),
            table,
        })
    }

    /// Write the seed items, retrying while the new table is not visible.
    async fn seed(
        &self,
        table: &str,
        migration: &MigrationDefinition,
    ) -> Result<(), MigrationError> {
        let mut attempts = 0u32;

        for delay in self.retry.delays() {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempts += 1;

            match self.store.batch_write_items(table, &migration.seeds).await {
                Ok(()) => return Ok(()),
                Err(StoreError::NotFound(_)) => {
                    debug!(
                        table,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "table not ready for seeding"
                    );
                }
                Err(e) => return Err(MigrationError::store(table, e)),
            }
        }

        Err(MigrationError::SeedTimeout {
            table: table.to_string(),
            attempts,
        })
    }
}
