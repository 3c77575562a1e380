//! Idempotent DynamoDB table migrations.
//!
//! A migration is a JSON file describing one table and its seed items.
//! Running it creates the table (optionally replacing an existing one) and
//! writes the seeds, retrying while a freshly created table is not yet
//! writable. Existing tables are skipped, so migrations can be re-run safely.
//!
//! The engine talks to the store through [`TableStore`]; [`DynamoStore`] is
//! the AWS SDK implementation.

pub mod batch_operations;
pub mod client;
pub mod commands;
pub mod config;
pub mod conversions;
pub mod errors;
pub mod executor;
pub mod migration;
pub mod naming;
pub mod options;
pub mod runner;
pub mod store;
pub mod table_operations;

pub use client::{DynamoStore, StoreEndpoint};
pub use commands::{ExecuteAllRequest, ExecuteRequest, Invocation};
pub use config::Settings;
pub use errors::{ConfigError, LoadError, MigrationError, StoreError};
pub use executor::{MigrationOutcome, SeedRetryPolicy, SingleMigrationExecutor};
pub use migration::{MigrationDefinition, MigrationFile, SeedItem, TableSchema};
pub use naming::TableNamingPolicy;
pub use options::{RunOptions, Stage};
pub use runner::{BatchReport, BatchRunner, MigrationReport};
pub use store::TableStore;
