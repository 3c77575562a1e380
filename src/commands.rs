//! Entry points: `create`, `execute` and `execute_all`.
//!
//! Each invocation validates its options before touching the store, then
//! builds exactly one endpoint and one naming policy shared by every
//! migration it runs.

use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use crate::client::{DynamoStore, StoreEndpoint};
use crate::config::Settings;
use crate::errors::MigrationError;
use crate::executor::{MigrationOutcome, SeedRetryPolicy, SingleMigrationExecutor};
use crate::migration::{self, MigrationFile};
use crate::naming::TableNamingPolicy;
use crate::options::{RunOptions, Stage};
use crate::runner::{BatchReport, BatchRunner};
use crate::store::TableStore;

/// Arguments of `execute`.
#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    pub name: String,
    pub stage: String,
    pub force: bool,
    pub region: Option<String>,
}

/// Arguments of `execute_all`. Stage defaults to `local`.
#[derive(Debug, Clone, Default)]
pub struct ExecuteAllRequest {
    pub stage: Option<String>,
    pub force: bool,
    pub region: Option<String>,
}

/// A validated invocation: options, endpoint and naming policy.
#[derive(Debug, Clone)]
pub struct Invocation {
    options: RunOptions,
    endpoint: StoreEndpoint,
    policy: TableNamingPolicy,
    retry: SeedRetryPolicy,
}

impl Invocation {
    fn new(settings: &Settings, options: RunOptions) -> Self {
        Invocation {
            endpoint: StoreEndpoint::for_options(&options, settings.local_port),
            policy: TableNamingPolicy::for_stage(settings, options.stage),
            retry: SeedRetryPolicy::default(),
            options,
        }
    }

    pub fn for_execute(
        settings: &Settings,
        request: ExecuteRequest,
    ) -> Result<Self, MigrationError> {
        let options = RunOptions::new(
            Some(request.name),
            &request.stage,
            request.force,
            request.region,
            settings.region.as_deref(),
        )?;
        Ok(Invocation::new(settings, options))
    }

    pub fn for_execute_all(
        settings: &Settings,
        request: ExecuteAllRequest,
    ) -> Result<Self, MigrationError> {
        let stage = request.stage.unwrap_or_else(|| Stage::default().to_string());
        let options = RunOptions::new(
            None,
            &stage,
            request.force,
            request.region,
            settings.region.as_deref(),
        )?;
        Ok(Invocation::new(settings, options))
    }

    pub fn with_retry_policy(mut self, retry: SeedRetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn endpoint(&self) -> &StoreEndpoint {
        &self.endpoint
    }

    pub fn policy(&self) -> &TableNamingPolicy {
        &self.policy
    }

    fn executor<'a>(&self, store: &'a dyn TableStore) -> SingleMigrationExecutor<'a> {
        SingleMigrationExecutor::new(store).with_retry_policy(self.retry)
    }

    /// Run the named migration. Any fatal error is returned.
    pub async fn run_one(
        &self,
        store: &dyn TableStore,
    ) -> Result<MigrationOutcome, MigrationError> {
        let Some(name) = self.options.migration_name.as_deref() else {
            return Err(MigrationError::MissingName);
        };

        let mut migration = migration::load_one(&self.policy.base_path, name).await?;
        self.executor(store)
            .apply(&mut migration, &self.policy, self.options.force)
            .await
    }

    /// Run every migration in the directory. Only enumeration errors are
    /// returned; per-migration failures end up in the report.
    pub async fn run_all(&self, store: &dyn TableStore) -> Result<BatchReport, MigrationError> {
        let migrations = migration::load_all(&self.policy.base_path).await?;
        if migrations.is_empty() {
            tracing::info!(path = %self.policy.base_path.display(), "no migrations found");
        }

        let runner = BatchRunner::new(self.executor(store));
        Ok(runner.run_all(migrations, &self.policy, &self.options).await)
    }
}

/// Scaffold a new migration file named `<name>.json`.
pub async fn create(settings: &Settings, name: &str) -> Result<PathBuf, MigrationError> {
    let policy = TableNamingPolicy::from_settings(settings);
    tokio::fs::create_dir_all(&policy.base_path).await?;

    let path = migration::migration_path(&policy.base_path, name);
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(MigrationError::TemplateExists(path));
        }
        Err(e) => return Err(e.into()),
    };

    let template = serde_json::to_string_pretty(&MigrationFile::template(name))
        .map_err(std::io::Error::other)?;
    file.write_all(template.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await?;

    Ok(path)
}

/// Run one migration against the configured endpoint.
pub async fn execute(
    settings: &Settings,
    request: ExecuteRequest,
) -> Result<MigrationOutcome, MigrationError> {
    let invocation = Invocation::for_execute(settings, request)?;
    let store = DynamoStore::connect(invocation.endpoint()).await;
    invocation.run_one(&store).await
}

/// Run every migration in the configured directory.
pub async fn execute_all(
    settings: &Settings,
    request: ExecuteAllRequest,
) -> Result<BatchReport, MigrationError> {
    let invocation = Invocation::for_execute_all(settings, request)?;
    let store = DynamoStore::connect(invocation.endpoint()).await;
    invocation.run_all(&store).await
}
