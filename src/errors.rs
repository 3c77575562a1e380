//! Error types for dynamo-migrate.
//!
//! Store failures are classified from typed `SdkError` variants and the
//! service error code, never by parsing debug output. Callers match on
//! [`StoreError::AlreadyExists`] and [`StoreError::NotFound`] to tell "already
//! in the desired state" apart from genuine failures.

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use std::path::PathBuf;
use thiserror::Error;

/// Classified failure of a single table-store call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Table '{0}' already exists")]
    AlreadyExists(String),

    #[error("Table '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Credentials(String),

    #[error("Access denied to DynamoDB: {0}")]
    AccessDenied(String),

    #[error("DynamoDB request rate too high: {0}")]
    Throttled(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("DynamoDB operation failed: {0}")]
    Service(String),
}

/// Failure to resolve or parse migration files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("migration '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("migration '{}' is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot read migration directory '{}': {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read migration '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to read the service configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top-level error returned by the migration commands.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("invalid stage '{0}' (expected test | local | development | production)")]
    InvalidStage(String),

    #[error("a migration name is required")]
    MissingName,

    #[error("{table}: {source}")]
    Store {
        table: String,
        #[source]
        source: StoreError,
    },

    #[error("{table}: table not writable after {attempts} seed attempts")]
    SeedTimeout { table: String, attempts: u32 },

    #[error("migration template '{}' already exists", .0.display())]
    TemplateExists(PathBuf),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MigrationError {
    pub(crate) fn store(table: &str, source: StoreError) -> Self {
        MigrationError::Store {
            table: table.to_string(),
            source,
        }
    }

    /// True when the error stems from user input, before any store call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MigrationError::InvalidStage(_) | MigrationError::MissingName
        )
    }
}

// ========== TYPED ERROR MAPPING ==========

/// Map non-service `SdkError` variants (dispatch failures, timeouts, etc.).
///
/// Returns `None` for `ServiceError`.
fn map_outer_sdk_error<E, R>(err: &SdkError<E, R>) -> Option<StoreError>
where
    E: std::fmt::Debug,
    R: std::fmt::Debug,
{
    match err {
        SdkError::DispatchFailure(dispatch) => {
            let msg = if dispatch.is_timeout() {
                "Connection timed out to DynamoDB. Check your network or endpoint."
            } else if dispatch.is_io() {
                "Connection failed to DynamoDB (I/O error). Check if the endpoint is reachable."
            } else {
                "Connection failed to DynamoDB. Check if the endpoint is reachable."
            };
            Some(StoreError::Connection(msg.to_string()))
        }
        SdkError::TimeoutError(_) => Some(StoreError::Connection(
            "Connection timed out to DynamoDB. Check your network or endpoint.".to_string(),
        )),
        SdkError::ConstructionFailure(err) => {
            let msg = format!("{:?}", err);
            if msg.contains("credentials")
                || msg.contains("Credentials")
                || msg.contains("NoCredentialsError")
            {
                Some(StoreError::Credentials(
                    "No AWS credentials found. Configure credentials via environment variables \
                    (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY), AWS profile, or IAM role."
                        .to_string(),
                ))
            } else {
                Some(StoreError::Service(format!(
                    "Failed to build request: {}",
                    msg
                )))
            }
        }
        SdkError::ResponseError(err) => Some(StoreError::Service(format!(
            "Invalid response from DynamoDB: {:?}",
            err
        ))),
        SdkError::ServiceError(_) => None,
        _ => Some(StoreError::Service(format!(
            "Unknown error from DynamoDB: {:?}",
            err
        ))),
    }
}

/// Classify a DynamoDB service error code.
pub(crate) fn classify_service_code(
    code: Option<&str>,
    message: Option<&str>,
    display: &str,
    table: Option<&str>,
) -> StoreError {
    let table_name = table.unwrap_or("<unknown>").to_string();
    let detail = message.unwrap_or(display).to_string();

    match code {
        Some("ResourceInUseException") => StoreError::AlreadyExists(table_name),
        Some("ResourceNotFoundException") => StoreError::NotFound(table_name),
        Some("UnrecognizedClientException") => StoreError::Credentials(
            "Invalid AWS credentials. Check your access key and secret.".to_string(),
        ),
        Some("ExpiredTokenException") => StoreError::Credentials(
            "AWS credentials have expired. Refresh your session token.".to_string(),
        ),
        Some("AccessDeniedException") => StoreError::AccessDenied(
            message.unwrap_or("Check your IAM permissions.").to_string(),
        ),
        Some("ProvisionedThroughputExceededException")
        | Some("LimitExceededException")
        | Some("RequestLimitExceeded")
        | Some("ThrottlingException") => StoreError::Throttled(detail),
        Some("ValidationException") => StoreError::Validation(detail),
        _ => StoreError::Service(detail),
    }
}

/// Map a DynamoDB SDK error to a [`StoreError`].
///
/// For `ServiceError`, uses `ProvideErrorMetadata` to read the error code.
pub fn map_sdk_error<E, R>(err: SdkError<E, R>, table: Option<&str>) -> StoreError
where
    E: ProvideErrorMetadata + std::fmt::Debug + std::fmt::Display,
    R: std::fmt::Debug,
{
    if let Some(store_err) = map_outer_sdk_error(&err) {
        return store_err;
    }

    if let Some(service_err) = err.as_service_error() {
        let display = service_err.to_string();
        return classify_service_code(
            service_err.code(),
            service_err.message(),
            &display,
            table,
        );
    }

    StoreError::Service(format!("Unexpected DynamoDB error: {:?}", err))
}
