//! DynamoDB client module.
//!
//! Builds one SDK client per invocation from an explicit [`StoreEndpoint`],
//! never from process-wide configuration:
//! - Local: loopback endpoint with placeholder credentials
//! - Remote: a region plus the default credential chain

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};

use crate::batch_operations;
use crate::errors::StoreError;
use crate::migration::{SeedItem, TableSchema};
use crate::options::RunOptions;
use crate::store::TableStore;
use crate::table_operations;

/// Region reported to the SDK for the local endpoint.
pub const LOCAL_REGION: &str = "localhost";

/// Placeholder credentials accepted by DynamoDB Local.
pub const LOCAL_ACCESS_KEY_ID: &str = "MOCK_ACCESS_KEY_ID";
pub const LOCAL_SECRET_ACCESS_KEY: &str = "MOCK_SECRET_ACCESS_KEY";

/// Fallback when neither the options nor the environment name a region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Where the store lives for this invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEndpoint {
    /// DynamoDB Local on `http://localhost:<port>`.
    Local { port: u16 },
    /// AWS DynamoDB. `None` defers to the default region chain.
    Remote { region: Option<String> },
}

impl StoreEndpoint {
    /// Pick the endpoint for a run. Local stages ignore any region.
    pub fn for_options(options: &RunOptions, local_port: u16) -> Self {
        if options.stage.is_local() {
            StoreEndpoint::Local { port: local_port }
        } else {
            StoreEndpoint::Remote {
                region: options.region.clone(),
            }
        }
    }

    pub fn endpoint_url(&self) -> Option<String> {
        match self {
            StoreEndpoint::Local { port } => Some(format!("http://localhost:{}", port)),
            StoreEndpoint::Remote { .. } => None,
        }
    }
}

/// [`TableStore`] backed by the AWS SDK DynamoDB client.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    endpoint: StoreEndpoint,
}

impl DynamoStore {
    /// Build a client bound to `endpoint`.
    pub async fn connect(endpoint: &StoreEndpoint) -> Self {
        let client = build_client(endpoint).await;
        tracing::debug!(?endpoint, "dynamodb client ready");
        DynamoStore {
            client,
            endpoint: endpoint.clone(),
        }
    }

    pub fn endpoint(&self) -> &StoreEndpoint {
        &self.endpoint
    }

    /// The underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl TableStore for DynamoStore {
    async fn create_table(&self, schema: &TableSchema) -> Result<(), StoreError> {
        table_operations::create_table(&self.client, schema).await
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), StoreError> {
        table_operations::delete_table(&self.client, table_name).await
    }

    async fn batch_write_items(
        &self,
        table_name: &str,
        items: &[SeedItem],
    ) -> Result<(), StoreError> {
        batch_operations::batch_write(&self.client, table_name, items).await
    }
}

/// Build the AWS SDK DynamoDB client for the given endpoint.
async fn build_client(endpoint: &StoreEndpoint) -> Client {
    let config_loader = match endpoint {
        StoreEndpoint::Local { .. } => {
            let creds = Credentials::new(
                LOCAL_ACCESS_KEY_ID,
                LOCAL_SECRET_ACCESS_KEY,
                None,
                None,
                "dynamo-migrate-local",
            );
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(LOCAL_REGION))
                .credentials_provider(creds)
        }
        StoreEndpoint::Remote { region } => {
            // Region priority: param > env var / profile > default
            let region_provider = RegionProviderChain::first_try(region.clone().map(Region::new))
                .or_default_provider()
                .or_else(DEFAULT_REGION);
            aws_config::defaults(BehaviorVersion::latest()).region(region_provider)
        }
    };

    let sdk_config = config_loader.load().await;

    let mut dynamo_config = aws_sdk_dynamodb::config::Builder::from(&sdk_config);

    if let Some(url) = endpoint.endpoint_url() {
        dynamo_config = dynamo_config.endpoint_url(url);
    }

    Client::from_conf(dynamo_config.build())
}
