//! The table-store capability used by the migration engine.

use async_trait::async_trait;

use crate::errors::StoreError;
use crate::migration::{SeedItem, TableSchema};

/// Table-admin and item-write operations against one endpoint.
///
/// Implementations keep no state between calls and classify failures:
/// `create_table` reports an existing table as [`StoreError::AlreadyExists`],
/// `delete_table` and `batch_write_items` report a missing table as
/// [`StoreError::NotFound`].
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn create_table(&self, schema: &TableSchema) -> Result<(), StoreError>;

    async fn delete_table(&self, table_name: &str) -> Result<(), StoreError>;

    async fn batch_write_items(
        &self,
        table_name: &str,
        items: &[SeedItem],
    ) -> Result<(), StoreError>;
}
