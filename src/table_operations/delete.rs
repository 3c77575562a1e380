//! Delete table operation.

use aws_sdk_dynamodb::Client;

use crate::errors::{StoreError, map_sdk_error};

/// Delete a table. A missing table is reported as `NotFound`.
pub async fn delete_table(client: &Client, table_name: &str) -> Result<(), StoreError> {
    client
        .delete_table()
        .table_name(table_name)
        .send()
        .await
        .map(|_| ())
        .map_err(|e| map_sdk_error(e, Some(table_name)))
}
