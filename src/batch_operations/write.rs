//! Batch write operations for DynamoDB.

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{PutRequest, WriteRequest};
use std::collections::HashMap;
use std::time::Duration;

use crate::conversions::json_item_to_attribute_values;
use crate::errors::{StoreError, map_sdk_error};
use crate::migration::SeedItem;

/// Maximum items per batch write request (DynamoDB limit).
pub const BATCH_WRITE_MAX_ITEMS: usize = 25;

/// Maximum retry attempts for unprocessed items.
const BATCH_MAX_RETRIES: usize = 5;

/// Convert seed items to put requests.
pub fn build_write_requests(items: &[SeedItem]) -> Result<Vec<WriteRequest>, StoreError> {
    items
        .iter()
        .map(|item| {
            let put_request = PutRequest::builder()
                .set_item(Some(json_item_to_attribute_values(item)))
                .build()
                .map_err(|e| {
                    StoreError::Validation(format!("Failed to build put request: {}", e))
                })?;
            Ok(WriteRequest::builder().put_request(put_request).build())
        })
        .collect()
}

/// Put seed items into a DynamoDB table.
///
/// Handles:
/// - Splitting requests to respect the 25-item limit
/// - Retrying unprocessed items with exponential backoff
///
/// A table that does not exist (or is not active yet) is reported as
/// `NotFound`; the caller decides whether to retry.
pub async fn batch_write(
    client: &Client,
    table: &str,
    items: &[SeedItem],
) -> Result<(), StoreError> {
    let all_requests = build_write_requests(items)?;

    if all_requests.is_empty() {
        return Ok(());
    }

    for chunk in all_requests.chunks(BATCH_WRITE_MAX_ITEMS) {
        let mut pending: Vec<WriteRequest> = chunk.to_vec();
        let mut retries = 0;

        loop {
            let mut request_items = HashMap::new();
            request_items.insert(table.to_string(), pending);

            let output = client
                .batch_write_item()
                .set_request_items(Some(request_items))
                .send()
                .await
                .map_err(|e| map_sdk_error(e, Some(table)))?;

            let Some(unprocessed) = output
                .unprocessed_items()
                .and_then(|u| u.get(table))
                .filter(|u| !u.is_empty())
            else {
                break;
            };

            if retries == BATCH_MAX_RETRIES {
                return Err(StoreError::Service(format!(
                    "Failed to process {} items after {} retries",
                    unprocessed.len(),
                    BATCH_MAX_RETRIES
                )));
            }

            pending = unprocessed.clone();
            retries += 1;
            let delay = Duration::from_millis(50 * (1 << retries));
            tracing::debug!(
                table,
                unprocessed = pending.len(),
                delay_ms = delay.as_millis() as u64,
                "retrying unprocessed items"
            );
            tokio::time::sleep(delay).await;
        }
    }

    Ok(())
}
