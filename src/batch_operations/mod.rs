//! Batch operations module for DynamoDB.
//!
//! Seed items are written with `BatchWriteItem`, split to respect the
//! 25-item limit, with unprocessed items retried using exponential backoff.

mod write;

pub use write::{BATCH_WRITE_MAX_ITEMS, batch_write, build_write_requests};
