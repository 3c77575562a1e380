//! Table management operations for DynamoDB.
//!
//! This module provides the table lifecycle operations migrations need:
//! - `create` - Create a table from a migration's schema
//! - `delete` - Delete a table

mod create;
mod delete;

// Re-export public functions
pub use create::{build_create_table, create_table};
pub use delete::delete_table;
