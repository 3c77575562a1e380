//! Create table operation.

use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::operation::create_table::builders::CreateTableFluentBuilder;

use crate::conversions::{
    attribute_definition, billing_mode, global_secondary_index, key_schema,
    local_secondary_index, provisioned_throughput, stream_specification,
};
use crate::errors::{StoreError, map_sdk_error};
use crate::migration::TableSchema;

/// Prepare a CreateTable request from a migration schema.
///
/// Empty index lists are left unset; DynamoDB rejects empty arrays.
pub fn build_create_table(
    client: &Client,
    schema: &TableSchema,
) -> Result<CreateTableFluentBuilder, StoreError> {
    let attribute_definitions = schema
        .attribute_definitions
        .iter()
        .map(attribute_definition)
        .collect::<Result<Vec<_>, _>>()?;

    let mut request = client
        .create_table()
        .table_name(&schema.table_name)
        .set_attribute_definitions(Some(attribute_definitions))
        .set_key_schema(Some(key_schema(&schema.key_schema)?));

    if let Some(throughput) = &schema.provisioned_throughput {
        request = request.provisioned_throughput(provisioned_throughput(throughput)?);
    }
    if let Some(mode) = &schema.billing_mode {
        request = request.billing_mode(billing_mode(mode));
    }
    if !schema.global_secondary_indexes.is_empty() {
        let indexes = schema
            .global_secondary_indexes
            .iter()
            .map(global_secondary_index)
            .collect::<Result<Vec<_>, _>>()?;
        request = request.set_global_secondary_indexes(Some(indexes));
    }
    if !schema.local_secondary_indexes.is_empty() {
        let indexes = schema
            .local_secondary_indexes
            .iter()
            .map(local_secondary_index)
            .collect::<Result<Vec<_>, _>>()?;
        request = request.set_local_secondary_indexes(Some(indexes));
    }
    if let Some(stream) = &schema.stream_specification {
        request = request.stream_specification(stream_specification(stream)?);
    }

    Ok(request)
}

/// Create a table. An existing table is reported as `AlreadyExists`.
pub async fn create_table(client: &Client, schema: &TableSchema) -> Result<(), StoreError> {
    let request = build_create_table(client, schema)?;

    request
        .send()
        .await
        .map(|_| ())
        .map_err(|e| map_sdk_error(e, Some(&schema.table_name)))
}
