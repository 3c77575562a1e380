//! Type conversions from migration files to DynamoDB SDK types.

use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, GlobalSecondaryIndex, KeySchemaElement,
    KeyType, LocalSecondaryIndex, Projection, ProjectionType, ProvisionedThroughput,
    ScalarAttributeType, StreamSpecification, StreamViewType,
};
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::StoreError;
use crate::migration::{
    AttributeDefinitionSpec, GlobalSecondaryIndexSpec, KeySchemaSpec, LocalSecondaryIndexSpec,
    ProjectionSpec, SeedItem, StreamSpec, ThroughputSpec,
};

// ========== SEED ITEMS ==========

/// Convert a JSON value to a DynamoDB AttributeValue, document-client style.
///
/// Handles: string, number, bool, null, array, object.
pub fn json_to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => {
            AttributeValue::L(items.iter().map(json_to_attribute_value).collect())
        }
        Value::Object(map) => AttributeValue::M(json_item_to_attribute_values(map)),
    }
}

/// Convert a seed item to a HashMap of DynamoDB AttributeValues.
pub fn json_item_to_attribute_values(item: &SeedItem) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(k, v)| (k.clone(), json_to_attribute_value(v)))
        .collect()
}

// ========== TABLE SCHEMA ==========

fn build_error(what: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Validation(format!("Invalid {}: {}", what, e))
}

pub fn attribute_definition(
    spec: &AttributeDefinitionSpec,
) -> Result<AttributeDefinition, StoreError> {
    AttributeDefinition::builder()
        .attribute_name(&spec.attribute_name)
        .attribute_type(ScalarAttributeType::from(spec.attribute_type.as_str()))
        .build()
        .map_err(|e| build_error("attribute definition", e))
}

pub fn key_schema(specs: &[KeySchemaSpec]) -> Result<Vec<KeySchemaElement>, StoreError> {
    specs
        .iter()
        .map(|spec| {
            KeySchemaElement::builder()
                .attribute_name(&spec.attribute_name)
                .key_type(KeyType::from(spec.key_type.as_str()))
                .build()
                .map_err(|e| build_error("key schema", e))
        })
        .collect()
}

pub fn provisioned_throughput(spec: &ThroughputSpec) -> Result<ProvisionedThroughput, StoreError> {
    ProvisionedThroughput::builder()
        .read_capacity_units(spec.read_capacity_units)
        .write_capacity_units(spec.write_capacity_units)
        .build()
        .map_err(|e| build_error("provisioned throughput", e))
}

pub fn billing_mode(mode: &str) -> BillingMode {
    BillingMode::from(mode)
}

fn projection(spec: &ProjectionSpec) -> Projection {
    let non_key_attributes = if spec.non_key_attributes.is_empty() {
        None
    } else {
        Some(spec.non_key_attributes.clone())
    };

    Projection::builder()
        .set_projection_type(spec.projection_type.as_deref().map(ProjectionType::from))
        .set_non_key_attributes(non_key_attributes)
        .build()
}

pub fn global_secondary_index(
    spec: &GlobalSecondaryIndexSpec,
) -> Result<GlobalSecondaryIndex, StoreError> {
    let throughput = spec
        .provisioned_throughput
        .as_ref()
        .map(provisioned_throughput)
        .transpose()?;

    GlobalSecondaryIndex::builder()
        .index_name(&spec.index_name)
        .set_key_schema(Some(key_schema(&spec.key_schema)?))
        .projection(projection(&spec.projection))
        .set_provisioned_throughput(throughput)
        .build()
        .map_err(|e| build_error("global secondary index", e))
}

pub fn local_secondary_index(
    spec: &LocalSecondaryIndexSpec,
) -> Result<LocalSecondaryIndex, StoreError> {
    LocalSecondaryIndex::builder()
        .index_name(&spec.index_name)
        .set_key_schema(Some(key_schema(&spec.key_schema)?))
        .projection(projection(&spec.projection))
        .build()
        .map_err(|e| build_error("local secondary index", e))
}

pub fn stream_specification(spec: &StreamSpec) -> Result<StreamSpecification, StoreError> {
    StreamSpecification::builder()
        .stream_enabled(spec.stream_enabled)
        .set_stream_view_type(spec.stream_view_type.as_deref().map(StreamViewType::from))
        .build()
        .map_err(|e| build_error("stream specification", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_document_values() {
        let item: SeedItem = serde_json::from_value(json!({
            "id": "u1",
            "age": 36,
            "score": 9.5,
            "active": true,
            "nickname": null,
            "tags": ["a", 1],
            "address": { "city": "Lisbon" }
        }))
        .unwrap();

        let attrs = json_item_to_attribute_values(&item);
        assert_eq!(attrs["id"], AttributeValue::S("u1".to_string()));
        assert_eq!(attrs["age"], AttributeValue::N("36".to_string()));
        assert_eq!(attrs["score"], AttributeValue::N("9.5".to_string()));
        assert_eq!(attrs["active"], AttributeValue::Bool(true));
        assert_eq!(attrs["nickname"], AttributeValue::Null(true));
        assert_eq!(
            attrs["tags"],
            AttributeValue::L(vec![
                AttributeValue::S("a".to_string()),
                AttributeValue::N("1".to_string())
            ])
        );
        match &attrs["address"] {
            AttributeValue::M(map) => {
                assert_eq!(map["city"], AttributeValue::S("Lisbon".to_string()))
            }
            other => panic!("expected a map, got {other:?}"),
        }
    }

    #[test]
    fn builds_key_schema_elements() {
        let keys = key_schema(&[
            KeySchemaSpec {
                attribute_name: "pk".to_string(),
                key_type: "HASH".to_string(),
            },
            KeySchemaSpec {
                attribute_name: "sk".to_string(),
                key_type: "RANGE".to_string(),
            },
        ])
        .unwrap();
        assert_eq!(keys[0].key_type(), &KeyType::Hash);
        assert_eq!(keys[1].attribute_name(), "sk");
        assert_eq!(keys[1].key_type(), &KeyType::Range);
    }

    #[test]
    fn builds_indexes_with_projection() {
        let gsi = global_secondary_index(&GlobalSecondaryIndexSpec {
            index_name: "by_email".to_string(),
            key_schema: vec![KeySchemaSpec {
                attribute_name: "email".to_string(),
                key_type: "HASH".to_string(),
            }],
            projection: ProjectionSpec {
                projection_type: Some("INCLUDE".to_string()),
                non_key_attributes: vec!["name".to_string()],
            },
            provisioned_throughput: Some(ThroughputSpec {
                read_capacity_units: 1,
                write_capacity_units: 1,
            }),
        })
        .unwrap();

        assert_eq!(gsi.index_name(), "by_email");
        let projection = gsi.projection().unwrap();
        assert_eq!(projection.projection_type(), Some(&ProjectionType::Include));
        assert_eq!(projection.non_key_attributes(), ["name".to_string()]);
    }

    #[test]
    fn stream_view_type_is_optional() {
        let spec = stream_specification(&StreamSpec {
            stream_enabled: false,
            stream_view_type: None,
        })
        .unwrap();
        assert!(!spec.stream_enabled());
        assert!(spec.stream_view_type().is_none());
    }
}
