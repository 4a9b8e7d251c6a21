//! Conversions between the shell's value model and the DynamoDB SDK types.

use std::collections::HashMap;
use std::fmt;

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::primitives::DateTimeFormat;
use aws_sdk_dynamodb::types::{
    AttributeValue, KeyType, ScalarAttributeType, TableDescription as SdkTableDescription,
};

use super::{KeyAttr, KeySchema, StoreError, TableDescription};
use crate::value::{AttrValue, Item, ScalarType};

pub(crate) fn value_to_sdk(name: &str, value: &AttrValue) -> Result<AttributeValue, StoreError> {
    Ok(match value {
        AttrValue::S(s) => AttributeValue::S(s.clone()),
        AttrValue::N(n) => AttributeValue::N(n.clone()),
        AttrValue::Ss(set) => AttributeValue::Ss(set.iter().cloned().collect()),
        AttrValue::Ns(set) => AttributeValue::Ns(set.iter().cloned().collect()),
        AttrValue::Other(_) => {
            return Err(StoreError::Validation(format!(
                "attribute `{}` has a type the shell cannot write",
                name
            )))
        }
    })
}

pub(crate) fn value_from_sdk(value: &AttributeValue) -> AttrValue {
    match value {
        AttributeValue::S(s) => AttrValue::S(s.clone()),
        AttributeValue::N(n) => AttrValue::N(n.clone()),
        AttributeValue::Ss(ss) => AttrValue::Ss(ss.iter().cloned().collect()),
        AttributeValue::Ns(ns) => AttrValue::Ns(ns.iter().cloned().collect()),
        AttributeValue::Bool(b) => AttrValue::Other(b.to_string()),
        AttributeValue::Null(_) => AttrValue::Other("null".to_string()),
        AttributeValue::B(blob) => AttrValue::Other(format!("<{} bytes>", blob.as_ref().len())),
        AttributeValue::Bs(blobs) => AttrValue::Other(format!("<set of {} binaries>", blobs.len())),
        AttributeValue::L(list) => AttrValue::Other(format!(
            "[{}]",
            list.iter()
                .map(|v| value_from_sdk(v).to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )),
        AttributeValue::M(map) => AttrValue::Other(format!(
            "{{{}}}",
            item_from_sdk(map)
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join(", ")
        )),
        other => AttrValue::Other(format!("{:?}", other)),
    }
}

pub(crate) fn item_to_sdk(item: &Item) -> Result<HashMap<String, AttributeValue>, StoreError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), value_to_sdk(name, value)?)))
        .collect()
}

pub(crate) fn item_from_sdk(item: &HashMap<String, AttributeValue>) -> Item {
    item.iter()
        .map(|(name, value)| (name.clone(), value_from_sdk(value)))
        .collect()
}

/// A projection expression with placeholder names, so attribute names that
/// collide with reserved words still work.
pub(crate) struct Projection {
    pub expression: String,
    pub names: HashMap<String, String>,
}

pub(crate) fn projection(attributes: Option<&[String]>) -> Option<Projection> {
    let attributes = attributes.filter(|attrs| !attrs.is_empty())?;
    let mut names = HashMap::new();
    let mut placeholders = Vec::with_capacity(attributes.len());

    for (i, attr) in attributes.iter().enumerate() {
        let placeholder = format!("#p{}", i);
        names.insert(placeholder.clone(), attr.clone());
        placeholders.push(placeholder);
    }

    Some(Projection {
        expression: placeholders.join(", "),
        names,
    })
}

pub(crate) fn scalar_to_sdk(kind: ScalarType) -> ScalarAttributeType {
    match kind {
        ScalarType::S => ScalarAttributeType::S,
        ScalarType::N => ScalarAttributeType::N,
        ScalarType::B => ScalarAttributeType::B,
    }
}

fn scalar_from_sdk(kind: &ScalarAttributeType) -> Option<ScalarType> {
    match kind {
        ScalarAttributeType::S => Some(ScalarType::S),
        ScalarAttributeType::N => Some(ScalarType::N),
        ScalarAttributeType::B => Some(ScalarType::B),
        _ => None,
    }
}

pub(crate) fn description_from_sdk(
    desc: &SdkTableDescription,
) -> Result<TableDescription, StoreError> {
    let name = desc.table_name().unwrap_or_default().to_string();

    let key_attr = |wanted: &KeyType| -> Result<Option<KeyAttr>, StoreError> {
        let Some(element) = desc.key_schema().iter().find(|k| k.key_type() == wanted) else {
            return Ok(None);
        };
        let attr_name = element.attribute_name();
        let kind = desc
            .attribute_definitions()
            .iter()
            .find(|d| d.attribute_name() == attr_name)
            .and_then(|d| scalar_from_sdk(d.attribute_type()))
            .ok_or_else(|| {
                StoreError::Validation(format!("no attribute type for key `{}`", attr_name))
            })?;
        Ok(Some(KeyAttr::new(attr_name, kind)))
    };

    let hash_key = key_attr(&KeyType::Hash)?
        .ok_or_else(|| StoreError::Validation(format!("table `{}` has no hash key", name)))?;
    let range_key = key_attr(&KeyType::Range)?;
    let throughput = desc.provisioned_throughput();

    Ok(TableDescription {
        status: desc
            .table_status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        key_schema: KeySchema {
            hash_key,
            range_key,
        },
        item_count: desc.item_count(),
        size_bytes: desc.table_size_bytes(),
        read_capacity: throughput.and_then(|t| t.read_capacity_units()),
        write_capacity: throughput.and_then(|t| t.write_capacity_units()),
        created: desc
            .creation_date_time()
            .and_then(|dt| dt.fmt(DateTimeFormat::DateTime).ok()),
        name,
    })
}

/// Classifies an SDK failure. `table` names the table the call targeted.
pub(crate) fn map_sdk_error<E, R>(
    operation: &'static str,
    table: &str,
    err: SdkError<E, R>,
) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: fmt::Debug,
{
    let detail = DisplayErrorContext(&err).to_string();

    match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => StoreError::Connection(detail),
        SdkError::ServiceError(service) => {
            let inner = service.err();
            let message = inner.message().unwrap_or("no message").to_string();
            match inner.code() {
                Some("ResourceNotFoundException") => StoreError::TableNotFound(table.to_string()),
                Some("ResourceInUseException") => StoreError::TableInUse(table.to_string()),
                Some("ConditionalCheckFailedException") => StoreError::ConditionFailed,
                Some("ValidationException") => StoreError::Validation(message),
                _ => StoreError::Service {
                    operation,
                    message,
                    detail,
                },
            }
        }
        _ => StoreError::Service {
            operation,
            message: err.to_string(),
            detail,
        },
    }
}
