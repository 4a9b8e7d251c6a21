//! The boundary to the data store.
//!
//! The shell only ever talks to a [`Store`]. Consistency, retries and the
//! network are the store client's business; this module only classifies the
//! errors it surfaces.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::value::{AttrValue, Item, Key, ScalarType, ValueError};

mod conversions;
pub mod dynamo;
#[cfg(test)]
pub mod memory;

pub use dynamo::{DynamoStore, StoreOptions};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table not found: {0}")]
    TableNotFound(String),
    #[error("table already exists: {0}")]
    TableInUse(String),
    #[error("item not found")]
    ConditionFailed,
    #[error("validation error: {0}")]
    Validation(String),
    #[error("cannot reach the store: {0}")]
    Connection(String),
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
        detail: String,
    },
    #[error("cannot start the store client: {0}")]
    Runtime(#[from] std::io::Error),
}

impl StoreError {
    /// Full diagnostic for the error, when the client provided more than the message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            StoreError::Service { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

/// One key attribute of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyAttr {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ScalarType,
}

impl KeyAttr {
    pub fn new(name: impl Into<String>, kind: ScalarType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for KeyAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeySchema {
    pub hash_key: KeyAttr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_key: Option<KeyAttr>,
}

/// Provisioned throughput requested for new tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub read: i64,
    pub write: i64,
}

impl Default for Capacity {
    fn default() -> Self {
        Self { read: 5, write: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDescription {
    pub name: String,
    pub status: String,
    #[serde(flatten)]
    pub key_schema: KeySchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl TableDescription {
    pub fn table(&self) -> Table {
        Table {
            name: self.name.clone(),
            schema: self.key_schema.clone(),
        }
    }
}

/// Handle to an existing table: its name and key schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub schema: KeySchema,
}

impl Table {
    /// Builds the primary key from command-line tokens.
    pub fn key(&self, hash: &str, range: Option<&str>) -> Result<Key, ValueError> {
        let mut key = Key::new();
        let hash_key = &self.schema.hash_key;
        key.insert(
            hash_key.name.clone(),
            AttrValue::from_key_arg(hash_key.kind, hash)?,
        );

        match (&self.schema.range_key, range) {
            (Some(range_key), Some(raw)) => {
                key.insert(
                    range_key.name.clone(),
                    AttrValue::from_key_arg(range_key.kind, raw)?,
                );
            }
            (Some(_), None) => return Err(ValueError::MissingRangeKey(self.name.clone())),
            (None, Some(_)) => return Err(ValueError::UnexpectedRangeKey(self.name.clone())),
            (None, None) => {}
        }
        Ok(key)
    }

    /// Extracts the primary key of an item read from this table.
    pub fn key_of(&self, item: &Item) -> Option<Key> {
        self.key_names()
            .into_iter()
            .map(|name| item.get(&name).cloned().map(|value| (name, value)))
            .collect()
    }

    pub fn key_names(&self) -> Vec<String> {
        let mut names = vec![self.schema.hash_key.name.clone()];
        if let Some(range_key) = &self.schema.range_key {
            names.push(range_key.name.clone());
        }
        names
    }
}

/// Which attributes an update hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnValues {
    None,
    #[default]
    AllOld,
    AllNew,
    UpdatedOld,
    UpdatedNew,
}

impl FromStr for ReturnValues {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(ReturnValues::None),
            "ALL_OLD" => Ok(ReturnValues::AllOld),
            "ALL_NEW" => Ok(ReturnValues::AllNew),
            "UPDATED_OLD" => Ok(ReturnValues::UpdatedOld),
            "UPDATED_NEW" => Ok(ReturnValues::UpdatedNew),
            _ => Err(s.to_string()),
        }
    }
}

/// Lazily fetched items. Each element is fallible because pages are fetched
/// while the sequence is consumed.
pub type Items<'a> = Box<dyn Iterator<Item = Result<Item, StoreError>> + 'a>;

pub trait Store {
    fn list_tables(&self) -> Result<Vec<String>, StoreError>;

    fn describe_table(&self, name: &str) -> Result<TableDescription, StoreError>;

    fn create_table(
        &self,
        name: &str,
        schema: &KeySchema,
        capacity: Capacity,
    ) -> Result<TableDescription, StoreError>;

    fn delete_table(&self, table: &Table) -> Result<(), StoreError>;

    /// Resolves a table handle; fails when the table does not exist.
    fn get_table(&self, name: &str) -> Result<Table, StoreError> {
        self.describe_table(name).map(|desc| desc.table())
    }

    /// Re-reads the table metadata, updating the handle in place.
    fn refresh_table(&self, table: &mut Table) -> Result<TableDescription, StoreError> {
        let desc = self.describe_table(&table.name)?;
        *table = desc.table();
        Ok(desc)
    }

    fn get_item(
        &self,
        table: &Table,
        key: &Key,
        projection: Option<&[String]>,
        consistent: bool,
    ) -> Result<Option<Item>, StoreError>;

    fn put_item(&self, table: &Table, item: &Item) -> Result<(), StoreError>;

    /// Sets `attributes` on the existing item at `key`. Fails with
    /// [`StoreError::ConditionFailed`] when there is no such item.
    fn update_item(
        &self,
        table: &Table,
        key: &Key,
        attributes: &Item,
        returns: ReturnValues,
    ) -> Result<Option<Item>, StoreError>;

    fn delete_item(&self, table: &Table, key: &Key) -> Result<(), StoreError>;

    fn scan<'a>(
        &'a self,
        table: &Table,
        projection: Option<&[String]>,
    ) -> Result<Items<'a>, StoreError>;

    fn query<'a>(
        &'a self,
        table: &Table,
        hash: &AttrValue,
        projection: Option<&[String]>,
        ascending: bool,
    ) -> Result<Items<'a>, StoreError>;
}
