//! In-memory [`Store`] for exercising commands and the loop without a network.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{
    Capacity, Items, KeySchema, ReturnValues, Store, StoreError, Table, TableDescription,
};
use crate::value::{AttrValue, Item, Key};

struct MemTable {
    desc: TableDescription,
    items: Vec<Item>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RefCell<BTreeMap<String, MemTable>>,
    deletes: RefCell<Vec<(String, Key)>>,
    unreachable: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str, schema: KeySchema) -> Self {
        self.tables.borrow_mut().insert(
            name.to_string(),
            MemTable {
                desc: description(name, schema),
                items: Vec::new(),
            },
        );
        self
    }

    pub fn with_items(self, name: &str, items: Vec<Item>) -> Self {
        if let Some(table) = self.tables.borrow_mut().get_mut(name) {
            table.items.extend(items);
        }
        self
    }

    /// Makes every call fail as if the endpoint were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.set(unreachable);
    }

    /// Every successful `delete_item`, in call order.
    pub fn deletes(&self) -> Vec<(String, Key)> {
        self.deletes.borrow().clone()
    }

    pub fn items(&self, name: &str) -> Vec<Item> {
        self.tables
            .borrow()
            .get(name)
            .map(|t| t.items.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unreachable.get() {
            return Err(StoreError::Connection("endpoint unreachable".into()));
        }
        Ok(())
    }

    fn with_mem_table<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut MemTable) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        let table = tables
            .get_mut(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))?;
        f(table)
    }
}

fn description(name: &str, schema: KeySchema) -> TableDescription {
    TableDescription {
        name: name.to_string(),
        status: "ACTIVE".to_string(),
        key_schema: schema,
        item_count: None,
        size_bytes: None,
        read_capacity: Some(5),
        write_capacity: Some(5),
        created: None,
    }
}

fn matches_key(item: &Item, key: &Key) -> bool {
    key.iter().all(|(name, value)| item.get(name) == Some(value))
}

fn project(item: &Item, projection: Option<&[String]>) -> Item {
    match projection {
        Some(attrs) if !attrs.is_empty() => item
            .iter()
            .filter(|(name, _)| attrs.contains(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
        _ => item.clone(),
    }
}

fn compare_values(a: Option<&AttrValue>, b: Option<&AttrValue>) -> Ordering {
    match (a, b) {
        (Some(AttrValue::N(x)), Some(AttrValue::N(y))) => {
            let (x, y) = (x.parse::<f64>().unwrap_or(0.0), y.parse::<f64>().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(AttrValue::S(x)), Some(AttrValue::S(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

impl Store for MemoryStore {
    fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        self.check()?;
        Ok(self.tables.borrow().keys().cloned().collect())
    }

    fn describe_table(&self, name: &str) -> Result<TableDescription, StoreError> {
        self.with_mem_table(name, |table| {
            let mut desc = table.desc.clone();
            desc.item_count = Some(table.items.len() as i64);
            Ok(desc)
        })
    }

    fn create_table(
        &self,
        name: &str,
        schema: &KeySchema,
        capacity: Capacity,
    ) -> Result<TableDescription, StoreError> {
        self.check()?;
        let mut tables = self.tables.borrow_mut();
        if tables.contains_key(name) {
            return Err(StoreError::TableInUse(name.to_string()));
        }
        let mut desc = description(name, schema.clone());
        desc.read_capacity = Some(capacity.read);
        desc.write_capacity = Some(capacity.write);
        tables.insert(
            name.to_string(),
            MemTable {
                desc: desc.clone(),
                items: Vec::new(),
            },
        );
        Ok(desc)
    }

    fn delete_table(&self, table: &Table) -> Result<(), StoreError> {
        self.check()?;
        self.tables
            .borrow_mut()
            .remove(&table.name)
            .map(|_| ())
            .ok_or_else(|| StoreError::TableNotFound(table.name.clone()))
    }

    fn get_item(
        &self,
        table: &Table,
        key: &Key,
        projection: Option<&[String]>,
        _consistent: bool,
    ) -> Result<Option<Item>, StoreError> {
        self.with_mem_table(&table.name, |mem| {
            Ok(mem
                .items
                .iter()
                .find(|item| matches_key(item, key))
                .map(|item| project(item, projection)))
        })
    }

    fn put_item(&self, table: &Table, item: &Item) -> Result<(), StoreError> {
        let key = table
            .key_of(item)
            .ok_or_else(|| StoreError::Validation("missing key attribute".into()))?;
        self.with_mem_table(&table.name, |mem| {
            mem.items.retain(|existing| !matches_key(existing, &key));
            mem.items.push(item.clone());
            Ok(())
        })
    }

    fn update_item(
        &self,
        table: &Table,
        key: &Key,
        attributes: &Item,
        returns: ReturnValues,
    ) -> Result<Option<Item>, StoreError> {
        self.with_mem_table(&table.name, |mem| {
            let item = mem
                .items
                .iter_mut()
                .find(|item| matches_key(item, key))
                .ok_or(StoreError::ConditionFailed)?;

            let old = item.clone();
            item.extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
            let updated: Vec<String> = attributes.keys().cloned().collect();

            Ok(match returns {
                ReturnValues::None => None,
                ReturnValues::AllOld => Some(old),
                ReturnValues::AllNew => Some(item.clone()),
                ReturnValues::UpdatedOld => Some(project(&old, Some(updated.as_slice()))),
                ReturnValues::UpdatedNew => Some(project(item, Some(updated.as_slice()))),
            })
        })
    }

    fn delete_item(&self, table: &Table, key: &Key) -> Result<(), StoreError> {
        self.with_mem_table(&table.name, |mem| {
            mem.items.retain(|item| !matches_key(item, key));
            Ok(())
        })?;
        self.deletes
            .borrow_mut()
            .push((table.name.clone(), key.clone()));
        Ok(())
    }

    fn scan<'a>(
        &'a self,
        table: &Table,
        projection: Option<&[String]>,
    ) -> Result<Items<'a>, StoreError> {
        let items: Vec<_> = self.with_mem_table(&table.name, |mem| {
            Ok(mem.items.iter().map(|i| project(i, projection)).collect())
        })?;
        Ok(Box::new(items.into_iter().map(Ok)))
    }

    fn query<'a>(
        &'a self,
        table: &Table,
        hash: &AttrValue,
        projection: Option<&[String]>,
        ascending: bool,
    ) -> Result<Items<'a>, StoreError> {
        let hash_name = table.schema.hash_key.name.clone();
        let range_name = table.schema.range_key.as_ref().map(|k| k.name.clone());

        let mut items: Vec<Item> = self.with_mem_table(&table.name, |mem| {
            Ok(mem
                .items
                .iter()
                .filter(|item| item.get(&hash_name) == Some(hash))
                .cloned()
                .collect())
        })?;

        if let Some(range_name) = range_name {
            items.sort_by(|a, b| compare_values(a.get(&range_name), b.get(&range_name)));
        }
        if !ascending {
            items.reverse();
        }

        let projected: Vec<Item> = items.iter().map(|i| project(i, projection)).collect();
        Ok(Box::new(projected.into_iter().map(Ok)))
    }
}
