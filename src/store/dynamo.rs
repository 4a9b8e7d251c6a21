//! [`Store`] backed by DynamoDB through `aws-sdk-dynamodb`.
//!
//! The SDK is async; the shell is not. A current-thread tokio runtime owned
//! by the store drives each request to completion.

use std::collections::{HashMap, VecDeque};

use aws_config::{BehaviorVersion, ConfigLoader};
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
    ReturnValue,
};
use aws_sdk_dynamodb::Client;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use super::conversions::{
    description_from_sdk, item_from_sdk, item_to_sdk, map_sdk_error, projection, scalar_to_sdk,
    value_to_sdk,
};
use super::{Capacity, Items, KeySchema, ReturnValues, Store, StoreError, Table, TableDescription};
use crate::value::{AttrValue, Item, Key};

/// Connection settings. Anything left unset falls back to the AWS
/// environment and profile chain.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

pub struct DynamoStore {
    client: Client,
    runtime: Runtime,
}

impl DynamoStore {
    pub fn connect(options: StoreOptions) -> Result<Self, StoreError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let client = runtime.block_on(build_client(options));
        Ok(Self { client, runtime })
    }
}

const FALLBACK_REGION: &str = "us-east-1";

/// The named profile drives credentials and the default region; an explicit
/// region still wins over the profile's.
fn config_loader(options: &StoreOptions) -> ConfigLoader {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = &options.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(region) = &options.region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader
}

async fn build_client(options: StoreOptions) -> Client {
    let sdk_config = config_loader(&options).load().await;

    let mut config = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
    if sdk_config.region().is_none() {
        config = config.region(Region::new(FALLBACK_REGION));
    }
    if let Some(url) = &options.endpoint_url {
        config = config.endpoint_url(url);
    }

    info!(
        region = ?sdk_config.region(),
        profile = ?options.profile,
        endpoint = ?options.endpoint_url,
        "store client configured"
    );
    Client::from_conf(config.build())
}

fn key_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement, StoreError> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(|e| StoreError::Validation(e.to_string()))
}

fn attribute_definition(
    name: &str,
    kind: crate::value::ScalarType,
) -> Result<AttributeDefinition, StoreError> {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(scalar_to_sdk(kind))
        .build()
        .map_err(|e| StoreError::Validation(e.to_string()))
}

fn return_value(returns: ReturnValues) -> ReturnValue {
    match returns {
        ReturnValues::None => ReturnValue::None,
        ReturnValues::AllOld => ReturnValue::AllOld,
        ReturnValues::AllNew => ReturnValue::AllNew,
        ReturnValues::UpdatedOld => ReturnValue::UpdatedOld,
        ReturnValues::UpdatedNew => ReturnValue::UpdatedNew,
    }
}

type SdkItem = HashMap<String, AttributeValue>;

struct Page {
    items: Vec<SdkItem>,
    last_key: Option<SdkItem>,
}

/// Walks a paginated read one page at a time as items are consumed.
struct Pages<F> {
    fetch: F,
    buffer: VecDeque<SdkItem>,
    start_key: Option<SdkItem>,
    exhausted: bool,
}

impl<F> Pages<F>
where
    F: FnMut(Option<SdkItem>) -> Result<Page, StoreError>,
{
    fn new(fetch: F) -> Self {
        Self {
            fetch,
            buffer: VecDeque::new(),
            start_key: None,
            exhausted: false,
        }
    }
}

impl<F> Iterator for Pages<F>
where
    F: FnMut(Option<SdkItem>) -> Result<Page, StoreError>,
{
    type Item = Result<Item, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item_from_sdk(&item)));
            }
            if self.exhausted {
                return None;
            }
            match (self.fetch)(self.start_key.take()) {
                Ok(page) => {
                    self.buffer.extend(page.items);
                    self.exhausted = page.last_key.is_none();
                    self.start_key = page.last_key;
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl Store for DynamoStore {
    fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut start: Option<String> = None;

        loop {
            debug!(start = ?start, "ListTables");
            let output = self
                .runtime
                .block_on(
                    self.client
                        .list_tables()
                        .set_exclusive_start_table_name(start.take())
                        .send(),
                )
                .map_err(|e| map_sdk_error("ListTables", "", e))?;

            names.extend(output.table_names().iter().cloned());
            match output.last_evaluated_table_name() {
                Some(last) => start = Some(last.to_string()),
                None => break,
            }
        }
        Ok(names)
    }

    fn describe_table(&self, name: &str) -> Result<TableDescription, StoreError> {
        debug!(table = name, "DescribeTable");
        let output = self
            .runtime
            .block_on(self.client.describe_table().table_name(name).send())
            .map_err(|e| map_sdk_error("DescribeTable", name, e))?;

        let desc = output
            .table()
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))?;
        description_from_sdk(desc)
    }

    fn create_table(
        &self,
        name: &str,
        schema: &KeySchema,
        capacity: Capacity,
    ) -> Result<TableDescription, StoreError> {
        let mut request = self
            .client
            .create_table()
            .table_name(name)
            .key_schema(key_element(&schema.hash_key.name, KeyType::Hash)?)
            .attribute_definitions(attribute_definition(
                &schema.hash_key.name,
                schema.hash_key.kind,
            )?)
            .provisioned_throughput(
                ProvisionedThroughput::builder()
                    .read_capacity_units(capacity.read)
                    .write_capacity_units(capacity.write)
                    .build()
                    .map_err(|e| StoreError::Validation(e.to_string()))?,
            );

        if let Some(range_key) = &schema.range_key {
            request = request
                .key_schema(key_element(&range_key.name, KeyType::Range)?)
                .attribute_definitions(attribute_definition(&range_key.name, range_key.kind)?);
        }

        debug!(table = name, ?schema, ?capacity, "CreateTable");
        let output = self
            .runtime
            .block_on(request.send())
            .map_err(|e| map_sdk_error("CreateTable", name, e))?;

        match output.table_description() {
            Some(desc) => description_from_sdk(desc),
            None => self.describe_table(name),
        }
    }

    fn delete_table(&self, table: &Table) -> Result<(), StoreError> {
        debug!(table = %table.name, "DeleteTable");
        self.runtime
            .block_on(self.client.delete_table().table_name(&table.name).send())
            .map_err(|e| map_sdk_error("DeleteTable", &table.name, e))?;
        Ok(())
    }

    fn get_item(
        &self,
        table: &Table,
        key: &Key,
        projection_attrs: Option<&[String]>,
        consistent: bool,
    ) -> Result<Option<Item>, StoreError> {
        let mut request = self
            .client
            .get_item()
            .table_name(&table.name)
            .set_key(Some(item_to_sdk(key)?))
            .consistent_read(consistent);

        if let Some(proj) = projection(projection_attrs) {
            request = request
                .projection_expression(proj.expression)
                .set_expression_attribute_names(Some(proj.names));
        }

        debug!(table = %table.name, ?key, consistent, "GetItem");
        let output = self
            .runtime
            .block_on(request.send())
            .map_err(|e| map_sdk_error("GetItem", &table.name, e))?;

        Ok(output.item().map(item_from_sdk))
    }

    fn put_item(&self, table: &Table, item: &Item) -> Result<(), StoreError> {
        debug!(table = %table.name, attributes = item.len(), "PutItem");
        self.runtime
            .block_on(
                self.client
                    .put_item()
                    .table_name(&table.name)
                    .set_item(Some(item_to_sdk(item)?))
                    .send(),
            )
            .map_err(|e| map_sdk_error("PutItem", &table.name, e))?;
        Ok(())
    }

    fn update_item(
        &self,
        table: &Table,
        key: &Key,
        attributes: &Item,
        returns: ReturnValues,
    ) -> Result<Option<Item>, StoreError> {
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        let mut set_parts = Vec::with_capacity(attributes.len());

        for (i, (name, value)) in attributes.iter().enumerate() {
            let name_placeholder = format!("#f{}", i);
            let value_placeholder = format!(":v{}", i);
            set_parts.push(format!("{} = {}", name_placeholder, value_placeholder));
            names.insert(name_placeholder, name.clone());
            values.insert(value_placeholder, value_to_sdk(name, value)?);
        }
        names.insert("#hk".to_string(), table.schema.hash_key.name.clone());

        let request = self
            .client
            .update_item()
            .table_name(&table.name)
            .set_key(Some(item_to_sdk(key)?))
            .update_expression(format!("SET {}", set_parts.join(", ")))
            .condition_expression("attribute_exists(#hk)")
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .return_values(return_value(returns));

        debug!(table = %table.name, ?key, ?returns, "UpdateItem");
        let output = self
            .runtime
            .block_on(request.send())
            .map_err(|e| map_sdk_error("UpdateItem", &table.name, e))?;

        Ok(output.attributes().map(item_from_sdk))
    }

    fn delete_item(&self, table: &Table, key: &Key) -> Result<(), StoreError> {
        debug!(table = %table.name, ?key, "DeleteItem");
        self.runtime
            .block_on(
                self.client
                    .delete_item()
                    .table_name(&table.name)
                    .set_key(Some(item_to_sdk(key)?))
                    .send(),
            )
            .map_err(|e| map_sdk_error("DeleteItem", &table.name, e))?;
        Ok(())
    }

    fn scan<'a>(
        &'a self,
        table: &Table,
        projection_attrs: Option<&[String]>,
    ) -> Result<Items<'a>, StoreError> {
        let name = table.name.clone();
        let proj = projection(projection_attrs);

        let pages = Pages::new(move |start_key| {
            let mut request = self
                .client
                .scan()
                .table_name(&name)
                .set_exclusive_start_key(start_key);
            if let Some(proj) = &proj {
                request = request
                    .projection_expression(&proj.expression)
                    .set_expression_attribute_names(Some(proj.names.clone()));
            }

            debug!(table = %name, "Scan");
            let output = self
                .runtime
                .block_on(request.send())
                .map_err(|e| map_sdk_error("Scan", &name, e))?;
            Ok(Page {
                items: output.items().to_vec(),
                last_key: output.last_evaluated_key().cloned(),
            })
        });
        Ok(Box::new(pages))
    }

    fn query<'a>(
        &'a self,
        table: &Table,
        hash: &AttrValue,
        projection_attrs: Option<&[String]>,
        ascending: bool,
    ) -> Result<Items<'a>, StoreError> {
        let name = table.name.clone();
        let hash_name = table.schema.hash_key.name.clone();
        let hash_value = value_to_sdk(&hash_name, hash)?;
        let proj = projection(projection_attrs);

        let pages = Pages::new(move |start_key| {
            let mut names = proj
                .as_ref()
                .map(|p| p.names.clone())
                .unwrap_or_default();
            names.insert("#hk".to_string(), hash_name.clone());

            let mut request = self
                .client
                .query()
                .table_name(&name)
                .key_condition_expression("#hk = :hk")
                .expression_attribute_values(":hk", hash_value.clone())
                .set_expression_attribute_names(Some(names))
                .scan_index_forward(ascending)
                .set_exclusive_start_key(start_key);
            if let Some(proj) = &proj {
                request = request.projection_expression(&proj.expression);
            }

            debug!(table = %name, ascending, "Query");
            let output = self
                .runtime
                .block_on(request.send())
                .map_err(|e| map_sdk_error("Query", &name, e))?;
            Ok(Page {
                items: output.items().to_vec(),
                last_key: output.last_evaluated_key().cloned(),
            })
        });
        Ok(Box::new(pages))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    fn sdk_item(id: &str) -> SdkItem {
        HashMap::from([("id".to_string(), AttributeValue::S(id.to_string()))])
    }

    fn page(ids: &[&str], last: Option<&str>) -> Result<Page, StoreError> {
        Ok(Page {
            items: ids.iter().map(|id| sdk_item(id)).collect(),
            last_key: last.map(sdk_item),
        })
    }

    fn ids(items: Vec<Result<Item, StoreError>>) -> Vec<String> {
        items
            .into_iter()
            .map(|item| item.expect("item")["id"].to_string())
            .collect()
    }

    #[test]
    fn test_pages_follow_the_last_key() {
        let mut responses = VecDeque::from([
            page(&["a", "b"], Some("b")),
            page(&[], Some("c")),
            page(&["d"], None),
        ]);
        let mut starts = Vec::new();

        {
            let mut pages = Pages::new(|start: Option<SdkItem>| {
                starts.push(start);
                responses.pop_front().unwrap_or_else(|| page(&["extra"], None))
            });
            let items: Vec<_> = pages.by_ref().collect();
            assert_eq!(ids(items), vec!["\"a\"", "\"b\"", "\"d\""]);
            assert!(pages.next().is_none());
        }

        assert_eq!(starts, vec![None, Some(sdk_item("b")), Some(sdk_item("c"))]);
    }

    #[test]
    fn test_pages_stop_after_an_error() {
        let mut calls = 0;
        let mut pages = Pages::new(|_start: Option<SdkItem>| {
            calls += 1;
            if calls == 1 {
                page(&["a"], Some("a"))
            } else {
                Err(StoreError::Connection("dropped".into()))
            }
        });

        assert!(matches!(pages.next(), Some(Ok(_))));
        assert!(matches!(pages.next(), Some(Err(StoreError::Connection(_)))));
        assert!(pages.next().is_none());
        assert!(pages.next().is_none());
        drop(pages);
        assert_eq!(calls, 2);
    }

    #[allow(deprecated)]
    fn region_for(options: &StoreOptions) -> Option<String> {
        use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        writeln!(file, "[profile dev]\nregion = eu-west-2").expect("write config");
        let files = ProfileFiles::builder()
            .with_file(ProfileFileKind::Config, file.path())
            .build();

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let sdk_config = runtime.block_on(config_loader(options).profile_files(files).load());
        sdk_config.region().map(|region| region.to_string())
    }

    #[test]
    fn test_profile_supplies_the_region() {
        let mut options = StoreOptions {
            profile: Some("dev".into()),
            ..StoreOptions::default()
        };
        assert_eq!(region_for(&options).as_deref(), Some("eu-west-2"));

        options.region = Some("ap-south-1".into());
        assert_eq!(region_for(&options).as_deref(), Some("ap-south-1"));
    }
}
