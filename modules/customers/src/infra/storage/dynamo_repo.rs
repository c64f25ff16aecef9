use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client};
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, from_items, to_item};

use crate::contract::model::Customer;
use crate::domain::repo::CustomersRepository;
use crate::infra::storage::entity::{CustomerItem, KEY_ATTRIBUTE};

type Item = HashMap<String, AttributeValue>;

/// DynamoDB-backed [`CustomersRepository`]. One item per customer, keyed by `id`.
#[derive(Debug, Clone)]
pub struct DynamoCustomersRepository {
    client: Client,
    table_name: String,
}

impl DynamoCustomersRepository {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn key(id: &str) -> Item {
        HashMap::from([(KEY_ATTRIBUTE.to_owned(), AttributeValue::S(id.to_owned()))])
    }
}

#[async_trait]
impl CustomersRepository for DynamoCustomersRepository {
    async fn put(&self, customer: Customer) -> anyhow::Result<()> {
        let item: Item =
            to_item(CustomerItem::from(customer)).context("failed to marshal customer")?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)
            .context("PutItem failed")?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Customer>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(id)))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)
            .context("GetItem failed")?;

        match output.item {
            Some(item) => {
                let item: CustomerItem =
                    from_item(item).context("failed to unmarshal customer")?;
                Ok(Some(item.into()))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> anyhow::Result<Vec<Customer>> {
        let mut customers = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(last_evaluated_key.take())
                .send()
                .await
                .map_err(aws_sdk_dynamodb::Error::from)
                .context("Scan failed")?;

            let page: Vec<CustomerItem> = from_items(output.items.unwrap_or_default())
                .context("failed to unmarshal customers")?;
            customers.extend(page.into_iter().map(Customer::from));

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => last_evaluated_key = Some(key),
                _ => break,
            }
        }

        Ok(customers)
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(id)))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)
            .context("DeleteItem failed")?;
        Ok(())
    }
}
