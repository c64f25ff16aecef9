//! Store connection and table provisioning, run once before the server starts.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::{
    config::Region,
    types::{
        AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput,
        ScalarAttributeType, TableStatus,
    },
    Client,
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::infra::storage::entity::KEY_ATTRIBUTE;

pub const READ_CAPACITY_UNITS: i64 = 5;
pub const WRITE_CAPACITY_UNITS: i64 = 5;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid store endpoint '{endpoint}': {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("failed to list tables")]
    ListTables(#[source] anyhow::Error),

    #[error("failed to create table '{table}'")]
    CreateTable {
        table: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to describe table '{table}'")]
    DescribeTable {
        table: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("table '{table}' did not become active after {attempts} attempts")]
    Timeout { table: String, attempts: u32 },
}

/// How long to wait for a freshly created table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapOptions {
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// What [`ensure_table_exists`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableProvisioning {
    AlreadyExists,
    Created,
}

/// Table administration calls used during bootstrap.
#[async_trait]
pub trait TableAdmin: Send + Sync {
    async fn list_table_names(&self) -> anyhow::Result<Vec<String>>;

    /// Creates `table` with a string `id` hash key and fixed provisioned throughput.
    async fn create_keyed_table(&self, table: &str) -> anyhow::Result<()>;

    async fn table_status(&self, table: &str) -> anyhow::Result<Option<TableStatus>>;
}

/// Builds a DynamoDB client for `region`, talking to `endpoint`.
///
/// Credentials come from the default provider chain.
pub async fn connect(region: &str, endpoint: &str) -> Result<Client, BootstrapError> {
    let url = Url::parse(endpoint).map_err(|e| BootstrapError::Connect {
        endpoint: endpoint.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(BootstrapError::Connect {
            endpoint: endpoint.to_owned(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_owned()))
        .endpoint_url(endpoint)
        .load()
        .await;

    debug!(region, endpoint, "DynamoDB client configured");
    Ok(Client::new(&sdk_config))
}

/// Creates `table` unless it already exists, then waits for it to become active.
pub async fn ensure_table_exists(
    admin: &dyn TableAdmin,
    table: &str,
    options: &BootstrapOptions,
) -> Result<TableProvisioning, BootstrapError> {
    let existing = admin
        .list_table_names()
        .await
        .map_err(BootstrapError::ListTables)?;

    if existing.iter().any(|name| name == table) {
        info!(table, "Table already exists");
        return Ok(TableProvisioning::AlreadyExists);
    }

    info!(table, "Creating table");
    admin
        .create_keyed_table(table)
        .await
        .map_err(|source| BootstrapError::CreateTable {
            table: table.to_owned(),
            source,
        })?;

    wait_until_active(admin, table, options).await?;
    info!(table, "Table is active");
    Ok(TableProvisioning::Created)
}

async fn wait_until_active(
    admin: &dyn TableAdmin,
    table: &str,
    options: &BootstrapOptions,
) -> Result<(), BootstrapError> {
    for attempt in 1..=options.max_attempts {
        let status = admin
            .table_status(table)
            .await
            .map_err(|source| BootstrapError::DescribeTable {
                table: table.to_owned(),
                source,
            })?;

        if status == Some(TableStatus::Active) {
            return Ok(());
        }

        debug!(table, attempt, ?status, "Waiting for table to become active");
        tokio::time::sleep(options.poll_interval).await;
    }

    Err(BootstrapError::Timeout {
        table: table.to_owned(),
        attempts: options.max_attempts,
    })
}

#[async_trait]
impl TableAdmin for Client {
    async fn list_table_names(&self) -> anyhow::Result<Vec<String>> {
        let mut names = Vec::new();
        let mut start = None;

        loop {
            let output = self
                .list_tables()
                .set_exclusive_start_table_name(start.take())
                .send()
                .await
                .map_err(aws_sdk_dynamodb::Error::from)
                .context("ListTables failed")?;

            names.extend(output.table_names.unwrap_or_default());
            match output.last_evaluated_table_name {
                Some(next) => start = Some(next),
                None => break,
            }
        }

        Ok(names)
    }

    async fn create_keyed_table(&self, table: &str) -> anyhow::Result<()> {
        let key_schema = KeySchemaElement::builder()
            .attribute_name(KEY_ATTRIBUTE)
            .key_type(KeyType::Hash)
            .build()?;
        let attribute = AttributeDefinition::builder()
            .attribute_name(KEY_ATTRIBUTE)
            .attribute_type(ScalarAttributeType::S)
            .build()?;
        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(READ_CAPACITY_UNITS)
            .write_capacity_units(WRITE_CAPACITY_UNITS)
            .build()?;

        self.create_table()
            .table_name(table)
            .key_schema(key_schema)
            .attribute_definitions(attribute)
            .provisioned_throughput(throughput)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)
            .context("CreateTable failed")?;
        Ok(())
    }

    async fn table_status(&self, table: &str) -> anyhow::Result<Option<TableStatus>> {
        let output = self
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)
            .context("DescribeTable failed")?;

        Ok(output.table.and_then(|t| t.table_status))
    }
}
