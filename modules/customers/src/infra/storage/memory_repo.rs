use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::contract::model::Customer;
use crate::domain::repo::CustomersRepository;

/// Process-local store for tests and `--mock` runs.
#[derive(Debug, Default)]
pub struct InMemoryCustomersRepository {
    customers: RwLock<HashMap<String, Customer>>,
}

impl InMemoryCustomersRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomersRepository for InMemoryCustomersRepository {
    async fn put(&self, customer: Customer) -> anyhow::Result<()> {
        self.customers
            .write()
            .await
            .insert(customer.id.clone(), customer);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Customer>> {
        Ok(self.customers.read().await.get(id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<Customer>> {
        Ok(self.customers.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        self.customers.write().await.remove(id);
        Ok(())
    }
}
