use async_trait::async_trait;

use crate::contract::model::Customer;

/// Storage port for customers. Adapters live in `infra::storage`.
#[async_trait]
pub trait CustomersRepository: Send + Sync {
    /// Insert or fully replace the customer stored under `customer.id`.
    async fn put(&self, customer: Customer) -> anyhow::Result<()>;

    /// `Ok(None)` when no customer has this id.
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Customer>>;

    /// Every stored customer, in no particular order.
    async fn list(&self) -> anyhow::Result<Vec<Customer>>;

    /// Removing an id that does not exist succeeds.
    async fn delete(&self, id: &str) -> anyhow::Result<()>;
}
