use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{Customer, CustomerUpdate, NewCustomer};
use crate::domain::error::DomainError;
use crate::domain::repo::CustomersRepository;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Customer domain service. Validation and id assignment live here; storage
/// goes through [`CustomersRepository`].
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn CustomersRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn CustomersRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "customers.service.list_customers", skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, DomainError> {
        let customers = self
            .repo
            .list()
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;
        debug!(count = customers.len(), "Listed customers");
        Ok(customers)
    }

    #[instrument(name = "customers.service.get_customer", skip(self))]
    pub async fn get_customer(&self, id: &str) -> Result<Customer, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?
            .ok_or_else(|| DomainError::customer_not_found(id))
    }

    /// `CustomerNotFound` unless a customer with `id` is stored.
    #[instrument(name = "customers.service.ensure_exists", skip(self))]
    pub async fn ensure_exists(&self, id: &str) -> Result<(), DomainError> {
        self.get_customer(id).await.map(|_| ())
    }

    #[instrument(
        name = "customers.service.create_customer",
        skip(self, new_customer),
        fields(id = tracing::field::Empty)
    )]
    pub async fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer, DomainError> {
        validate(&new_customer.name, &new_customer.email)?;

        let id = new_customer
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        tracing::Span::current().record("id", id.as_str());

        let customer = Customer {
            id,
            name: new_customer.name,
            email: new_customer.email,
            telephone: new_customer.telephone,
        };
        self.repo
            .put(customer.clone())
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;

        info!("Created customer");
        Ok(customer)
    }

    /// Replaces every field of the customer stored under `id`.
    ///
    /// Does not check that the customer exists; callers that must answer
    /// "not found" call [`Service::ensure_exists`] first.
    #[instrument(name = "customers.service.update_customer", skip(self, update))]
    pub async fn update_customer(
        &self,
        id: &str,
        update: CustomerUpdate,
    ) -> Result<Customer, DomainError> {
        validate(&update.name, &update.email)?;

        let customer = Customer {
            id: id.to_owned(),
            name: update.name,
            email: update.email,
            telephone: update.telephone,
        };
        self.repo
            .put(customer.clone())
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;

        info!("Updated customer");
        Ok(customer)
    }

    /// Idempotent; see [`Service::ensure_exists`] for the "not found" answer.
    #[instrument(name = "customers.service.delete_customer", skip(self))]
    pub async fn delete_customer(&self, id: &str) -> Result<(), DomainError> {
        self.repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;
        info!("Deleted customer");
        Ok(())
    }
}

fn validate(name: &str, email: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name", "is required"));
    }
    if email.is_empty() {
        return Err(DomainError::validation("email", "is required"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(DomainError::validation(
            "email",
            format!("'{email}' is not a valid email address"),
        ));
    }
    Ok(())
}
