use serde::{Deserialize, Serialize};

use crate::contract::model::Customer;

/// Partition key attribute of the customers table.
pub const KEY_ATTRIBUTE: &str = "id";

/// Stored shape of a customer: one string attribute per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerItem {
    pub id: String,
    // Missing attributes read back as ""
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telephone: String,
}

impl From<Customer> for CustomerItem {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            telephone: c.telephone,
        }
    }
}

impl From<CustomerItem> for Customer {
    fn from(item: CustomerItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            email: item.email,
            telephone: item.telephone,
        }
    }
}
