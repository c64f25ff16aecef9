use serde::{Deserialize, Serialize};

use crate::contract::model::{Customer, CustomerUpdate, NewCustomer};

/// REST DTO for customer representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub telephone: String,
}

/// Request body for POST and PUT.
///
/// Absent fields deserialize to empty values so that the domain rules, not
/// the JSON parser, decide what is missing. `id` is ignored on PUT.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerReq {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub telephone: String,
}

/// Body returned by a successful DELETE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub message: String,
}

impl From<Customer> for CustomerDto {
    fn from(c: Customer) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            telephone: c.telephone,
        }
    }
}

impl From<CustomerReq> for NewCustomer {
    fn from(req: CustomerReq) -> Self {
        Self {
            id: req.id,
            name: req.name,
            email: req.email,
            telephone: req.telephone,
        }
    }
}

impl From<CustomerReq> for CustomerUpdate {
    fn from(req: CustomerReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            telephone: req.telephone,
        }
    }
}
