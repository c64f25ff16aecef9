/// Pure customer model shared between layers (no serde)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub telephone: String,
}

/// Data for creating a customer. A missing or empty `id` is generated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewCustomer {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub telephone: String,
}

/// Full replacement of a customer's fields; the id always comes from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomerUpdate {
    pub name: String,
    pub email: String,
    pub telephone: String,
}
