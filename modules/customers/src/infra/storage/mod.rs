pub mod bootstrap;
pub mod dynamo_repo;
pub mod entity;
pub mod memory_repo;

pub use bootstrap::{
    connect, ensure_table_exists, BootstrapError, BootstrapOptions, TableAdmin, TableProvisioning,
};
pub use dynamo_repo::DynamoCustomersRepository;
pub use memory_repo::InMemoryCustomersRepository;
