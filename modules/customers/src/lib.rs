//! Customer domain: contract model, service, storage adapters and REST surface.

pub mod api;
pub mod contract;
pub mod domain;
pub mod infra;

pub use domain::service::Service;
