//! Harvest Core: tenant registry, business records and the storage-agnostic
//! tenant-scoped repository contract.

pub mod error;
pub mod models;
pub mod repository;
pub mod tenant;
pub mod validation;
