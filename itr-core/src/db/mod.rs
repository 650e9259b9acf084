pub mod factory;
pub mod repository;

#[cfg(test)]
pub(crate) mod memory;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use repository::{RepositoryError, ReturnRepository};
