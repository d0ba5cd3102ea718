//! Data-access layer for the shop catalog (products, brands, towns and
//! product types) over SQLite.
//!
//! Higher layers talk to the generic `Repository<T>` contract; `fixtures`
//! holds the seed/backup tooling the integration tests run against a live
//! database.

pub mod config;
pub mod db;
pub mod fixtures;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, ConnectionSettings};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::brand::Brand;
pub use model::product::Product;
pub use model::product_type::ProductType;
pub use model::town::Town;
pub use model::{Entity, EntityId, ValidationError, UNSAVED_ID};
pub use repo::{
    BrandRepository, ProductRepository, ProductTypeRepository, RepoError, RepoResult, Repository,
    ScopedRepository, SqliteRepository, TableMapping, TownRepository,
};
pub use service::product_service::{ProductService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
