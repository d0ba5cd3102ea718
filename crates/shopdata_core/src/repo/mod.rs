//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the generic CRUD contract consumed by services and API layers.
//! - Isolate SQLite query details behind per-entity table mappings.
//!
//! # Invariants
//! - Repository writes must enforce `Entity::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors; store constraint failures pass through untranslated.

pub mod entity_repo;
pub mod mapping;
pub mod scoped_repo;

pub use entity_repo::{
    BrandRepository, ProductRepository, ProductTypeRepository, RepoError, RepoResult, Repository,
    SqliteRepository, TownRepository,
};
pub use mapping::TableMapping;
pub use scoped_repo::ScopedRepository;
