//! Test fixture support: table seeds, backup/restore and rollback guards.
//!
//! # Responsibility
//! - Reset tables to a known, literal starting state.
//! - Wrap a test in a snapshot/restore envelope so it leaves no trace.
//!
//! # Invariants
//! - Seeds run in foreign-key order: Towns, Brands, ProductTypes, Products.
//! - Wipes run in the reverse order.
//! - A failed restore poisons the database location for later backups.

pub mod backup;
pub mod harness;
pub mod rollback;
pub mod seed;

pub use backup::{BackupError, BackupResult, BackupService, BackupSnapshot};
pub use harness::{FixtureError, FixtureHarness, FixtureResult};
pub use rollback::RollbackGuard;
pub use seed::{
    delete_all_from_database, delete_all_on, reset_on, seed_all, BrandSeed, ProductSeed,
    ProductTypeSeed, TableSeed, TownSeed,
};
