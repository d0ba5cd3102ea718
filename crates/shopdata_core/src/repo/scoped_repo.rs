//! Connection-per-call repository.
//!
//! # Responsibility
//! - Serve the `Repository` contract without holding a connection open.
//!
//! # Invariants
//! - Each call opens one connection, runs one operation, and closes the
//!   connection before returning, on success and on error.

use crate::config::ConnectionSettings;
use crate::db::open_db;
use crate::model::EntityId;
use crate::repo::entity_repo::{RepoResult, Repository, SqliteRepository};
use crate::repo::mapping::TableMapping;
use log::warn;
use std::marker::PhantomData;

/// Repository that owns connection settings instead of a connection.
pub struct ScopedRepository<T> {
    settings: ConnectionSettings,
    _entity: PhantomData<fn() -> T>,
}

impl<T: TableMapping> ScopedRepository<T> {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            _entity: PhantomData,
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    fn with_repo<R>(
        &self,
        operation: &'static str,
        run: impl FnOnce(&SqliteRepository<'_, T>) -> RepoResult<R>,
    ) -> RepoResult<R> {
        let conn = open_db(&self.settings)?;
        let repo = SqliteRepository::<T>::try_new(&conn)?;
        let result = run(&repo);
        if let Err(err) = &result {
            if !err.is_not_found() {
                warn!(
                    "event=repo_call module=repo status=error table={} op={} error={}",
                    T::TABLE,
                    operation,
                    err
                );
            }
        }
        result
    }
}

impl<T: TableMapping> Repository<T> for ScopedRepository<T> {
    fn get_all(&self) -> RepoResult<Vec<T>> {
        self.with_repo("get_all", |repo| repo.get_all())
    }

    fn get(&self, id: EntityId) -> RepoResult<T> {
        self.with_repo("get", |repo| repo.get(id))
    }

    fn create(&self, item: &T) -> RepoResult<EntityId> {
        self.with_repo("create", |repo| repo.create(item))
    }

    fn update(&self, item: &T) -> RepoResult<()> {
        self.with_repo("update", |repo| repo.update(item))
    }

    fn delete(&self, id: EntityId) -> RepoResult<()> {
        self.with_repo("delete", |repo| repo.delete(id))
    }
}
