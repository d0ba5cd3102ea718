//! Product use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for API-facing callers.
//! - Own stock adjustments on top of the generic repository.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::product::Product;
use crate::model::EntityId;
use crate::repo::entity_repo::{RepoError, RepoResult, Repository};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    /// Adjustment would leave less than zero items in stock.
    InsufficientStock {
        id: EntityId,
        available: i64,
        requested: i64,
    },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::InsufficientStock {
                id,
                available,
                requested,
            } => write!(
                f,
                "product {id} has {available} in stock, cannot remove {requested}"
            ),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InsufficientStock { .. } => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapper for product operations.
pub struct ProductService<R: Repository<Product>> {
    repo: R,
}

impl<R: Repository<Product>> ProductService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_products(&self) -> RepoResult<Vec<Product>> {
        self.repo.get_all()
    }

    pub fn get_product(&self, id: EntityId) -> RepoResult<Product> {
        self.repo.get(id)
    }

    /// Persists `product` and returns it with its final identity.
    pub fn create_product(&self, product: &Product) -> RepoResult<Product> {
        let id = self.repo.create(product)?;
        let mut created = product.clone();
        created.id = id;
        Ok(created)
    }

    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_product(&self, product: &Product) -> RepoResult<()> {
        self.repo.update(product)
    }

    pub fn delete_product(&self, id: EntityId) -> RepoResult<()> {
        self.repo.delete(id)
    }

    /// Adds `delta` (negative to remove) to a product's stock.
    ///
    /// # Contract
    /// - Returns the updated product.
    /// - Rejects adjustments that would make the quantity negative, leaving
    ///   the row untouched.
    pub fn adjust_quantity(&self, id: EntityId, delta: i64) -> ServiceResult<Product> {
        let mut product = self.repo.get(id)?;
        let next = product.quantity.checked_add(delta).filter(|value| *value >= 0);
        let Some(quantity) = next else {
            return Err(ServiceError::InsufficientStock {
                id,
                available: product.quantity,
                requested: delta.saturating_neg(),
            });
        };

        product.quantity = quantity;
        self.repo.update(&product)?;
        Ok(product)
    }
}
