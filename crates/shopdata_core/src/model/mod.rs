//! Row-backed domain entities for the shop catalog.
//!
//! # Responsibility
//! - Define the entity shapes exchanged with repositories and higher layers.
//! - Provide the base contract every repository-managed entity satisfies.
//!
//! # Invariants
//! - Every entity is identified by an integer `EntityId`.
//! - `UNSAVED_ID` (0) marks an entity whose identity the store assigns.
//! - Referential integrity is enforced by the store, not by `validate()`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod brand;
pub mod product;
pub mod product_type;
pub mod town;

/// Integer identity shared by all entities.
pub type EntityId = i64;

/// Identity carried by an entity that has not been persisted yet.
pub const UNSAVED_ID: EntityId = 0;

/// Base contract for repository-managed entities.
pub trait Entity {
    /// Stable identity of this row.
    fn id(&self) -> EntityId;

    /// Replaces the identity, used once the store assigns one.
    fn set_id(&mut self, id: EntityId);

    /// Checks field-level invariants before persistence.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Returns whether the store still has to assign this entity's identity.
    fn is_unsaved(&self) -> bool {
        self.id() == UNSAVED_ID
    }
}

/// Field-level validation failures shared by all entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identity must be `UNSAVED_ID` or positive.
    NegativeId(EntityId),
    /// Name-like field is empty or whitespace only.
    BlankField(&'static str),
    /// Quantity cannot go below zero.
    NegativeQuantity(i64),
    /// Reference to another table must be a positive identity.
    InvalidReference {
        field: &'static str,
        value: EntityId,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeId(id) => write!(f, "entity id must not be negative, got {id}"),
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::NegativeQuantity(quantity) => {
                write!(f, "quantity must not be negative, got {quantity}")
            }
            Self::InvalidReference { field, value } => {
                write!(f, "`{field}` must reference a positive id, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn check_id(id: EntityId) -> Result<(), ValidationError> {
    if id < 0 {
        return Err(ValidationError::NegativeId(id));
    }
    Ok(())
}

pub(crate) fn check_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn check_reference(field: &'static str, value: EntityId) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::InvalidReference { field, value });
    }
    Ok(())
}
