//! Product entity.
//!
//! # Invariants
//! - `quantity` is never negative.
//! - `type_id` and `brand_id` point at existing `ProductTypes` / `Brands` rows
//!   (checked by the store's foreign keys).

use super::{
    check_id, check_not_blank, check_reference, Entity, EntityId, ValidationError, UNSAVED_ID,
};
use serde::{Deserialize, Serialize};

/// Stocked product row from `Products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    pub quantity: i64,
    pub type_id: EntityId,
    pub brand_id: EntityId,
}

impl Product {
    /// Creates an unsaved product; `create` assigns the identity.
    pub fn new(
        name: impl Into<String>,
        quantity: i64,
        type_id: EntityId,
        brand_id: EntityId,
    ) -> Self {
        Self::with_id(UNSAVED_ID, name, quantity, type_id, brand_id)
    }

    /// Creates a product with a caller-provided identity.
    pub fn with_id(
        id: EntityId,
        name: impl Into<String>,
        quantity: i64,
        type_id: EntityId,
        brand_id: EntityId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            quantity,
            type_id,
            brand_id,
        }
    }
}

impl Entity for Product {
    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_id(self.id)?;
        check_not_blank("Name", &self.name)?;
        if self.quantity < 0 {
            return Err(ValidationError::NegativeQuantity(self.quantity));
        }
        check_reference("TypeId", self.type_id)?;
        check_reference("BrandId", self.brand_id)?;
        Ok(())
    }
}
