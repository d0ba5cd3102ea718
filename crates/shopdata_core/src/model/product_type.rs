//! Product category lookup entity.

use super::{check_id, check_not_blank, Entity, EntityId, ValidationError};
use serde::{Deserialize, Serialize};

/// Product category row from `ProductTypes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductType {
    pub id: EntityId,
    pub name: String,
}

impl ProductType {
    pub fn with_id(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for ProductType {
    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_id(self.id)?;
        check_not_blank("Name", &self.name)
    }
}
