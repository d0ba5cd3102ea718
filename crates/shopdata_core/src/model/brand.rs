//! Brand lookup entity.

use super::{check_id, check_not_blank, check_reference, Entity, EntityId, ValidationError};
use serde::{Deserialize, Serialize};

/// Manufacturer brand row from `Brands`, located in a town.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Brand {
    pub id: EntityId,
    pub name: String,
    pub town_id: EntityId,
}

impl Brand {
    pub fn with_id(id: EntityId, name: impl Into<String>, town_id: EntityId) -> Self {
        Self {
            id,
            name: name.into(),
            town_id,
        }
    }
}

impl Entity for Brand {
    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_id(self.id)?;
        check_not_blank("Name", &self.name)?;
        check_reference("TownId", self.town_id)
    }
}
