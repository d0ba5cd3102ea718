use super::{check_id, check_not_blank, Entity, EntityId, ValidationError};
use serde::{Deserialize, Serialize};

/// Town row from `Towns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Town {
    pub id: EntityId,
    pub name: String,
}

impl Town {
    pub fn with_id(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Entity for Town {
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
