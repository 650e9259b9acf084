use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::user_input::merge::{MergeError, MergePolicy, merge_sections};

/// Schema tag written with every persisted user-input document.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputKey {
    pub owner_id: String,
    pub assessment_period: String,
}

impl UserInputKey {
    pub fn new(
        owner_id: impl Into<String>,
        assessment_period: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            assessment_period: assessment_period.into(),
        }
    }
}

/// Sparse, section-keyed record of what the filer added on top of the
/// income statement. One per owner and assessment period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInputDocument {
    pub owner_id: String,
    pub assessment_period: String,
    pub schema_version: u32,
    /// Incremented by every successful save; used for optimistic writes.
    pub revision: i64,
    #[serde(default)]
    pub sections: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserInputDocument {
    /// The document handed out on first access to a key.
    pub fn empty(key: &UserInputKey) -> Self {
        Self {
            owner_id: key.owner_id.clone(),
            assessment_period: key.assessment_period.clone(),
            schema_version: CURRENT_SCHEMA_VERSION,
            revision: 1,
            sections: Map::new(),
            updated_at: None,
        }
    }

    pub fn key(&self) -> UserInputKey {
        UserInputKey::new(&self.owner_id, &self.assessment_period)
    }

    pub fn is_legacy(&self) -> bool {
        self.schema_version < CURRENT_SCHEMA_VERSION
    }

    pub fn section(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.sections.get(name)
    }

    /// Folds `partial` into this document's sections.
    ///
    /// The document is left untouched when the partial is rejected.
    pub fn merge(
        &mut self,
        partial: &Value,
        policy: &MergePolicy,
    ) -> Result<(), MergeError> {
        self.sections = merge_sections(&self.sections, partial, policy)?;
        self.schema_version = CURRENT_SCHEMA_VERSION;
        Ok(())
    }
}
