//! Section-wise merge of sparse user edits into a stored document.
//!
//! Each top-level section is merged according to a [`MergeStrategy`] looked
//! up in a [`MergePolicy`] table:
//!
//! | Strategy             | Incoming value | Effect |
//! |----------------------|----------------|--------|
//! | `ShallowMergeObject` | object         | incoming keys overwrite stored keys; a `null` key removes it; nested arrays are replaced whole |
//! | `ReplaceArray`       | array          | the stored array is replaced |
//! | `ReplaceWhole`       | anything       | the stored value is replaced |
//!
//! Sections absent from the partial are left untouched and an explicit
//! `null` section removes it. The partial is checked in full before any
//! section changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Well-known section names.
pub mod sections {
    pub const GENERAL_INFO_ADDITIONS: &str = "generalInfoAdditions";
    pub const CHAPTER_6A_DEDUCTIONS: &str = "chapter6aDeductions";
    pub const OTHER_INCOME: &str = "otherIncome";
    pub const CARRY_FORWARD_LOSSES: &str = "carryForwardLosses";
    pub const SELF_ASSESSMENT_TAX: &str = "selfAssessmentTax";
    pub const ADVANCE_TAX: &str = "advanceTax";
    pub const VERIFICATION: &str = "verification";
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("partial document must be a JSON object")]
    NotAnObject,

    #[error("section '{section}' must be {expected}")]
    SectionShape {
        section: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    ShallowMergeObject,
    ReplaceArray,
    ReplaceWhole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePolicy {
    sections: BTreeMap<String, MergeStrategy>,
    fallback: MergeStrategy,
}

impl MergePolicy {
    /// A policy with no section entries.
    pub fn with_fallback(fallback: MergeStrategy) -> Self {
        Self {
            sections: BTreeMap::new(),
            fallback,
        }
    }

    /// The policy for the sections the filing workflow knows about.
    pub fn standard() -> Self {
        use MergeStrategy::*;
        use sections::*;

        Self::with_fallback(ReplaceWhole)
            .with_section(GENERAL_INFO_ADDITIONS, ShallowMergeObject)
            .with_section(CHAPTER_6A_DEDUCTIONS, ShallowMergeObject)
            .with_section(OTHER_INCOME, ShallowMergeObject)
            .with_section(CARRY_FORWARD_LOSSES, ReplaceArray)
            .with_section(SELF_ASSESSMENT_TAX, ReplaceArray)
            .with_section(ADVANCE_TAX, ReplaceArray)
            .with_section(VERIFICATION, ReplaceWhole)
    }

    pub fn with_section(
        mut self,
        section: impl Into<String>,
        strategy: MergeStrategy,
    ) -> Self {
        self.sections.insert(section.into(), strategy);
        self
    }

    pub fn strategy_for(
        &self,
        section: &str,
    ) -> MergeStrategy {
        self.sections.get(section).copied().unwrap_or(self.fallback)
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Merges `partial` into `existing` and returns the new section map.
///
/// `existing` is never modified; on error nothing has been applied.
///
/// # Errors
///
/// Returns [`MergeError`] if `partial` is not an object or a section's value
/// does not have the shape its strategy requires.
pub fn merge_sections(
    existing: &Map<String, Value>,
    partial: &Value,
    policy: &MergePolicy,
) -> Result<Map<String, Value>, MergeError> {
    let incoming = partial.as_object().ok_or(MergeError::NotAnObject)?;

    for (section, value) in incoming {
        check_shape(section, value, policy.strategy_for(section))?;
    }

    let mut merged = existing.clone();
    for (section, value) in incoming {
        if value.is_null() {
            merged.remove(section);
            debug!(section = %section, "section removed");
            continue;
        }

        let strategy = policy.strategy_for(section);
        let next = match (strategy, merged.get(section)) {
            (MergeStrategy::ShallowMergeObject, Some(Value::Object(stored))) => {
                Value::Object(overlay(stored, value))
            }
            (MergeStrategy::ShallowMergeObject, _) => {
                Value::Object(overlay(&Map::new(), value))
            }
            (MergeStrategy::ReplaceArray | MergeStrategy::ReplaceWhole, _) => value.clone(),
        };
        debug!(section = %section, ?strategy, "section merged");
        merged.insert(section.clone(), next);
    }

    Ok(merged)
}

fn check_shape(
    section: &str,
    value: &Value,
    strategy: MergeStrategy,
) -> Result<(), MergeError> {
    let expected = match strategy {
        MergeStrategy::ShallowMergeObject if !(value.is_object() || value.is_null()) => "an object",
        MergeStrategy::ReplaceArray if !(value.is_array() || value.is_null()) => "an array",
        _ => return Ok(()),
    };
    Err(MergeError::SectionShape {
        section: section.to_string(),
        expected,
    })
}

fn overlay(
    stored: &Map<String, Value>,
    incoming: &Value,
) -> Map<String, Value> {
    let mut result = stored.clone();
    if let Some(incoming) = incoming.as_object() {
        for (key, value) in incoming {
            if value.is_null() {
                result.remove(key);
            } else {
                result.insert(key.clone(), value.clone());
            }
        }
    }
    result
}
