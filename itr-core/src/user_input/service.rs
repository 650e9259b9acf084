use serde_json::Value;
use thiserror::Error;
use tracing::info;

use super::merge::{MergeError, MergePolicy};
use crate::db::{RepositoryError, ReturnRepository};
use crate::models::{UserInputDocument, UserInputKey};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserInputError {
    #[error("invalid edits: {0}")]
    Merge(#[from] MergeError),

    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Loads (or creates) the document for `key`, merges `partial` into it and
/// saves it guarded by the loaded revision.
///
/// Nothing is written when the partial is rejected. A concurrent save
/// between the load and the write surfaces as
/// [`RepositoryError::Conflict`].
pub async fn apply_user_edits<R>(
    repository: &R,
    key: &UserInputKey,
    partial: &Value,
    policy: &MergePolicy,
) -> Result<UserInputDocument, UserInputError>
where
    R: ReturnRepository + ?Sized,
{
    let mut document = repository.get_or_create_user_input(key).await?;
    document.merge(partial, policy)?;
    let saved = repository.save_user_input(&document).await?;

    info!(
        owner_id = %key.owner_id,
        assessment_period = %key.assessment_period,
        revision = saved.revision,
        "user input saved"
    );
    Ok(saved)
}
