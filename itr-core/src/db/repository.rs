use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Regime, TaxSlab, UserInputDocument, UserInputKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Revision conflict: expected {expected}, stored {actual}")]
    Conflict { expected: i64, actual: i64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait ReturnRepository: Send + Sync {
    // Assessment years
    async fn list_assessment_years(&self) -> Result<Vec<String>, RepositoryError>;

    // Tax slabs, returned in ascending bound order with the unbounded slab last
    async fn get_tax_slabs(
        &self,
        assessment_year: &str,
        regime: Regime,
    ) -> Result<Vec<TaxSlab>, RepositoryError>;

    async fn insert_tax_slab(
        &self,
        assessment_year: &str,
        regime: Regime,
        slab: &TaxSlab,
    ) -> Result<(), RepositoryError>;

    async fn delete_tax_slabs(
        &self,
        assessment_year: &str,
        regime: Regime,
    ) -> Result<(), RepositoryError>;

    // User-input documents
    async fn get_user_input(
        &self,
        key: &UserInputKey,
    ) -> Result<UserInputDocument, RepositoryError>;

    /// Returns the stored document, creating and persisting an empty one at
    /// revision 1 if none exists.
    async fn get_or_create_user_input(
        &self,
        key: &UserInputKey,
    ) -> Result<UserInputDocument, RepositoryError>;

    /// Writes `document` if the stored revision still equals
    /// `document.revision`, and returns the stored copy with the revision
    /// incremented.
    ///
    /// # Errors
    /// * [`RepositoryError::NotFound`]: no document exists for the key.
    /// * [`RepositoryError::Conflict`]: another writer saved first.
    async fn save_user_input(
        &self,
        document: &UserInputDocument,
    ) -> Result<UserInputDocument, RepositoryError>;

    async fn delete_user_input(
        &self,
        key: &UserInputKey,
    ) -> Result<(), RepositoryError>;

    async fn list_user_inputs(
        &self,
        owner_id: &str,
    ) -> Result<Vec<UserInputDocument>, RepositoryError>;
}
