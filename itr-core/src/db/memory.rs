//! In-memory [`ReturnRepository`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::repository::{RepositoryError, ReturnRepository};
use crate::models::{Regime, TaxSlab, UserInputDocument, UserInputKey};

/// Keeps documents in a map and enforces the revision check. Slab tables
/// are not stored.
#[derive(Default)]
pub struct MemoryRepository {
    documents: Mutex<HashMap<UserInputKey, UserInputDocument>>,
}

#[async_trait]
impl ReturnRepository for MemoryRepository {
    async fn list_assessment_years(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(vec![])
    }
    async fn get_tax_slabs(
        &self,
        _assessment_year: &str,
        _regime: Regime,
    ) -> Result<Vec<TaxSlab>, RepositoryError> {
        Ok(vec![])
    }
    async fn insert_tax_slab(
        &self,
        _assessment_year: &str,
        _regime: Regime,
        _slab: &TaxSlab,
    ) -> Result<(), RepositoryError> {
        Ok(())
    }
    async fn delete_tax_slabs(
        &self,
        _assessment_year: &str,
        _regime: Regime,
    ) -> Result<(), RepositoryError> {
        Ok(())
    }
    async fn get_user_input(
        &self,
        key: &UserInputKey,
    ) -> Result<UserInputDocument, RepositoryError> {
        self.documents
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
    async fn get_or_create_user_input(
        &self,
        key: &UserInputKey,
    ) -> Result<UserInputDocument, RepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .entry(key.clone())
            .or_insert_with(|| UserInputDocument::empty(key))
            .clone())
    }
    async fn save_user_input(
        &self,
        document: &UserInputDocument,
    ) -> Result<UserInputDocument, RepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        let stored = documents
            .get_mut(&document.key())
            .ok_or(RepositoryError::NotFound)?;
        if stored.revision != document.revision {
            return Err(RepositoryError::Conflict {
                expected: document.revision,
                actual: stored.revision,
            });
        }
        *stored = UserInputDocument {
            revision: document.revision + 1,
            ..document.clone()
        };
        Ok(stored.clone())
    }
    async fn delete_user_input(
        &self,
        key: &UserInputKey,
    ) -> Result<(), RepositoryError> {
        self.documents.lock().unwrap().remove(key);
        Ok(())
    }
    async fn list_user_inputs(
        &self,
        owner_id: &str,
    ) -> Result<Vec<UserInputDocument>, RepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
