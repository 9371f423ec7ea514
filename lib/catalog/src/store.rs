//! The quiz store contract and the repository over it.

use crate::error::{CatalogError, StoreError};
use crate::quiz::{Quiz, QuizDraft};
use async_trait::async_trait;
use quizpress_core::QuizId;
use rootcause::prelude::Report;
use std::sync::Arc;
use tracing::{info, instrument};

/// The hosted quiz document collection.
#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Lists all quizzes, in no particular order.
    async fn list(&self) -> Result<Vec<Quiz>, StoreError>;

    /// Fetches one quiz, if present.
    async fn get(&self, id: &QuizId) -> Result<Option<Quiz>, StoreError>;

    /// Creates or replaces the document for `id`. The creation timestamp is
    /// stamped by the store on first write and preserved on replacement.
    async fn put(&self, id: &QuizId, draft: &QuizDraft) -> Result<(), StoreError>;

    /// Deletes the document for `id`. A no-op if absent.
    async fn delete(&self, id: &QuizId) -> Result<(), StoreError>;
}

/// CRUD wrapper over the quiz store.
///
/// Adds the two behaviors the raw store does not have: client-assigned IDs
/// on creation and newest-first ordering on listing.
pub struct QuizRepository {
    store: Arc<dyn QuizStore>,
}

impl QuizRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    /// Lists all quizzes, newest first.
    ///
    /// # Errors
    ///
    /// Returns a catalog error if the store cannot be read.
    pub async fn list(&self) -> Result<Vec<Quiz>, Report<CatalogError>> {
        let mut quizzes = self.store.list().await.map_err(store_error)?;
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quizzes)
    }

    /// Fetches one quiz.
    ///
    /// # Errors
    ///
    /// `CatalogError::NotFound` if no quiz exists for the ID.
    pub async fn get(&self, id: &QuizId) -> Result<Quiz, Report<CatalogError>> {
        self.store
            .get(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| CatalogError::NotFound { id: *id }.into())
    }

    /// Creates a new quiz and returns it with its resolved creation time.
    ///
    /// # Errors
    ///
    /// Returns a catalog error if the store rejects the write.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: &QuizDraft) -> Result<Quiz, Report<CatalogError>> {
        let id = QuizId::new();
        self.store.put(&id, draft).await.map_err(store_error)?;
        // Read back to resolve the store-assigned creation timestamp.
        let quiz = self.get(&id).await?;
        info!(%id, "quiz created");
        Ok(quiz)
    }

    /// Replaces an existing quiz's content.
    ///
    /// # Errors
    ///
    /// `CatalogError::NotFound` if no quiz exists for the ID.
    #[instrument(skip(self, draft), fields(id = %id))]
    pub async fn update(&self, id: &QuizId, draft: &QuizDraft) -> Result<Quiz, Report<CatalogError>> {
        // Updating a missing document is an error, not an upsert.
        self.get(id).await?;
        self.store.put(id, draft).await.map_err(store_error)?;
        self.get(id).await
    }

    /// Deletes a quiz.
    ///
    /// # Errors
    ///
    /// Returns a catalog error if the store rejects the delete.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: &QuizId) -> Result<(), Report<CatalogError>> {
        self.store.delete(id).await.map_err(store_error)?;
        info!("quiz deleted");
        Ok(())
    }
}

fn store_error(error: StoreError) -> Report<CatalogError> {
    CatalogError::Store {
        reason: error.to_string(),
    }
    .into()
}
