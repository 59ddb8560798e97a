use async_trait::async_trait;
use thiserror::Error;

use super::models::{Drink, DrinkDraft, DrinkUpdate};

/// Errors from drink persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Drink {0} not found")]
    NotFound(i64),

    #[error("A drink titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// CRUD contract for persisted drinks.
///
/// Consistency of concurrent writers is the implementation's concern;
/// handlers only rely on the not-found and duplicate-title signals.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Drink>, StoreError>;

    async fn insert(&self, draft: DrinkDraft) -> Result<Drink, StoreError>;

    async fn update(&self, id: i64, update: DrinkUpdate) -> Result<Drink, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Release backing resources once the server has stopped
    async fn close(&self) {}
}
