use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::models::{Drink, DrinkDraft, DrinkUpdate, Ingredient};
use super::store::{DrinkStore, StoreError};

/// Process-local drink store, used when no database is configured and in tests
#[derive(Debug, Default)]
pub struct MemoryDrinkStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    drinks: BTreeMap<i64, Drink>,
    last_id: i64,
}

impl Inner {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the starter menu
    pub fn seeded() -> Self {
        let mut inner = Inner::default();
        let water = seed_drink(1);
        inner.drinks.insert(water.id, water);
        inner.last_id = 1;
        Self {
            inner: RwLock::new(inner),
        }
    }
}

/// The single drink a freshly reset menu starts with
pub(crate) fn seed_drink(id: i64) -> Drink {
    Drink {
        id,
        title: "water".to_string(),
        recipe: vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }],
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        Ok(self.inner.read().await.drinks.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        Ok(self.inner.read().await.drinks.get(&id).cloned())
    }

    async fn insert(&self, draft: DrinkDraft) -> Result<Drink, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.title_taken(&draft.title, None) {
            return Err(StoreError::DuplicateTitle(draft.title));
        }

        inner.last_id += 1;
        let drink = Drink {
            id: inner.last_id,
            title: draft.title,
            recipe: draft.recipe,
        };
        inner.drinks.insert(drink.id, drink.clone());
        Ok(drink)
    }

    async fn update(&self, id: i64, update: DrinkUpdate) -> Result<Drink, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.drinks.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if let Some(title) = &update.title {
            if inner.title_taken(title, Some(id)) {
                return Err(StoreError::DuplicateTitle(title.clone()));
            }
        }

        let drink = inner.drinks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(title) = update.title {
            drink.title = title;
        }
        if let Some(recipe) = update.recipe {
            drink.recipe = recipe;
        }
        Ok(drink.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .drinks
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> DrinkDraft {
        DrinkDraft {
            title: title.to_string(),
            recipe: vec![Ingredient {
                name: "espresso".into(),
                color: "brown".into(),
                parts: 1,
            }],
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryDrinkStore::seeded();
        let first = store.insert(draft("espresso")).await.unwrap();
        let second = store.insert(draft("doppio")).await.unwrap();
        assert_eq!(first.id, 2);
        assert_eq!(second.id, 3);
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn close_leaves_drinks_readable() {
        let store = MemoryDrinkStore::seeded();
        store.close().await;
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryDrinkStore::new();
        let first = store.insert(draft("espresso")).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.insert(draft("espresso")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn duplicate_titles_are_rejected() {
        let store = MemoryDrinkStore::seeded();
        let err = store.insert(draft("water")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTitle(t) if t == "water"));

        let mocha = store.insert(draft("mocha")).await.unwrap();
        let update = DrinkUpdate {
            title: Some("water".into()),
            recipe: None,
        };
        assert!(matches!(
            store.update(mocha.id, update).await,
            Err(StoreError::DuplicateTitle(_))
        ));
    }

    #[tokio::test]
    async fn update_applies_only_given_fields() {
        let store = MemoryDrinkStore::seeded();
        let updated = store
            .update(
                1,
                DrinkUpdate {
                    title: Some("sparkling water".into()),
                    recipe: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "sparkling water");
        assert_eq!(updated.recipe, seed_drink(1).recipe);

        // Keeping its own title is not a conflict
        let same = DrinkUpdate {
            title: Some("sparkling water".into()),
            recipe: None,
        };
        assert!(store.update(1, same).await.is_ok());
    }

    #[tokio::test]
    async fn missing_ids_report_not_found() {
        let store = MemoryDrinkStore::seeded();
        assert!(store.get_by_id(999).await.unwrap().is_none());
        assert!(matches!(
            store.update(999, DrinkUpdate::default()).await,
            Err(StoreError::NotFound(999))
        ));
        assert!(matches!(store.delete(999).await, Err(StoreError::NotFound(999))));
    }
}
