use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use tracing::info;

use super::memory::seed_drink;
use super::models::{Drink, DrinkDraft, DrinkRow, DrinkUpdate};
use super::store::{DrinkStore, StoreError};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drinks (
        id BIGSERIAL PRIMARY KEY,
        title VARCHAR(80) NOT NULL UNIQUE,
        recipe JSONB NOT NULL
    )
"#;

/// Drink store backed by a PostgreSQL `drinks` table
#[derive(Debug, Clone)]
pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("Connected drink store (max {} connections)", max_connections);
        Ok(Self::new(pool))
    }

    /// Create the drinks table when it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Drop every drink and start over from the seeded menu
    pub async fn reset(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS drinks").execute(&mut *tx).await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;

        let water = seed_drink(1);
        sqlx::query("INSERT INTO drinks (title, recipe) VALUES ($1, $2)")
            .bind(&water.title)
            .bind(Json(&water.recipe))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Drinks table reset and seeded");
        Ok(())
    }
}

/// Unique violations on `title` become a typed duplicate error
fn map_write_error(err: sqlx::Error, title: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateTitle(title.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StoreError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Drink::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        let row = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Drink::from))
    }

    async fn insert(&self, draft: DrinkDraft) -> Result<Drink, StoreError> {
        sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&draft.title)
        .bind(Json(&draft.recipe))
        .fetch_one(&self.pool)
        .await
        .map(Drink::from)
        .map_err(|e| map_write_error(e, &draft.title))
    }

    async fn update(&self, id: i64, update: DrinkUpdate) -> Result<Drink, StoreError> {
        // COALESCE keeps the stored value for fields the update leaves out
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drinks
               SET title = COALESCE($2, title),
                   recipe = COALESCE($3, recipe)
             WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(update.title.as_deref())
        .bind(update.recipe.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, update.title.as_deref().unwrap_or_default()))?;

        row.map(Drink::from).ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
