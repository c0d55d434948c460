use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    pub amount: String,
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingCategory {
    pub category: String,
    pub items: Vec<ShoppingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: i64,
    pub meal_plan_id: i64,
    pub items: Json<Vec<ShoppingCategory>>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ShoppingList {
    /// At most one list per plan; the UNIQUE constraint on meal_plan_id
    /// backs that up.
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        meal_plan_id: i64,
        items: &[ShoppingCategory],
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO shopping_lists (meal_plan_id, items)
            VALUES ($1, $2)
            "#,
        )
        .bind(meal_plan_id)
        .bind(Json(items))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn get(db: &PgPool, id: i64) -> anyhow::Result<Option<ShoppingList>> {
        let list = sqlx::query_as::<_, ShoppingList>(
            r#"
            SELECT id, meal_plan_id, items, created_at
            FROM shopping_lists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(list)
    }

    pub async fn get_by_plan(db: &PgPool, meal_plan_id: i64) -> anyhow::Result<Option<ShoppingList>> {
        let list = sqlx::query_as::<_, ShoppingList>(
            r#"
            SELECT id, meal_plan_id, items, created_at
            FROM shopping_lists
            WHERE meal_plan_id = $1
            "#,
        )
        .bind(meal_plan_id)
        .fetch_optional(db)
        .await?;
        Ok(list)
    }

    /// Whole-document replace; the later of two concurrent writes wins.
    pub async fn update_items(
        db: &PgPool,
        id: i64,
        items: &[ShoppingCategory],
    ) -> anyhow::Result<ShoppingList> {
        let list = sqlx::query_as::<_, ShoppingList>(
            r#"
            UPDATE shopping_lists
            SET items = $2
            WHERE id = $1
            RETURNING id, meal_plan_id, items, created_at
            "#,
        )
        .bind(id)
        .bind(Json(items))
        .fetch_one(db)
        .await?;
        Ok(list)
    }
}
