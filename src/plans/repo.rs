use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;

use crate::plans::dto::Preferences;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub id: i64,
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub dietary_preferences: Json<Preferences>,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: i64,
    pub meal_plan_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub meal_type: String,
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Json<Vec<String>>,
    pub instructions: Option<String>,
    pub estimated_time: Option<i32>,
}

/// Meal row ready for insertion, with the absolute date already computed.
#[derive(Debug, Clone)]
pub struct NewMeal {
    pub meal_plan_id: i64,
    pub date: OffsetDateTime,
    pub meal_type: String,
    pub name: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Option<String>,
    pub estimated_time: Option<i32>,
}

impl MealPlan {
    pub async fn create(
        db: &PgPool,
        user_id: &str,
        start_date: OffsetDateTime,
        end_date: OffsetDateTime,
        preferences: &Preferences,
    ) -> anyhow::Result<MealPlan> {
        let plan = sqlx::query_as::<_, MealPlan>(
            r#"
            INSERT INTO meal_plans (user_id, start_date, end_date, dietary_preferences, status)
            VALUES ($1, $2, $3, $4, 'processing')
            RETURNING id, user_id, start_date, end_date, dietary_preferences, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .bind(Json(preferences))
        .fetch_one(db)
        .await?;
        Ok(plan)
    }

    pub async fn get(db: &PgPool, id: i64) -> anyhow::Result<Option<MealPlan>> {
        let plan = sqlx::query_as::<_, MealPlan>(
            r#"
            SELECT id, user_id, start_date, end_date, dietary_preferences, status, created_at
            FROM meal_plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(plan)
    }

    pub async fn list_by_user(db: &PgPool, user_id: &str) -> anyhow::Result<Vec<MealPlan>> {
        let rows = sqlx::query_as::<_, MealPlan>(
            r#"
            SELECT id, user_id, start_date, end_date, dietary_preferences, status, created_at
            FROM meal_plans
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn set_status(db: &PgPool, id: i64, status: &str) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE meal_plans SET status = $2 WHERE id = $1"#)
            .bind(id)
            .bind(status)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_status_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        status: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE meal_plans SET status = $2 WHERE id = $1"#)
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

impl Meal {
    pub async fn insert_batch(
        tx: &mut Transaction<'_, Postgres>,
        meals: &[NewMeal],
    ) -> anyhow::Result<()> {
        for m in meals {
            sqlx::query(
                r#"
                INSERT INTO meals (meal_plan_id, date, type, name, description, ingredients, instructions, estimated_time)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(m.meal_plan_id)
            .bind(m.date)
            .bind(&m.meal_type)
            .bind(&m.name)
            .bind(&m.description)
            .bind(Json(&m.ingredients))
            .bind(&m.instructions)
            .bind(m.estimated_time)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Meals for one plan, ordered by date and then by the display
    /// precedence of the meal type.
    pub async fn list_by_plan(db: &PgPool, meal_plan_id: i64) -> anyhow::Result<Vec<Meal>> {
        let mut meals = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, meal_plan_id, date, type, name, description, ingredients, instructions, estimated_time
            FROM meals
            WHERE meal_plan_id = $1
            ORDER BY date ASC
            "#,
        )
        .bind(meal_plan_id)
        .fetch_all(db)
        .await?;
        meals.sort_by_key(|m| (m.date, meal_type_rank(&m.meal_type)));
        Ok(meals)
    }
}

/// breakfast < lunch < snack < dinner; anything unrecognized sorts last.
pub fn meal_type_rank(meal_type: &str) -> u8 {
    match meal_type {
        "breakfast" => 0,
        "lunch" => 1,
        "snack" => 2,
        "dinner" => 3,
        _ => 4,
    }
}
