use anyhow::Context;
use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::error::ApiError;
use crate::generator::{GeneratedCategory, GeneratedMeal};
use crate::plans::dto::{PlanStatus, Preferences};
use crate::plans::repo::{Meal, MealPlan, NewMeal};
use crate::shopping::repo::{ShoppingCategory, ShoppingItem, ShoppingList};
use crate::state::AppState;

/// Single-tenant placeholder until real accounts land. Always passed
/// explicitly, never read inside the queries.
pub const DEMO_USER: &str = "demo-user";

pub struct CreatedPlan {
    pub meal_plan_id: i64,
    pub status: PlanStatus,
    pub message: Option<String>,
}

/// The full creation pipeline: validate, persist the plan row, call the
/// generator once, persist the derived rows. The plan row survives a failed
/// generation on purpose so the caller always gets an id back.
pub async fn create_plan_with_generation(
    st: &AppState,
    user_id: &str,
    preferences: Preferences,
) -> Result<CreatedPlan, ApiError> {
    preferences.validate()?;

    let start_date = OffsetDateTime::now_utc();
    let end_date = start_date + Duration::days(preferences.days);

    let plan = MealPlan::create(&st.db, user_id, start_date, end_date, &preferences).await?;

    match st.generator.generate(&preferences).await {
        Ok(generated) => {
            let meals = meals_from_generated(plan.id, plan.start_date, &generated.meals);
            let categories = categories_from_generated(&generated.shopping_list);

            let mut tx = st.db.begin().await.context("begin tx")?;
            Meal::insert_batch(&mut tx, &meals).await?;
            ShoppingList::create_tx(&mut tx, plan.id, &categories).await?;
            MealPlan::set_status_tx(&mut tx, plan.id, PlanStatus::Complete.as_str()).await?;
            tx.commit().await.context("commit tx")?;

            Ok(CreatedPlan {
                meal_plan_id: plan.id,
                status: PlanStatus::Complete,
                message: None,
            })
        }
        Err(e) => {
            warn!(error = %e, plan_id = plan.id, "meal generation failed");
            MealPlan::set_status(&st.db, plan.id, PlanStatus::Failed.as_str()).await?;
            Ok(CreatedPlan {
                meal_plan_id: plan.id,
                status: PlanStatus::Failed,
                message: Some("Kunne ikke generere madplan lige nu.".into()),
            })
        }
    }
}

/// Day index 1 maps to the plan's start date.
pub fn meals_from_generated(
    meal_plan_id: i64,
    start_date: OffsetDateTime,
    meals: &[GeneratedMeal],
) -> Vec<NewMeal> {
    meals
        .iter()
        .map(|m| NewMeal {
            meal_plan_id,
            date: start_date + Duration::days(m.day - 1),
            meal_type: m.meal_type.clone(),
            name: m.name.clone(),
            description: m.description.clone(),
            ingredients: m.ingredients.clone(),
            instructions: m.instructions.clone(),
            estimated_time: m.estimated_time,
        })
        .collect()
}

pub fn categories_from_generated(categories: &[GeneratedCategory]) -> Vec<ShoppingCategory> {
    categories
        .iter()
        .map(|c| ShoppingCategory {
            category: c.category.clone(),
            items: c
                .items
                .iter()
                .map(|i| ShoppingItem {
                    name: i.name.clone(),
                    amount: i.amount.clone(),
                    checked: false,
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod services_tests {
    use super::*;
    use crate::generator::GeneratedItem;
    use time::macros::datetime;

    #[test]
    fn test_meals_from_generated_offsets_dates() {
        let start = datetime!(2026-08-24 08:00 UTC);
        let generated = vec![
            GeneratedMeal {
                day: 1,
                meal_type: "breakfast".into(),
                name: "Havregrød".into(),
                description: None,
                ingredients: vec!["havregryn".into()],
                instructions: None,
                estimated_time: Some(10),
            },
            GeneratedMeal {
                day: 3,
                meal_type: "dinner".into(),
                name: "Dahl".into(),
                description: Some("Rød linsedahl".into()),
                ingredients: vec!["linser".into(), "kokosmælk".into()],
                instructions: Some("Kog linserne.".into()),
                estimated_time: None,
            },
        ];

        let meals = meals_from_generated(42, start, &generated);
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0].meal_plan_id, 42);
        assert_eq!(meals[0].date, start);
        assert_eq!(meals[1].date, start + Duration::days(2));
        assert_eq!(meals[1].ingredients.len(), 2);
    }

    #[test]
    fn test_categories_start_unchecked() {
        let generated = vec![GeneratedCategory {
            category: "Mejeri".into(),
            items: vec![
                GeneratedItem {
                    name: "Mælk".into(),
                    amount: "1 L".into(),
                },
                GeneratedItem {
                    name: "Smør".into(),
                    amount: "250g".into(),
                },
            ],
        }];

        let categories = categories_from_generated(&generated);
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].items.len(), 2);
        assert!(categories[0].items.iter().all(|i| !i.checked));
    }
}
