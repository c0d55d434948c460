use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::plans::dto::{CreatePlanRequest, GeneratePlanResponse, MealPlanResponse};
use crate::plans::repo::{Meal, MealPlan};
use crate::plans::services::{create_plan_with_generation, DEMO_USER};
use crate::shopping::repo::ShoppingList;
use crate::state::AppState;

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans", post(create_plan).get(list_plans))
        .route("/meal-plans/:id", get(get_plan))
}

#[instrument(skip(state, body))]
pub async fn create_plan(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreatePlanRequest>,
) -> Result<(StatusCode, Json<GeneratePlanResponse>), ApiError> {
    let created = create_plan_with_generation(&state, DEMO_USER, body.preferences).await?;

    info!(
        plan_id = created.meal_plan_id,
        status = created.status.as_str(),
        "meal plan created"
    );
    Ok((
        StatusCode::CREATED,
        Json(GeneratePlanResponse {
            meal_plan_id: created.meal_plan_id,
            status: created.status,
            message: created.message,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MealPlanResponse>, ApiError> {
    let plan = MealPlan::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal plan not found"))?;

    let meals = Meal::list_by_plan(&state.db, plan.id).await?;
    let shopping_list = ShoppingList::get_by_plan(&state.db, plan.id).await?;

    Ok(Json(MealPlanResponse {
        plan,
        meals,
        shopping_list,
    }))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<MealPlan>>, ApiError> {
    let plans = MealPlan::list_by_user(&state.db, DEMO_USER).await?;
    Ok(Json(plans))
}
