use axum::{
    extract::{Path, State},
    routing::patch,
    Json, Router,
};
use tracing::instrument;

use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::shopping::dto::UpdateItemRequest;
use crate::shopping::repo::ShoppingList;
use crate::shopping::services::set_item_checked;
use crate::state::AppState;

pub fn shopping_routes() -> Router<AppState> {
    Router::new().route("/shopping-lists/:id/items", patch(update_item))
}

#[instrument(skip(state))]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateItemRequest>,
) -> Result<Json<ShoppingList>, ApiError> {
    let list = ShoppingList::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Shopping list not found"))?;

    let (category_index, item_index) = match (
        usize::try_from(body.category_index),
        usize::try_from(body.item_index),
    ) {
        (Ok(c), Ok(i)) => (c, i),
        _ => return Err(ApiError::bad_request("Invalid item index")),
    };

    let mut items = list.items.0;
    if !set_item_checked(&mut items, category_index, item_index, body.checked) {
        return Err(ApiError::bad_request("Invalid item index"));
    }

    let updated = ShoppingList::update_items(&state.db, id, &items).await?;
    Ok(Json(updated))
}
