use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub category_index: i64,
    pub item_index: i64,
    pub checked: bool,
}
