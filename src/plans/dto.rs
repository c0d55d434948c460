use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::plans::repo::{Meal, MealPlan};
use crate::shopping::repo::ShoppingList;

/// Dietary preferences as submitted by the client. Stored verbatim on the
/// plan as an immutable snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub is_vegan: bool,
    pub is_vegetarian: bool,
    pub is_gluten_free: bool,
    pub allergies: Vec<String>,
    pub servings: i64,
    #[serde(default = "default_days")]
    pub days: i64,
    #[serde(default = "default_true")]
    pub include_breakfast: bool,
    #[serde(default = "default_true")]
    pub include_lunch: bool,
}

fn default_days() -> i64 {
    7
}

fn default_true() -> bool {
    true
}

impl Preferences {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(1..=20).contains(&self.servings) {
            return Err(ApiError::validation(
                "preferences.servings",
                "servings must be between 1 and 20",
            ));
        }
        if !(1..=14).contains(&self.days) {
            return Err(ApiError::validation(
                "preferences.days",
                "days must be between 1 and 14",
            ));
        }
        Ok(())
    }

    /// Dinner is always generated; breakfast and lunch follow the toggles.
    pub fn meals_per_day(&self) -> i64 {
        1 + i64::from(self.include_breakfast) + i64::from(self.include_lunch)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Processing,
    Complete,
    Failed,
}

impl PlanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePlanResponse {
    pub meal_plan_id: i64,
    pub status: PlanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanResponse {
    pub plan: MealPlan,
    pub meals: Vec<Meal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopping_list: Option<ShoppingList>,
}
