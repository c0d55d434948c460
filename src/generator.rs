use anyhow::Context;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use axum::async_trait;
use serde::Deserialize;

use crate::plans::dto::Preferences;

/// One meal entry as produced by the model, day-relative (1..=days).
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedMeal {
    pub day: i64,
    #[serde(rename = "type")]
    pub meal_type: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default, rename = "estimatedTime")]
    pub estimated_time: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedItem {
    pub name: String,
    pub amount: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedCategory {
    pub category: String,
    pub items: Vec<GeneratedItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedPlan {
    pub meals: Vec<GeneratedMeal>,
    #[serde(rename = "shoppingList")]
    pub shopping_list: Vec<GeneratedCategory>,
}

#[async_trait]
pub trait MealGenerator: Send + Sync {
    /// One shot, no retry. Any transport or parse problem is a plain error;
    /// the caller decides what a failed generation means for the plan.
    async fn generate(&self, prefs: &Preferences) -> anyhow::Result<GeneratedPlan>;
}

const SYSTEM_MESSAGE: &str = "Du er en hjælpsom assistent der genererer madplaner som JSON.";

pub fn build_prompt(prefs: &Preferences) -> String {
    let yes_no = |b: bool| if b { "Ja" } else { "Nej" };
    let allergies = if prefs.allergies.is_empty() {
        "Ingen".to_string()
    } else {
        prefs.allergies.join(", ")
    };

    // Dinner is always on the plan; breakfast and lunch follow the toggles.
    let mut kinds = Vec::new();
    let mut types = Vec::new();
    if prefs.include_breakfast {
        kinds.push("morgenmad");
        types.push(r#""breakfast""#);
    }
    if prefs.include_lunch {
        kinds.push("frokost");
        types.push(r#""lunch""#);
    }
    kinds.push("aftensmad");
    types.push(r#""dinner""#);

    format!(
        r#"Du er en erfaren dansk kok og ernæringsekspert. Lav en madplan for {days} dage til en person med følgende præferencer:
- Vegansk: {vegan}
- Vegetarisk: {vegetarian}
- Glutenfri: {gluten_free}
- Allergier: {allergies}
- Antal portioner: {servings}

Formatér svaret som JSON med følgende struktur:
{{
  "meals": [
    {{
      "day": 1, // dagnummer 1 til {days}
      "type": {types},
      "name": "Navn på retten",
      "description": "Kort beskrivelse",
      "ingredients": ["ingrediens 1", "ingrediens 2"],
      "instructions": "Korte instruktioner",
      "estimatedTime": 30 // minutter
    }}
  ],
  "shoppingList": [
    {{
      "category": "Frugt og Grønt" | "Mejeri" | "Kød" | "Kolonial" | "Andet",
      "items": [
        {{ "name": "Varenavn", "amount": "Mængde (f.eks. 500g)" }}
      ]
    }}
  ]
}}

Vigtigt:
1. Svar KUN med JSON.
2. Alle tekster SKAL være på dansk.
3. Lav {count} måltider per dag ({kinds})."#,
        days = prefs.days,
        vegan = yes_no(prefs.is_vegan),
        vegetarian = yes_no(prefs.is_vegetarian),
        gluten_free = yes_no(prefs.is_gluten_free),
        allergies = allergies,
        servings = prefs.servings,
        types = types.join(" | "),
        count = prefs.meals_per_day(),
        kinds = kinds.join(", "),
    )
}

/// Parses the model output into a [`GeneratedPlan`]. The payload sometimes
/// arrives wrapped in a markdown code fence; that wrapper is tolerated,
/// anything else malformed is an error.
pub fn parse_generated(raw: &str, days: i64) -> anyhow::Result<GeneratedPlan> {
    let json = strip_code_fence(raw);
    let plan: GeneratedPlan =
        serde_json::from_str(json).context("generation output is not the expected JSON shape")?;

    for meal in &plan.meals {
        anyhow::ensure!(
            (1..=days).contains(&meal.day),
            "meal day {} outside 1..={}",
            meal.day,
            days
        );
    }
    Ok(plan)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Adapter calling an OpenAI-compatible chat completion endpoint.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: &str, base_url: Option<&str>, model: String) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url {
            config = config.with_api_base(url);
        }
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl MealGenerator for OpenAiGenerator {
    async fn generate(&self, prefs: &Preferences) -> anyhow::Result<GeneratedPlan> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_MESSAGE)
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(build_prompt(prefs))
                    .build()?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(ResponseFormat::JsonObject)
            .build()?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .context("chat completion request failed")?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .context("no content in chat completion")?;

        parse_generated(&content, prefs.days)
    }
}

#[cfg(test)]
mod generator_tests {
    use super::*;

    fn prefs() -> Preferences {
        Preferences {
            is_vegan: false,
            is_vegetarian: true,
            is_gluten_free: false,
            allergies: vec!["nødder".into(), "skaldyr".into()],
            servings: 2,
            days: 3,
            include_breakfast: true,
            include_lunch: true,
        }
    }

    #[test]
    fn test_prompt_reflects_preferences() {
        let p = build_prompt(&prefs());
        assert!(p.contains("madplan for 3 dage"));
        assert!(p.contains("Vegansk: Nej"));
        assert!(p.contains("Vegetarisk: Ja"));
        assert!(p.contains("Glutenfri: Nej"));
        assert!(p.contains("Allergier: nødder, skaldyr"));
        assert!(p.contains("Antal portioner: 2"));
        assert!(p.contains("Lav 3 måltider per dag (morgenmad, frokost, aftensmad)"));
    }

    #[test]
    fn test_prompt_no_allergies() {
        let mut p = prefs();
        p.allergies.clear();
        assert!(build_prompt(&p).contains("Allergier: Ingen"));
    }

    #[test]
    fn test_prompt_honors_meal_toggles() {
        let mut p = prefs();
        p.include_breakfast = false;
        let prompt = build_prompt(&p);
        assert!(prompt.contains("Lav 2 måltider per dag (frokost, aftensmad)"));
        assert!(!prompt.contains(r#""breakfast""#));

        p.include_lunch = false;
        let prompt = build_prompt(&p);
        assert!(prompt.contains("Lav 1 måltider per dag (aftensmad)"));
    }

    const SAMPLE: &str = r#"{
        "meals": [
            {
                "day": 1,
                "type": "breakfast",
                "name": "Havregrød med bær",
                "description": "Cremet havregrød",
                "ingredients": ["havregryn", "mælk", "blåbær"],
                "instructions": "Kog havregrynene i mælken.",
                "estimatedTime": 10
            },
            {
                "day": 2,
                "type": "dinner",
                "name": "Grøntsagslasagne",
                "ingredients": ["lasagneplader", "squash", "tomat"]
            }
        ],
        "shoppingList": [
            {
                "category": "Frugt og Grønt",
                "items": [
                    { "name": "Blåbær", "amount": "250g" },
                    { "name": "Squash", "amount": "1 stk" }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let plan = parse_generated(SAMPLE, 3).unwrap();
        assert_eq!(plan.meals.len(), 2);
        assert_eq!(plan.meals[0].meal_type, "breakfast");
        assert_eq!(plan.meals[0].estimated_time, Some(10));
        assert_eq!(plan.meals[1].description, None);
        assert_eq!(plan.shopping_list.len(), 1);
        assert_eq!(plan.shopping_list[0].items[1].amount, "1 stk");
    }

    #[test]
    fn test_parse_tolerates_code_fence() {
        let fenced = format!("```json\n{}\n```", SAMPLE);
        let plan = parse_generated(&fenced, 3).unwrap();
        assert_eq!(plan.meals.len(), 2);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_generated("not json at all", 3).is_err());
        assert!(parse_generated(r#"{"meals": []}"#, 3).is_err()); // missing shoppingList
        assert!(parse_generated(r#"{"meals": [{"day": 1}], "shoppingList": []}"#, 3).is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_day() {
        let err = parse_generated(SAMPLE, 1).unwrap_err();
        assert!(err.to_string().contains("outside 1..=1"));
    }
}
