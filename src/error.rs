use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// API-level error. Maps onto the JSON error bodies the HTTP contract
/// promises: `{message, field?}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest {
        message: String,
        field: Option<String>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            field: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest { message, field } => {
                (StatusCode::BAD_REQUEST, ErrorBody { message, field })
            }
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    message,
                    field: None,
                },
            ),
            Self::Internal(e) => {
                // The cause goes to the log, never to the client.
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: "Internal server error".into(),
                        field: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let res = ApiError::validation("preferences.days", "days must be between 1 and 14")
            .into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = ApiError::not_found("Meal plan not found").into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = ApiError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            message: "Invalid item index".into(),
            field: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"message":"Invalid item index"}"#);

        let body = ErrorBody {
            message: "servings must be between 1 and 20".into(),
            field: Some("preferences.servings".into()),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""field":"preferences.servings""#));
    }
}
