use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use spin_shared::error::{FlagStoreError, SpinError};
use validator::ValidationErrors;

#[derive(Debug)]
pub enum Error {
    Spin(SpinError),
    Validation(ValidationErrors),
    ResetDisabled,
    Internal(String),
}

impl From<SpinError> for Error {
    fn from(err: SpinError) -> Self {
        match err {
            SpinError::FlagStore(e) => Error::from(e),
            other => Error::Spin(other),
        }
    }
}

impl From<FlagStoreError> for Error {
    fn from(err: FlagStoreError) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<ValidationErrors> for Error {
    fn from(err: ValidationErrors) -> Self {
        Error::Validation(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Spin(e) => (StatusCode::CONFLICT, Json(json!({ "error": e.to_string() }))).into_response(),
            Error::Validation(errors) => {
                let fields: serde_json::Map<String, serde_json::Value> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errs)| {
                        let messages: Vec<String> = errs
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            })
                            .collect();
                        (field.to_string(), json!(messages))
                    })
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "error": "Validation failed", "fields": fields })),
                )
                    .into_response()
            }
            Error::ResetDisabled => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": "Reset is disabled" }))).into_response()
            }
            Error::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Error processing request" })),
                )
                    .into_response()
            }
        }
    }
}
