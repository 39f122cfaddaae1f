use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use spin_shared::validation::{validate_lead, LeadRequest};
use tracing::{info, warn};

use crate::error::Error;
use crate::services::lead_service::LeadSubmission;
use crate::AppState;

pub async fn health_check() -> &'static str {
    "OK"
}

/// Validates the contact form and forwards it to the sheet in the
/// background. Delivery failures never reach the caller.
#[axum::debug_handler]
pub async fn submit_lead(
    State(state): State<AppState>,
    Json(request): Json<LeadRequest>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let lead = validate_lead(&request, state.config.phone_format)?;
    let submission = LeadSubmission::from_lead(lead);

    match &state.lead_sink {
        Some(sink) => {
            info!(email = %submission.email, "lead captured");
            sink.dispatch(submission);
        }
        None => warn!(email = %submission.email, "no LEAD_SINK_URL configured, dropping lead"),
    }

    Ok((StatusCode::ACCEPTED, Json(json!({ "success": true }))))
}
