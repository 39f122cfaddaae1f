use axum::{
    debug_handler,
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use spin_shared::constants::{LOSE_MESSAGE, SPIN_DURATION_MS, WIN_MESSAGE};
use spin_shared::error::SpinError;
use spin_shared::shared_wheel_game::*;
use std::collections::hash_map::Entry;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::spin_timer::schedule_completion;
use crate::error::Error;
use crate::{AppState, PlayerEntry, PlayerSession};

pub const SPIN_DURATION: Duration = Duration::from_millis(SPIN_DURATION_MS);

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/config", get(get_wheel_config))
        .route("/spin", post(spin_wheel))
        .route("/status", get(get_wheel_status))
        .route("/reset", post(reset_wheel))
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub player_id: String,
}

fn status_response(player_id: &str, session: &PlayerSession) -> WheelStatusResponse {
    WheelStatusResponse {
        player_id: player_id.to_string(),
        has_played: session.has_played(),
        can_spin: session.can_spin(),
        phase: WheelPhaseView::from_session(session),
    }
}

async fn get_wheel_config(State(state): State<AppState>) -> Json<WheelLayoutResponse> {
    Json(WheelLayoutResponse::from_engine(&state.engine, state.config.play_limit))
}

#[debug_handler]
async fn spin_wheel(
    State(state): State<AppState>,
    Json(request): Json<WheelSpinRequest>,
) -> Result<Json<WheelSpinResponse>, Error> {
    // A freshly minted id cannot have played yet
    let (player_id, has_played) = match request.player_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => {
            let has_played = state.flags.is_played(&id).await?;
            (id, has_played)
        }
        None => (Uuid::new_v4().to_string(), false),
    };

    let result = {
        let mut sessions = state.sessions.lock().await;
        let entry = match sessions.entry(player_id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!(player_id = %player_id, "creating wheel session");
                entry.insert(PlayerEntry::new(state.new_session(has_played)?))
            }
        };
        let mut rng = state.rng.lock().await;
        entry.touch().spin(&mut *rng)?
    };

    info!(
        player_id = %player_id,
        slice = result.target_slice_index,
        "spin started ({:.1}°)",
        result.rotation_degrees
    );

    let completion = schedule_completion(state.clone(), player_id.clone(), SPIN_DURATION);

    let mut response = WheelSpinResponse {
        player_id,
        target_slice_index: result.target_slice_index,
        rotation_degrees: result.rotation_degrees,
        spin_duration_ms: SPIN_DURATION_MS,
        is_winner: None,
        message: None,
    };

    if request.wait {
        let resolved = completion
            .await
            .map_err(|e| Error::Internal(format!("Spin timer failed: {}", e)))??;
        response.is_winner = Some(resolved.is_winner);
        response.message = Some(if resolved.is_winner { WIN_MESSAGE } else { LOSE_MESSAGE }.to_string());
    }

    Ok(Json(response))
}

/// Reports a live session when there is one. Otherwise the answer comes
/// from the persisted flag alone and no session is created.
async fn get_wheel_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<WheelStatusResponse>, Error> {
    let player_id = query.player_id;
    let live = {
        let mut sessions = state.sessions.lock().await;
        sessions
            .get_mut(&player_id)
            .map(|entry| status_response(&player_id, entry.touch()))
    };

    let response = match live {
        Some(response) => response,
        None => {
            let has_played = state.flags.is_played(&player_id).await?;
            status_response(&player_id, &state.new_session(has_played)?)
        }
    };
    Ok(Json(response))
}

async fn reset_wheel(
    State(state): State<AppState>,
    Json(request): Json<WheelResetRequest>,
) -> Result<Json<WheelStatusResponse>, Error> {
    if !state.config.allow_reset {
        return Err(Error::ResetDisabled);
    }

    let player_id = request.player_id;
    {
        let sessions = state.sessions.lock().await;
        if sessions.get(&player_id).is_some_and(|entry| entry.session.is_spinning()) {
            return Err(SpinError::SpinInFlight.into());
        }
    }

    state.flags.clear(&player_id).await?;

    let response = {
        let mut sessions = state.sessions.lock().await;
        match sessions.get_mut(&player_id) {
            Some(entry) => {
                let session = entry.touch();
                session.reset()?;
                status_response(&player_id, session)
            }
            None => status_response(&player_id, &state.new_session(false)?),
        }
    };
    info!(player_id = %player_id, "wheel reset");
    Ok(Json(response))
}
