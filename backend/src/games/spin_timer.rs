use spin_shared::error::SpinError;
use spin_shared::outcome::SpinResult;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::AppState;

/// Resolves a player's in-flight spin once the animation delay has passed.
///
/// The returned handle can be awaited by a caller that wants the final
/// result. Dropping it does not cancel the completion: a spin that started
/// always resolves.
pub fn schedule_completion(
    state: AppState,
    player_id: String,
    delay: Duration,
) -> JoinHandle<Result<SpinResult, SpinError>> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let result = {
            let mut sessions = state.sessions.lock().await;
            let Some(entry) = sessions.get_mut(&player_id) else {
                warn!(player_id = %player_id, "spin timer fired for unknown player");
                return Err(SpinError::NotSpinning);
            };
            entry.touch().complete()?
        };

        // The persisted flag is written outside the lock. A failed write is
        // logged and the result still stands.
        if let Err(e) = state.flags.mark_played(&player_id).await {
            warn!(player_id = %player_id, "could not persist played flag: {}", e);
        }

        if result.is_winner {
            info!(player_id = %player_id, slice = result.target_slice_index, "landed on a prize 🎁");
        } else {
            info!(player_id = %player_id, slice = result.target_slice_index, "landed on no prize ⭐");
        }
        Ok(result)
    })
}
