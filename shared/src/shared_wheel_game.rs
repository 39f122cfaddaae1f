use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};

use crate::constants::{PLAYED_FLAG_KEY, SPIN_DURATION_MS};
use crate::error::SpinError;
use crate::flag_store::FlagStore;
use crate::outcome::{OutcomeEngine, SpinResult};
use crate::wheel_config::SliceStyle;
use crate::wheel_geometry::SliceArc;

/// Whether a player gets one spin or may spin again after each result.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PlayLimit {
    Single,
    Unlimited,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SpinPhase {
    Idle,
    Spinning { result: SpinResult },
    Resolved { result: SpinResult },
}

/// One player's spin state: `Idle -> Spinning -> Resolved`.
///
/// The played flag is read once when the session is created and written
/// once per completed spin.
pub struct SpinSession<S: FlagStore> {
    engine: Arc<OutcomeEngine>,
    store: S,
    limit: PlayLimit,
    phase: SpinPhase,
    has_played: bool,
    last_result: Option<SpinResult>,
}

impl<S: FlagStore> SpinSession<S> {
    pub fn new(engine: Arc<OutcomeEngine>, store: S, limit: PlayLimit) -> Result<Self, SpinError> {
        let has_played = store.get(PLAYED_FLAG_KEY)?.unwrap_or(false);
        Ok(Self {
            engine,
            store,
            limit,
            phase: SpinPhase::Idle,
            has_played,
            last_result: None,
        })
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn has_played(&self) -> bool {
        self.has_played
    }

    pub fn last_result(&self) -> Option<SpinResult> {
        self.last_result
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, SpinPhase::Spinning { .. })
    }

    pub fn can_spin(&self) -> bool {
        self.check_can_spin().is_ok()
    }

    fn check_can_spin(&self) -> Result<(), SpinError> {
        match self.phase {
            SpinPhase::Spinning { .. } => Err(SpinError::SpinInFlight),
            _ if self.limit == PlayLimit::Single && self.has_played => Err(SpinError::AlreadyPlayed),
            SpinPhase::Resolved { .. } if self.limit == PlayLimit::Single => Err(SpinError::AlreadyPlayed),
            _ => Ok(()),
        }
    }

    /// Decides the outcome and enters `Spinning`. The result is returned
    /// right away so the wheel can be animated towards it.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<SpinResult, SpinError> {
        self.check_can_spin()?;
        let result = self.engine.decide_outcome(rng);
        self.phase = SpinPhase::Spinning { result };
        self.last_result = None;
        Ok(result)
    }

    /// Ends the in-flight spin, records the played flag and surfaces the
    /// result.
    pub fn complete(&mut self) -> Result<SpinResult, SpinError> {
        let result = match self.phase {
            SpinPhase::Spinning { result } => result,
            _ => return Err(SpinError::NotSpinning),
        };

        if let Err(e) = self.store.set(PLAYED_FLAG_KEY, true) {
            log::warn!("Could not persist played flag: {}", e);
        }
        self.has_played = true;
        self.last_result = Some(result);
        self.phase = match self.limit {
            PlayLimit::Single => SpinPhase::Resolved { result },
            PlayLimit::Unlimited => SpinPhase::Idle,
        };
        Ok(result)
    }

    /// Clears the played flag so the player may spin again.
    pub fn reset(&mut self) -> Result<(), SpinError> {
        if let SpinPhase::Spinning { .. } = self.phase {
            return Err(SpinError::SpinInFlight);
        }
        self.store.remove(PLAYED_FLAG_KEY)?;
        self.has_played = false;
        self.last_result = None;
        self.phase = SpinPhase::Idle;
        Ok(())
    }
}

// === API Types ===

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct WheelSpinRequest {
    pub player_id: Option<String>,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WheelSpinResponse {
    pub player_id: String,
    pub target_slice_index: usize,
    pub rotation_degrees: f64,
    pub spin_duration_ms: u64,
    // Only revealed once the spin has resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_winner: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WheelStatusResponse {
    pub player_id: String,
    pub has_played: bool,
    pub can_spin: bool,
    #[serde(flatten)]
    pub phase: WheelPhaseView,
}

/// Phase as shown to clients: the outcome of an in-flight spin stays hidden.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum WheelPhaseView {
    Idle { last_result: Option<SpinResult> },
    Spinning,
    Resolved { result: SpinResult },
}

impl WheelPhaseView {
    pub fn from_session<S: FlagStore>(session: &SpinSession<S>) -> Self {
        match session.phase() {
            SpinPhase::Idle => Self::Idle {
                last_result: session.last_result(),
            },
            SpinPhase::Spinning { .. } => Self::Spinning,
            SpinPhase::Resolved { result } => Self::Resolved { result },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WheelResetRequest {
    pub player_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SliceView {
    pub index: usize,
    pub label: String,
    pub style: SliceStyle,
    pub arc: SliceArc,
    pub clip_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WheelLayoutResponse {
    pub slices: Vec<SliceView>,
    pub spin_duration_ms: u64,
    pub play_limit: PlayLimit,
}

impl WheelLayoutResponse {
    pub fn from_engine(engine: &OutcomeEngine, play_limit: PlayLimit) -> Self {
        let count = engine.slice_count();
        let slices = engine
            .config()
            .slices
            .iter()
            .enumerate()
            .map(|(index, slice)| SliceView {
                index,
                label: slice.label.clone(),
                style: slice.style.clone(),
                arc: crate::wheel_geometry::slice_arc(index, count),
                clip_path: crate::wheel_geometry::clip_path(index, count),
            })
            .collect();

        Self {
            slices,
            spin_duration_ms: SPIN_DURATION_MS,
            play_limit,
        }
    }
}
