use axum::routing::{get, post};
use axum::Router;
use rand::rngs::StdRng;
use rand::SeedableRng;
use spin_shared::constants::PLAYED_FLAG_KEY;
use spin_shared::error::SpinError;
use spin_shared::flag_store::{FlagStore, MemoryFlagStore};
use spin_shared::outcome::OutcomeEngine;
use spin_shared::shared_wheel_game::SpinSession;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub mod config;
pub mod error;
pub mod games;
pub mod handlers;
pub mod logging;
pub mod services;

use crate::config::AppConfig;
use crate::services::flag_store::PlayedFlags;
use crate::services::lead_service::LeadSink;

/// Idle sessions older than this are dropped; the played flag outlives them.
pub const SESSION_TTL: Duration = Duration::from_secs(600);
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A session keeps a local copy of the player's flag. The persisted flag
/// lives in [`PlayedFlags`] and is synced outside the sessions lock.
pub type PlayerSession = SpinSession<MemoryFlagStore>;

pub struct PlayerEntry {
    pub session: PlayerSession,
    last_seen: Instant,
}

impl PlayerEntry {
    pub fn new(session: PlayerSession) -> Self {
        Self {
            session,
            last_seen: Instant::now(),
        }
    }

    pub fn touch(&mut self) -> &mut PlayerSession {
        self.last_seen = Instant::now();
        &mut self.session
    }

    fn is_expired(&self, now: Instant) -> bool {
        !self.session.is_spinning() && now.duration_since(self.last_seen) >= SESSION_TTL
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<OutcomeEngine>,
    pub flags: PlayedFlags,
    pub sessions: Arc<Mutex<HashMap<String, PlayerEntry>>>,
    pub rng: Arc<Mutex<StdRng>>,
    pub lead_sink: Option<Arc<LeadSink>>,
}

impl AppState {
    /// Validates the wheel and wires up stores. Any configuration defect
    /// surfaces here, before the server accepts a spin.
    pub fn from_config(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let engine = OutcomeEngine::new(config.wheel.clone())?;
        info!("Wheel loaded with {} slices", engine.slice_count());

        let flags = match &config.redis_url {
            Some(url) => {
                info!("Persisting played flags in Redis");
                PlayedFlags::redis(url)?
            }
            None => {
                info!("REDIS_URL not set, played flags are kept in memory");
                PlayedFlags::memory()
            }
        };

        let rng = match config.rng_seed {
            Some(seed) => {
                info!("Spin outcomes seeded with {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        let lead_sink = match &config.lead_sink_url {
            Some(url) => Some(Arc::new(LeadSink::new(url.clone(), config.lead_sink_mode)?)),
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            flags,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            rng: Arc::new(Mutex::new(rng)),
            lead_sink,
        })
    }

    /// Builds a session around an already loaded played flag.
    pub fn new_session(&self, has_played: bool) -> Result<PlayerSession, SpinError> {
        let store = MemoryFlagStore::new();
        if has_played {
            store.set(PLAYED_FLAG_KEY, true)?;
        }
        SpinSession::new(self.engine.clone(), store, self.config.play_limit)
    }

    /// Drops sessions that are not spinning and have not been used for
    /// [`SESSION_TTL`]. Returns how many were removed.
    pub async fn evict_idle_sessions(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        let now = Instant::now();
        sessions.retain(|_, entry| !entry.is_expired(now));
        before - sessions.len()
    }

    pub fn spawn_session_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let evicted = state.evict_idle_sessions().await;
                if evicted > 0 {
                    debug!("Evicted {} idle wheel sessions", evicted);
                }
            }
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health_check", get(handlers::health_check))
        .route("/lead", post(handlers::submit_lead))
        .nest("/wheel", games::backend_wheel_game::create_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spinning_sessions_never_expire() {
        let state = AppState::from_config(AppConfig::default()).unwrap();
        let mut entry = PlayerEntry::new(state.new_session(false).unwrap());
        let later = Instant::now() + SESSION_TTL;

        assert!(!entry.is_expired(Instant::now()));
        assert!(entry.is_expired(later));

        entry.session.spin(&mut StdRng::seed_from_u64(1)).unwrap();
        assert!(!entry.is_expired(later));
    }

    #[tokio::test]
    async fn test_new_session_carries_loaded_flag() {
        let state = AppState::from_config(AppConfig::default()).unwrap();
        assert!(state.new_session(true).unwrap().has_played());
        assert!(state.new_session(false).unwrap().can_spin());
    }
}
