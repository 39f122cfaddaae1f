use redis::{AsyncCommands, Client as RedisClient};
use spin_shared::error::FlagStoreError;
use spin_shared::flag_store::{player_flag_key, FlagStore, MemoryFlagStore};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on one Redis round trip, connect included.
pub const REDIS_TIMEOUT: Duration = Duration::from_secs(2);

/// Per-player played flags as the server persists them.
///
/// Handlers await these before taking the sessions lock and after releasing
/// it, so a slow store never holds up other players.
#[derive(Clone)]
pub enum PlayedFlags {
    Memory(Arc<MemoryFlagStore>),
    Redis(RedisClient),
}

fn redis_error(err: redis::RedisError) -> FlagStoreError {
    FlagStoreError(format!("Redis error: {}", err))
}

/// Any stored value other than "false" counts as set.
pub fn parse_flag(raw: &str) -> bool {
    raw != "false"
}

impl PlayedFlags {
    pub fn memory() -> Self {
        PlayedFlags::Memory(Arc::new(MemoryFlagStore::new()))
    }

    pub fn redis(url: &str) -> Result<Self, FlagStoreError> {
        let client = RedisClient::open(url).map_err(redis_error)?;
        Ok(PlayedFlags::Redis(client))
    }

    async fn connection(client: &RedisClient) -> Result<redis::aio::Connection, FlagStoreError> {
        tokio::time::timeout(REDIS_TIMEOUT, client.get_async_connection())
            .await
            .map_err(|_| FlagStoreError("Redis connection timed out".to_string()))?
            .map_err(redis_error)
    }

    pub async fn is_played(&self, player_id: &str) -> Result<bool, FlagStoreError> {
        let key = player_flag_key(player_id);
        match self {
            PlayedFlags::Memory(store) => Ok(store.get(&key)?.unwrap_or(false)),
            PlayedFlags::Redis(client) => {
                let mut conn = Self::connection(client).await?;
                let raw: Option<String> = conn.get(&key).await.map_err(redis_error)?;
                Ok(raw.as_deref().map(parse_flag).unwrap_or(false))
            }
        }
    }

    pub async fn mark_played(&self, player_id: &str) -> Result<(), FlagStoreError> {
        let key = player_flag_key(player_id);
        match self {
            PlayedFlags::Memory(store) => store.set(&key, true),
            PlayedFlags::Redis(client) => {
                let mut conn = Self::connection(client).await?;
                conn.set::<_, _, ()>(&key, "true").await.map_err(redis_error)
            }
        }
    }

    pub async fn clear(&self, player_id: &str) -> Result<(), FlagStoreError> {
        let key = player_flag_key(player_id);
        match self {
            PlayedFlags::Memory(store) => store.remove(&key),
            PlayedFlags::Redis(client) => {
                let mut conn = Self::connection(client).await?;
                conn.del::<_, ()>(&key).await.map_err(redis_error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
    }

    #[test]
    fn test_open_rejects_bad_url() {
        assert!(PlayedFlags::redis("not a url").is_err());
    }

    #[tokio::test]
    async fn test_memory_flags_are_per_player() {
        let flags = PlayedFlags::memory();
        assert_eq!(flags.is_played("alice").await, Ok(false));

        flags.mark_played("alice").await.unwrap();
        assert_eq!(flags.is_played("alice").await, Ok(true));
        assert_eq!(flags.is_played("bob").await, Ok(false));

        flags.clear("alice").await.unwrap();
        assert_eq!(flags.is_played("alice").await, Ok(false));
    }

    #[tokio::test]
    async fn test_unreachable_redis_fails_without_hanging() {
        let flags = PlayedFlags::redis("redis://127.0.0.1:9/").unwrap();
        assert!(flags.is_played("alice").await.is_err());
        assert!(flags.mark_played("alice").await.is_err());
    }
}
