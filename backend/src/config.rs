use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use spin_shared::error::ConfigError as WheelConfigError;
use spin_shared::shared_wheel_game::PlayLimit;
use spin_shared::validation::PhoneFormat;
use spin_shared::wheel_config::WheelConfig;
use strum::{Display, EnumString};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// How a lead is handed to the spreadsheet endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SinkMode {
    /// POST a JSON body with email, phone and timestamp.
    Json,
    /// GET with email and phone as query parameters.
    Query,
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
    WheelFile { path: PathBuf, reason: String },
    Wheel(WheelConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { key, value } => write!(f, "Invalid value for {}: '{}'", key, value),
            Self::WheelFile { path, reason } => {
                write!(f, "Could not read wheel config {}: {}", path.display(), reason)
            }
            Self::Wheel(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wheel(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WheelConfigError> for ConfigError {
    fn from(err: WheelConfigError) -> Self {
        Self::Wheel(err)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub wheel: WheelConfig,
    pub lead_sink_url: Option<String>,
    pub lead_sink_mode: SinkMode,
    pub phone_format: PhoneFormat,
    pub play_limit: PlayLimit,
    pub allow_reset: bool,
    pub rng_seed: Option<u64>,
    pub redis_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            wheel: WheelConfig::default(),
            lead_sink_url: None,
            lead_sink_mode: SinkMode::Json,
            phone_format: PhoneFormat::International,
            play_limit: PlayLimit::Single,
            allow_reset: false,
            rng_seed: None,
            redis_url: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or empty keys fall back
    /// to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let wheel = match get("WHEEL_CONFIG_PATH") {
            Some(path) => load_wheel_config(PathBuf::from(path))?,
            None => WheelConfig::default(),
        };

        Ok(Self {
            bind_addr: parse_or("BIND_ADDR", get("BIND_ADDR"), DEFAULT_BIND_ADDR.parse().ok())?,
            wheel,
            lead_sink_url: get("LEAD_SINK_URL"),
            lead_sink_mode: parse_or("LEAD_SINK_MODE", get("LEAD_SINK_MODE"), Some(SinkMode::Json))?,
            phone_format: parse_or("PHONE_FORMAT", get("PHONE_FORMAT"), Some(PhoneFormat::International))?,
            play_limit: parse_or("PLAY_LIMIT", get("PLAY_LIMIT"), Some(PlayLimit::Single))?,
            allow_reset: parse_or("ALLOW_RESET", get("ALLOW_RESET"), Some(false))?,
            rng_seed: get("SPIN_RNG_SEED")
                .map(|raw| parse_value("SPIN_RNG_SEED", &raw))
                .transpose()?,
            redis_url: get("REDIS_URL"),
        })
    }
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: Option<T>) -> Result<T, ConfigError> {
    match (raw, default) {
        (Some(raw), _) => parse_value(key, &raw),
        (None, Some(default)) => Ok(default),
        (None, None) => Err(ConfigError::Invalid {
            key,
            value: String::new(),
        }),
    }
}

pub fn load_wheel_config(path: PathBuf) -> Result<WheelConfig, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::WheelFile {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    Ok(WheelConfig::from_json(&raw)?)
}
