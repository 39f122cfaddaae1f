use std::fmt;

/// Defects in a wheel configuration. These are detected when the
/// configuration is loaded, never at spin time.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyWheel,
    InvalidRatio(String),
    RatioOutOfRange { wins: u32, total: u32 },
    ZeroPlayers,
    WinnersExceedPlayers { winners: u32, players: u32 },
    NoWinningSlices,
    NoLosingSlices,
    ClassificationMismatch { index: usize, expected: &'static str },
    WinningIndexOutOfRange { index: usize, slice_count: usize },
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyWheel => write!(f, "Wheel must have at least one slice"),
            Self::InvalidRatio(raw) => write!(f, "Invalid win ratio '{}', expected 'wins:total'", raw),
            Self::RatioOutOfRange { wins, total } => {
                write!(f, "Win ratio {}:{} has more wins than total", wins, total)
            }
            Self::ZeroPlayers => write!(f, "total_players must be greater than zero"),
            Self::WinnersExceedPlayers { winners, players } => {
                write!(f, "total_winners ({}) exceeds total_players ({})", winners, players)
            }
            Self::NoWinningSlices => write!(f, "Global probability wheel has no winning slice"),
            Self::NoLosingSlices => write!(f, "Global probability wheel has no losing slice"),
            Self::ClassificationMismatch { index, expected } => {
                write!(f, "Slice {} must be classified with {}", index, expected)
            }
            Self::WinningIndexOutOfRange { index, slice_count } => {
                write!(f, "Winning slice {} is outside a {}-slice wheel", index, slice_count)
            }
            Self::Parse(e) => write!(f, "Could not parse wheel config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagStoreError(pub String);

impl fmt::Display for FlagStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flag store error: {}", self.0)
    }
}

impl std::error::Error for FlagStoreError {}

/// Reasons a spin session refuses a request.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinError {
    AlreadyPlayed,
    SpinInFlight,
    NotSpinning,
    FlagStore(FlagStoreError),
}

impl fmt::Display for SpinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyPlayed => write!(f, "{}", crate::constants::ALREADY_PLAYED_MESSAGE),
            Self::SpinInFlight => write!(f, "A spin is already in progress"),
            Self::NotSpinning => write!(f, "No spin is in progress"),
            Self::FlagStore(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SpinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FlagStore(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FlagStoreError> for SpinError {
    fn from(err: FlagStoreError) -> Self {
        Self::FlagStore(err)
    }
}
