use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::*;
use crate::error::ConfigError;

/// Global odds for the fixed-winning-set policy.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub total_players: u32,
    pub total_winners: u32,
}

impl GameConfig {
    pub fn win_probability(&self) -> f64 {
        self.total_winners as f64 / self.total_players as f64
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_players: DEFAULT_TOTAL_PLAYERS,
            total_winners: DEFAULT_TOTAL_WINNERS,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Policy A: one global win roll, then a uniform pick inside the
    /// winning or losing set.
    GlobalProbability(GameConfig),
    /// Policy B: every slice carries its own `wins:total` ratio.
    WeightedRatio,
}

/// How a slice is classified. Flags go with `GlobalProbability`, ratio
/// strings with `WeightedRatio`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum WinClassification {
    Flag(bool),
    Ratio(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SliceStyle {
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SliceConfig {
    pub label: String,
    #[serde(default)]
    pub style: SliceStyle,
    pub win: WinClassification,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WheelConfig {
    pub policy: SelectionPolicy,
    pub slices: Vec<SliceConfig>,
}

/// The compact form: a slice count plus the indices that win.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WinningIndexConfig {
    pub total_players: u32,
    pub total_winners: u32,
    pub wheel_slices: usize,
    pub winning_slices: Vec<usize>,
}

impl Default for WinningIndexConfig {
    fn default() -> Self {
        Self {
            total_players: DEFAULT_TOTAL_PLAYERS,
            total_winners: DEFAULT_TOTAL_WINNERS,
            wheel_slices: DEFAULT_WHEEL_SLICES,
            winning_slices: DEFAULT_WINNING_SLICES.to_vec(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WheelConfigFile {
    Slices(WheelConfig),
    WinningIndices(WinningIndexConfig),
}

/// A parsed `wins:total` ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinRatio {
    pub wins: u32,
    pub total: u32,
}

impl WinRatio {
    pub fn probability(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.wins as f64 / self.total as f64
    }

    /// Selection weight on the 1..=1000 scale. Never zero, so every slice
    /// stays reachable as a landing target.
    pub fn weight(&self) -> u32 {
        let scaled = (self.probability() * RATIO_WEIGHT_SCALE).round() as u32;
        scaled.max(1)
    }

    pub fn is_winning(&self) -> bool {
        self.wins > 0
    }
}

impl FromStr for WinRatio {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRatio(raw.to_string());
        let (wins, total) = raw.split_once(':').ok_or_else(invalid)?;
        let wins: u32 = wins.trim().parse().map_err(|_| invalid())?;
        let total: u32 = total.trim().parse().map_err(|_| invalid())?;

        if wins > total {
            return Err(ConfigError::RatioOutOfRange { wins, total });
        }
        Ok(Self { wins, total })
    }
}

impl WheelConfig {
    /// Parses either the slice form or the winning-index form.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str::<WheelConfigFile>(raw)? {
            WheelConfigFile::Slices(config) => Ok(config),
            WheelConfigFile::WinningIndices(compact) => compact.into_wheel_config(),
        }
    }

    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }
}

impl Default for WheelConfig {
    fn default() -> Self {
        WinningIndexConfig::default()
            .into_wheel_config()
            .unwrap_or_else(|_| unreachable!("default wheel config is valid"))
    }
}

impl WinningIndexConfig {
    pub fn into_wheel_config(self) -> Result<WheelConfig, ConfigError> {
        if let Some(&index) = self.winning_slices.iter().find(|&&i| i >= self.wheel_slices) {
            return Err(ConfigError::WinningIndexOutOfRange {
                index,
                slice_count: self.wheel_slices,
            });
        }

        let mut losing_ordinal = 0;
        let slices = (0..self.wheel_slices)
            .map(|i| {
                let is_winning = self.winning_slices.contains(&i);
                let (label, color, icon) = if is_winning {
                    ("Gift", WINNING_SLICE_COLOR, WINNING_SLICE_ICON)
                } else {
                    let color = LOSING_SLICE_COLORS[losing_ordinal % LOSING_SLICE_COLORS.len()];
                    losing_ordinal += 1;
                    ("Star", color, LOSING_SLICE_ICON)
                };
                SliceConfig {
                    label: label.to_string(),
                    style: SliceStyle {
                        color: color.to_string(),
                        image: None,
                        icon: Some(icon.to_string()),
                    },
                    win: WinClassification::Flag(is_winning),
                }
            })
            .collect();

        Ok(WheelConfig {
            policy: SelectionPolicy::GlobalProbability(GameConfig {
                total_players: self.total_players,
                total_winners: self.total_winners,
            }),
            slices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ratio() {
        assert_eq!("1:100".parse::<WinRatio>(), Ok(WinRatio { wins: 1, total: 100 }));
        assert_eq!("0:0".parse::<WinRatio>(), Ok(WinRatio { wins: 0, total: 0 }));
        assert!(matches!("1/100".parse::<WinRatio>(), Err(ConfigError::InvalidRatio(_))));
        assert!(matches!("a:2".parse::<WinRatio>(), Err(ConfigError::InvalidRatio(_))));
        assert_eq!(
            "3:2".parse::<WinRatio>(),
            Err(ConfigError::RatioOutOfRange { wins: 3, total: 2 })
        );
    }

    #[test]
    fn test_ratio_weights() {
        let weight = |raw: &str| raw.parse::<WinRatio>().unwrap().weight();
        assert_eq!(weight("1:100"), 10);
        assert_eq!(weight("0:1"), 1);
        assert_eq!(weight("0:0"), 1);
        assert_eq!(weight("1:2"), 500);
        assert_eq!(weight("1:1"), 1000);
        assert_eq!(weight("1:10000"), 1);
    }

    #[test]
    fn test_default_wheel_matches_winning_indices() {
        let config = WheelConfig::default();
        assert_eq!(config.slice_count(), 6);
        assert_eq!(config.policy, SelectionPolicy::GlobalProbability(GameConfig::default()));

        let colors: Vec<&str> = config.slices.iter().map(|s| s.style.color.as_str()).collect();
        assert_eq!(
            colors,
            vec!["bg-red-800", "bg-green-600", "bg-blue-800", "bg-yellow-700", "bg-green-600", "bg-orange-700"]
        );
        assert_eq!(config.slices[1].win, WinClassification::Flag(true));
        assert_eq!(config.slices[2].win, WinClassification::Flag(false));
    }

    #[test]
    fn test_from_json_both_forms() {
        let compact = r#"{"total_players": 10, "total_winners": 1, "wheel_slices": 4, "winning_slices": [2]}"#;
        let config = WheelConfig::from_json(compact).unwrap();
        assert_eq!(config.slice_count(), 4);
        assert_eq!(config.slices[2].win, WinClassification::Flag(true));

        let weighted = r##"{
            "policy": {"type": "weighted_ratio"},
            "slices": [
                {"label": "10% off", "style": {"color": "#f00"}, "win": "1:100"},
                {"label": "Try again", "win": "0:1"}
            ]
        }"##;
        let config = WheelConfig::from_json(weighted).unwrap();
        assert_eq!(config.policy, SelectionPolicy::WeightedRatio);
        assert_eq!(config.slices[0].win, WinClassification::Ratio("1:100".to_string()));
        assert_eq!(config.slices[1].style, SliceStyle::default());
    }

    #[test]
    fn test_winning_index_out_of_range() {
        let compact = WinningIndexConfig {
            wheel_slices: 3,
            winning_slices: vec![3],
            ..WinningIndexConfig::default()
        };
        assert_eq!(
            compact.into_wheel_config(),
            Err(ConfigError::WinningIndexOutOfRange { index: 3, slice_count: 3 })
        );
    }
}
