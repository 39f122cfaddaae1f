use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{FULL_TURN_DEGREES, MIN_SPINS};
use crate::error::ConfigError;
use crate::wheel_config::{SelectionPolicy, WheelConfig, WinClassification, WinRatio};

/// Outcome of one spin, handed once to the presentation layer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SpinResult {
    pub is_winner: bool,
    pub target_slice_index: usize,
    pub rotation_degrees: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum SelectionTable {
    Global {
        win_probability: f64,
        winning: Vec<usize>,
        losing: Vec<usize>,
    },
    Weighted {
        ratios: Vec<WinRatio>,
        weights: Vec<u32>,
        total_weight: u64,
    },
}

/// Decides spin outcomes for a validated wheel. The configuration is
/// checked once in [`OutcomeEngine::new`]; deciding an outcome cannot fail.
#[derive(Debug, Clone)]
pub struct OutcomeEngine {
    config: WheelConfig,
    table: SelectionTable,
}

impl OutcomeEngine {
    pub fn new(config: WheelConfig) -> Result<Self, ConfigError> {
        if config.slices.is_empty() {
            return Err(ConfigError::EmptyWheel);
        }

        let table = match &config.policy {
            SelectionPolicy::GlobalProbability(game) => {
                if game.total_players == 0 {
                    return Err(ConfigError::ZeroPlayers);
                }
                if game.total_winners > game.total_players {
                    return Err(ConfigError::WinnersExceedPlayers {
                        winners: game.total_winners,
                        players: game.total_players,
                    });
                }

                let mut winning = Vec::new();
                let mut losing = Vec::new();
                for (index, slice) in config.slices.iter().enumerate() {
                    match slice.win {
                        WinClassification::Flag(true) => winning.push(index),
                        WinClassification::Flag(false) => losing.push(index),
                        WinClassification::Ratio(_) => {
                            return Err(ConfigError::ClassificationMismatch {
                                index,
                                expected: "a boolean flag",
                            })
                        }
                    }
                }

                if winning.is_empty() {
                    return Err(ConfigError::NoWinningSlices);
                }
                if losing.is_empty() {
                    return Err(ConfigError::NoLosingSlices);
                }

                SelectionTable::Global {
                    win_probability: game.win_probability(),
                    winning,
                    losing,
                }
            }
            SelectionPolicy::WeightedRatio => {
                let ratios = config
                    .slices
                    .iter()
                    .enumerate()
                    .map(|(index, slice)| match &slice.win {
                        WinClassification::Ratio(raw) => raw.parse::<WinRatio>(),
                        WinClassification::Flag(_) => Err(ConfigError::ClassificationMismatch {
                            index,
                            expected: "a 'wins:total' ratio",
                        }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let weights: Vec<u32> = ratios.iter().map(WinRatio::weight).collect();
                let total_weight = weights.iter().map(|&w| w as u64).sum();

                SelectionTable::Weighted {
                    ratios,
                    weights,
                    total_weight,
                }
            }
        };

        log::debug!("Outcome engine ready: {} slices, {:?}", config.slices.len(), config.policy);
        Ok(Self { config, table })
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn slice_count(&self) -> usize {
        self.config.slices.len()
    }

    /// Selection weights per slice under the weighted policy.
    pub fn weights(&self) -> Option<&[u32]> {
        match &self.table {
            SelectionTable::Weighted { weights, .. } => Some(weights),
            SelectionTable::Global { .. } => None,
        }
    }

    /// Whether landing on `index` counts as a win.
    pub fn is_winning_slice(&self, index: usize) -> bool {
        match &self.table {
            SelectionTable::Global { winning, .. } => winning.contains(&index),
            SelectionTable::Weighted { ratios, .. } => {
                ratios.get(index).map_or(false, WinRatio::is_winning)
            }
        }
    }

    pub fn decide_outcome<R: Rng + ?Sized>(&self, rng: &mut R) -> SpinResult {
        let (is_winner, target_slice_index) = match &self.table {
            SelectionTable::Global {
                win_probability,
                winning,
                losing,
            } => {
                let is_winner = rng.gen::<f64>() < *win_probability;
                let pool = if is_winner { winning } else { losing };
                (is_winner, pool[uniform_index(rng, pool.len())])
            }
            SelectionTable::Weighted {
                ratios,
                weights,
                total_weight,
            } => {
                let index = if *total_weight == 0 {
                    uniform_index(rng, ratios.len())
                } else {
                    weighted_index(rng, weights, *total_weight)
                };
                (ratios[index].is_winning(), index)
            }
        };

        SpinResult {
            is_winner,
            target_slice_index,
            rotation_degrees: compute_rotation(target_slice_index, self.slice_count()),
        }
    }
}

fn uniform_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    let index = (rng.gen::<f64>() * len as f64).floor() as usize;
    index.min(len - 1)
}

// Equivalent to drawing from a pool where slice `i` appears `weights[i]` times.
fn weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[u32], total_weight: u64) -> usize {
    let ticket = ((rng.gen::<f64>() * total_weight as f64).floor() as u64).min(total_weight - 1);
    let mut cumulative = 0u64;
    for (index, &weight) in weights.iter().enumerate() {
        cumulative += weight as u64;
        if ticket < cumulative {
            return index;
        }
    }
    weights.len() - 1
}

/// Rotation that settles the midpoint of `target_slice_index` under the
/// pointer after at least [`MIN_SPINS`] full turns.
pub fn compute_rotation(target_slice_index: usize, slice_count: usize) -> f64 {
    let slice_angle = FULL_TURN_DEGREES / slice_count as f64;
    let target_angle = target_slice_index as f64 * slice_angle + slice_angle / 2.0;
    MIN_SPINS as f64 * FULL_TURN_DEGREES + (FULL_TURN_DEGREES - target_angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel_config::{GameConfig, SliceConfig, SliceStyle, WinningIndexConfig};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ratio_wheel(ratios: &[&str]) -> WheelConfig {
        WheelConfig {
            policy: SelectionPolicy::WeightedRatio,
            slices: ratios
                .iter()
                .map(|r| SliceConfig {
                    label: r.to_string(),
                    style: SliceStyle::default(),
                    win: WinClassification::Ratio(r.to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn test_rotation_bounds_and_landing() {
        for n in 1..=24 {
            for t in 0..n {
                let rotation = compute_rotation(t, n);
                assert!(rotation >= 1800.0 && rotation < 2160.0, "n={} t={} r={}", n, t, rotation);

                let slice_angle = 360.0 / n as f64;
                let expected = (t as f64 * slice_angle + slice_angle / 2.0) % 360.0;
                let landing = (360.0 - rotation % 360.0) % 360.0;
                assert!((landing - expected).abs() < 1e-9, "n={} t={}", n, t);
            }
        }
    }

    #[test]
    fn test_rotation_six_slices() {
        // 60 degree slices, slice 1 midpoint at 90
        assert_eq!(compute_rotation(1, 6), 1800.0 + 270.0);
        assert_eq!(compute_rotation(0, 1), 1800.0 + 180.0);
    }

    #[test]
    fn test_global_policy_extremes() {
        let engine = OutcomeEngine::new(WheelConfig::default()).unwrap();

        // Every draw is 0.0: win roll succeeds, first winning slice
        let result = engine.decide_outcome(&mut StepRng::new(0, 0));
        assert!(result.is_winner);
        assert_eq!(result.target_slice_index, 1);

        // Every draw is just below 1.0: lose, last losing slice
        let result = engine.decide_outcome(&mut StepRng::new(u64::MAX, 0));
        assert!(!result.is_winner);
        assert_eq!(result.target_slice_index, 5);
        assert_eq!(result.rotation_degrees, compute_rotation(5, 6));
    }

    #[test]
    fn test_global_policy_simulation() {
        let engine = OutcomeEngine::new(WheelConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let spins = 10_000;
        let mut wins = 0;

        for _ in 0..spins {
            let result = engine.decide_outcome(&mut rng);
            if result.is_winner {
                wins += 1;
                assert!([1, 4].contains(&result.target_slice_index));
            } else {
                assert!(![1, 4].contains(&result.target_slice_index));
            }
        }

        let fraction = wins as f64 / spins as f64;
        assert!((0.04..=0.10).contains(&fraction), "win fraction {}", fraction);
    }

    #[test]
    fn test_seeded_outcomes_replay() {
        let engine = OutcomeEngine::new(ratio_wheel(&["1:100", "0:1", "1:2"])).unwrap();
        let first: Vec<SpinResult> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..50).map(|_| engine.decide_outcome(&mut rng)).collect()
        };
        let second: Vec<SpinResult> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..50).map(|_| engine.decide_outcome(&mut rng)).collect()
        };
        assert_eq!(first, second);
        assert_eq!(engine.config(), &ratio_wheel(&["1:100", "0:1", "1:2"]));
    }

    #[test]
    fn test_weighted_policy_zero_ratio_never_wins() {
        let engine = OutcomeEngine::new(ratio_wheel(&["0:1", "1:100"])).unwrap();
        assert_eq!(engine.weights(), Some(&[1, 10][..]));

        let mut rng = StdRng::seed_from_u64(3);
        let mut landed_on_zero = 0;
        for _ in 0..5_000 {
            let result = engine.decide_outcome(&mut rng);
            if result.target_slice_index == 0 {
                landed_on_zero += 1;
                assert!(!result.is_winner);
            } else {
                assert!(result.is_winner);
            }
        }
        // Weight 1 of 11: still landable for display
        assert!(landed_on_zero > 0);
    }

    #[test]
    fn test_weighted_policy_proportions() {
        let engine = OutcomeEngine::new(ratio_wheel(&["1:100", "0:1", "1:10"])).unwrap();
        assert_eq!(engine.weights(), Some(&[10, 1, 100][..]));

        let mut rng = StdRng::seed_from_u64(11);
        let mut counts = [0usize; 3];
        let spins = 111_000;
        for _ in 0..spins {
            counts[engine.decide_outcome(&mut rng).target_slice_index] += 1;
        }
        let share = |i: usize| counts[i] as f64 / spins as f64;
        assert!((share(0) - 10.0 / 111.0).abs() < 0.01);
        assert!((share(1) - 1.0 / 111.0).abs() < 0.005);
        assert!((share(2) - 100.0 / 111.0).abs() < 0.01);
    }

    #[test]
    fn test_weighted_pool_boundaries() {
        // Pool: [0 x10, 1 x1, 2 x100]
        let engine = OutcomeEngine::new(ratio_wheel(&["1:100", "0:1", "1:10"])).unwrap();
        assert_eq!(engine.decide_outcome(&mut StepRng::new(0, 0)).target_slice_index, 0);
        assert_eq!(engine.decide_outcome(&mut StepRng::new(u64::MAX, 0)).target_slice_index, 2);
    }

    #[test]
    fn test_invalid_configs_fail_fast() {
        let all_winning = WinningIndexConfig {
            wheel_slices: 2,
            winning_slices: vec![0, 1],
            ..WinningIndexConfig::default()
        };
        assert_eq!(
            OutcomeEngine::new(all_winning.into_wheel_config().unwrap()).err(),
            Some(ConfigError::NoLosingSlices)
        );

        let none_winning = WinningIndexConfig {
            winning_slices: vec![],
            ..WinningIndexConfig::default()
        };
        assert_eq!(
            OutcomeEngine::new(none_winning.into_wheel_config().unwrap()).err(),
            Some(ConfigError::NoWinningSlices)
        );

        let mut zero_players = WheelConfig::default();
        zero_players.policy = SelectionPolicy::GlobalProbability(GameConfig {
            total_players: 0,
            total_winners: 0,
        });
        assert_eq!(OutcomeEngine::new(zero_players).err(), Some(ConfigError::ZeroPlayers));

        let empty = WheelConfig {
            policy: SelectionPolicy::WeightedRatio,
            slices: vec![],
        };
        assert_eq!(OutcomeEngine::new(empty).err(), Some(ConfigError::EmptyWheel));

        assert!(matches!(
            OutcomeEngine::new(ratio_wheel(&["1:2", "oops"])).err(),
            Some(ConfigError::InvalidRatio(_))
        ));

        let mut mixed = WheelConfig::default();
        mixed.policy = SelectionPolicy::WeightedRatio;
        assert!(matches!(
            OutcomeEngine::new(mixed).err(),
            Some(ConfigError::ClassificationMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_shipped_configs_load() {
        let weighted = WheelConfig::from_json(include_str!("../../config/weighted_wheel.json")).unwrap();
        let engine = OutcomeEngine::new(weighted).unwrap();
        assert_eq!(engine.weights(), Some(&[10, 1, 50, 1, 2, 1][..]));
        assert!(!engine.is_winning_slice(1));
        assert!(engine.is_winning_slice(4));

        let compact = WheelConfig::from_json(include_str!("../../config/winning_indices.json")).unwrap();
        assert_eq!(compact, WheelConfig::default());
    }

    #[test]
    fn test_is_winning_slice() {
        let engine = OutcomeEngine::new(WheelConfig::default()).unwrap();
        let winning: Vec<usize> = (0..6).filter(|&i| engine.is_winning_slice(i)).collect();
        assert_eq!(winning, vec![1, 4]);
        assert_eq!(engine.weights(), None);
    }
}
