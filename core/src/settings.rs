use serde::{Deserialize, Serialize};

use crate::*;

/// Board settings as chosen by the player: a preset, explicit custom
/// dimensions, randomized dimensions, or dimensions taken from a stored
/// flag pattern.
///
/// The JSON boundary is explicit: [`BoardSettings::parse`] returns `None`
/// for null/invalid input instead of guessing, and resolution to a
/// [`BoardConfig`] is where the density and dimension ranges are enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardSettings {
    Beginner,
    Intermediate,
    Expert,
    Custom {
        width: Coord,
        height: Coord,
        mines: CellCount,
    },
    Random,
    Pattern {
        name: String,
        width: Coord,
        height: Coord,
        mines: CellCount,
    },
}

/// Side lengths drawn for `Random` settings.
const RANDOM_DIMENSION_RANGE: core::ops::RangeInclusive<Coord> = 6..=30;

/// Density drawn for `Random` settings, well inside the validated range.
const RANDOM_DENSITY_RANGE: core::ops::Range<f64> = 0.10..0.30;

impl BoardSettings {
    pub fn parse(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("settings are plain data")
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
            Self::Custom { .. } => "Custom",
            Self::Random => "Random",
            Self::Pattern { name, .. } => name,
        }
    }

    /// Resolve to a validated config. `seed` only matters for `Random`.
    pub fn board_config(&self, seed: u64) -> Result<BoardConfig> {
        match *self {
            Self::Beginner => BoardConfig::new(9, 9, 10),
            Self::Intermediate => BoardConfig::new(16, 16, 40),
            Self::Expert => BoardConfig::new(30, 16, 99),
            Self::Custom {
                width,
                height,
                mines,
            }
            | Self::Pattern {
                width,
                height,
                mines,
                ..
            } => BoardConfig::new(width, height, mines),
            Self::Random => {
                use rand::prelude::*;

                let mut rng = SmallRng::seed_from_u64(seed);
                let width = rng.random_range(RANDOM_DIMENSION_RANGE);
                let height = rng.random_range(RANDOM_DIMENSION_RANGE);
                let density = rng.random_range(RANDOM_DENSITY_RANGE);
                let mines = ((f64::from(mult(width, height)) * density) as CellCount).max(1);
                BoardConfig::new(width, height, mines)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_to_classic_configs() {
        let config = BoardSettings::Beginner.board_config(0).unwrap();
        assert_eq!((config.width, config.height, config.mines), (9, 9, 10));

        let config = BoardSettings::Expert.board_config(0).unwrap();
        assert_eq!((config.width, config.height, config.mines), (30, 16, 99));
    }

    #[test]
    fn custom_settings_are_validated_at_resolution() {
        let settings = BoardSettings::Custom {
            width: 9,
            height: 9,
            mines: 60,
        };
        assert_eq!(settings.board_config(0), Err(GameError::InvalidDensity));

        let settings = BoardSettings::Custom {
            width: 2,
            height: 9,
            mines: 1,
        };
        assert_eq!(settings.board_config(0), Err(GameError::InvalidDimensions));
    }

    #[test]
    fn random_settings_stay_within_the_validated_ranges() {
        for seed in 0..100 {
            let config = BoardSettings::Random.board_config(seed).unwrap();
            assert!(RANDOM_DIMENSION_RANGE.contains(&config.width));
            assert!(RANDOM_DIMENSION_RANGE.contains(&config.height));
            assert!(config.density() <= MAX_MINE_DENSITY);
        }
    }

    #[test]
    fn parse_rejects_invalid_json_without_panicking() {
        assert_eq!(BoardSettings::parse("null"), None);
        assert_eq!(BoardSettings::parse("{\"type\":\"bogus\"}"), None);
        assert_eq!(BoardSettings::parse("not json"), None);
    }

    #[test]
    fn json_round_trip_preserves_settings() {
        let settings = BoardSettings::Pattern {
            name: "smiley".into(),
            width: 12,
            height: 10,
            mines: 20,
        };
        assert_eq!(BoardSettings::parse(&settings.to_json()), Some(settings));
    }
}
