use atlas_text::ngram::NgramConfig;
use serde::{Deserialize, Serialize};

use crate::{TrainingDataError, TrainingSeed};

/// Parameters of a training run.
///
/// All fields have defaults, so a JSON configuration only needs the values it
/// overrides:
///
/// ```
/// use atlas_training::TrainingConfig;
///
/// let config: TrainingConfig = serde_json::from_str(r#"{"smoothing": 0.5}"#).unwrap();
/// assert_eq!(config.smoothing, 0.5);
/// assert_eq!(config.acceptance_threshold, 0.6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Additive smoothing constant of the per-class token likelihoods.
    pub smoothing: f64,
    /// Default acceptance threshold stored in the model.
    pub acceptance_threshold: f64,
    pub ngrams: NgramConfig,
    pub negatives: NegativeConfig,
    /// Seed of negative sample generation. Random if absent.
    pub seed: Option<TrainingSeed>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.1,
            acceptance_threshold: 0.6,
            ngrams: NgramConfig::default(),
            negatives: NegativeConfig::default(),
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), TrainingDataError> {
        if !(self.smoothing.is_finite() && self.smoothing > 0.0) {
            return Err(invalid(format!(
                "smoothing must be positive, got {}",
                self.smoothing
            )));
        }
        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            return Err(invalid(format!(
                "acceptance threshold must be within [0, 1], got {}",
                self.acceptance_threshold
            )));
        }
        self.ngrams
            .validate()
            .map_err(|e| invalid(e.to_string()))?;
        self.negatives.validate()
    }
}

/// How many negative samples of each kind to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegativeConfig {
    /// Everyday words drawn from a fixed list.
    pub common_words: usize,
    /// Strings of random letters.
    pub random_strings: usize,
    /// Mean length of random strings.
    pub random_length_mean: f64,
    /// Standard deviation of random string lengths.
    pub random_length_std_dev: f64,
    /// Near-miss misspellings generated from each country name.
    pub misspellings_per_name: usize,
    /// Words shared by several country names and bare qualifiers such as
    /// `"republic of"`. Without them, such parts of names score like
    /// countries.
    pub name_fragments: bool,
}

impl Default for NegativeConfig {
    fn default() -> Self {
        Self {
            common_words: 150,
            random_strings: 150,
            random_length_mean: 8.0,
            random_length_std_dev: 2.5,
            misspellings_per_name: 1,
            name_fragments: true,
        }
    }
}

impl NegativeConfig {
    pub fn validate(&self) -> Result<(), TrainingDataError> {
        if !(self.random_length_mean.is_finite() && self.random_length_mean > 0.0) {
            return Err(invalid(format!(
                "random string length mean must be positive, got {}",
                self.random_length_mean
            )));
        }
        if !(self.random_length_std_dev.is_finite() && self.random_length_std_dev >= 0.0) {
            return Err(invalid(format!(
                "random string length standard deviation must be non-negative, got {}",
                self.random_length_std_dev
            )));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> TrainingDataError {
    TrainingDataError::InvalidConfig { reason }
}

#[cfg(test)]
mod tests {
    use atlas_text::ngram::NgramRange;

    use super::*;

    #[test]
    fn test_default_is_valid() {
        TrainingConfig::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_values() {
        let configs = [
            TrainingConfig {
                smoothing: 0.0,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                smoothing: f64::NAN,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                acceptance_threshold: 1.5,
                ..TrainingConfig::default()
            },
            TrainingConfig {
                ngrams: NgramConfig {
                    words: NgramRange { min: 2, max: 1 },
                    chars: None,
                },
                ..TrainingConfig::default()
            },
            TrainingConfig {
                negatives: NegativeConfig {
                    random_length_std_dev: -1.0,
                    ..NegativeConfig::default()
                },
                ..TrainingConfig::default()
            },
        ];
        for config in configs {
            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, TrainingDataError::InvalidConfig { .. }),
                "{config:?}: {err}"
            );
        }
    }

    #[test]
    fn test_seed_in_config_file() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{"seed": "0000000000000000000000000000002a"}"#).unwrap();
        assert_eq!(config.seed, Some(TrainingSeed::from_u64(42)));
        assert_eq!(config.negatives, NegativeConfig::default());
    }
}
