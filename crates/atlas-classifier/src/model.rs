//! Multinomial naive Bayes over TF-IDF features.
//!
//! # Scoring
//!
//! For a feature vector `x` and class `c`:
//!
//! ```text
//! log P(c | x) ∝ log P(c) + Σᵢ xᵢ · log P(tokenᵢ | c)
//! ```
//!
//! `log P(token | c)` comes from smoothed per-class token weights
//! (`(weight + α) / (total + α·|V|)`), so every vocabulary token has a non-zero
//! likelihood in both classes. The predicted label is the class with the larger
//! log posterior and the confidence is its normalized posterior (see
//! [`ClassificationResult::from_log_posteriors`]).
//!
//! Inputs with no in-vocabulary n-gram are decided by the class priors alone.

use std::collections::{BTreeMap, HashMap, HashSet};

use atlas_text::ngram::NgramConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Classify, FeatureExtractor, FeatureVector, ModelFormatError,
    blob::{ClassifierModelBlob, FORMAT_VERSION},
    label::{ClassificationResult, Label, PerLabel},
};

/// Tolerance when checking that probabilities sum to one.
const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Provenance of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    /// Number of training samples per class.
    pub samples: PerLabel<usize>,
}

/// Everything a model consists of, in its serialized shape.
///
/// This is the logical layout of a [`ClassifierModelBlob`]. Building a
/// [`ClassifierModel`] from it validates every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub format_version: u32,
    pub metadata: ModelMetadata,
    pub ngrams: NgramConfig,
    /// Token → index into `idf` and the likelihood rows.
    pub vocabulary: BTreeMap<String, usize>,
    pub idf: Vec<f64>,
    /// `log P(token | class)`, one row per class aligned to the vocabulary.
    pub log_likelihoods: PerLabel<Vec<f64>>,
    pub log_priors: PerLabel<f64>,
    /// Additive smoothing constant used during training.
    pub smoothing: f64,
    /// Minimum confidence for a country verdict to be accepted by default.
    pub acceptance_threshold: f64,
}

/// A loaded, validated classifier.
#[derive(Debug, Clone)]
pub struct ClassifierModel {
    parameters: ModelParameters,
    extractor: FeatureExtractor,
}

impl ClassifierModel {
    /// Validates `parameters` and builds the inference structures.
    pub fn from_parameters(parameters: ModelParameters) -> Result<Self, ModelFormatError> {
        validate(&parameters)?;
        let vocabulary = parameters
            .vocabulary
            .iter()
            .map(|(token, &index)| (token.clone(), index))
            .collect::<HashMap<_, _>>();
        let extractor = FeatureExtractor::new(parameters.ngrams, vocabulary, parameters.idf.clone());
        Ok(Self {
            parameters,
            extractor,
        })
    }

    #[must_use]
    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    #[must_use]
    pub fn metadata(&self) -> &ModelMetadata {
        &self.parameters.metadata
    }

    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.extractor.vocabulary_size()
    }

    #[must_use]
    pub fn acceptance_threshold(&self) -> f64 {
        self.parameters.acceptance_threshold
    }

    /// Unnormalized log posteriors for a feature vector.
    #[must_use]
    pub fn log_posteriors(&self, features: &FeatureVector) -> PerLabel<f64> {
        self.parameters.log_priors.map(|label, prior| {
            prior + features.dot(&self.parameters.log_likelihoods[label])
        })
    }

    /// Serializes the model into its exchange format.
    #[must_use]
    pub fn to_blob(&self) -> ClassifierModelBlob {
        ClassifierModelBlob::encode(&self.parameters)
    }
}

impl Classify for ClassifierModel {
    fn classify_canonical(&self, canonical: &str) -> ClassificationResult {
        let features = self.extractor.transform(canonical);
        let log_posteriors = self.log_posteriors(&features);
        let result = ClassificationResult::from_log_posteriors(log_posteriors);
        log::debug!(
            "classified {canonical:?}: {} features, log posteriors {:.3}/{:.3} => {} ({:.3})",
            features.entries().len(),
            log_posteriors.country,
            log_posteriors.not_country,
            result.label(),
            result.confidence(),
        );
        result
    }
}

fn inconsistent(reason: impl Into<String>) -> ModelFormatError {
    ModelFormatError::Inconsistent {
        reason: reason.into(),
    }
}

fn validate(p: &ModelParameters) -> Result<(), ModelFormatError> {
    if p.format_version != FORMAT_VERSION {
        return Err(ModelFormatError::VersionMismatch {
            expected: FORMAT_VERSION,
            found: p.format_version,
        });
    }

    p.ngrams
        .validate()
        .map_err(|e| inconsistent(format!("n-gram configuration: {e}")))?;

    let size = p.vocabulary.len();
    if size == 0 {
        return Err(inconsistent("vocabulary is empty"));
    }
    let mut seen = HashSet::with_capacity(size);
    for (token, &index) in &p.vocabulary {
        if index >= size || !seen.insert(index) {
            return Err(inconsistent(format!(
                "vocabulary index {index} of {token:?} is out of range or duplicated"
            )));
        }
    }

    if p.idf.len() != size {
        return Err(inconsistent(format!(
            "idf has {} entries, vocabulary has {size}",
            p.idf.len()
        )));
    }
    if let Some(w) = p.idf.iter().find(|w| !w.is_finite() || **w <= 0.0) {
        return Err(inconsistent(format!("idf weight {w} is not positive")));
    }

    for (label, row) in p.log_likelihoods.iter() {
        if row.len() != size {
            return Err(inconsistent(format!(
                "likelihood row for {label} has {} entries, vocabulary has {size}",
                row.len()
            )));
        }
        check_log_distribution(row.iter().copied())
            .map_err(|reason| inconsistent(format!("likelihood row for {label}: {reason}")))?;
    }

    let priors = p.log_priors.iter().map(|(_, &prior)| prior);
    check_log_distribution(priors).map_err(|reason| inconsistent(format!("priors: {reason}")))?;

    if !p.smoothing.is_finite() || p.smoothing <= 0.0 {
        return Err(inconsistent(format!(
            "smoothing constant {} is not positive",
            p.smoothing
        )));
    }
    if !(0.0..=1.0).contains(&p.acceptance_threshold) {
        return Err(inconsistent(format!(
            "acceptance threshold {} is outside [0, 1]",
            p.acceptance_threshold
        )));
    }

    let samples = p.metadata.samples;
    if Label::ALL.iter().any(|&label| samples[label] == 0) {
        return Err(inconsistent("metadata reports an empty class"));
    }

    Ok(())
}

/// Checks that `values` are log probabilities summing to one.
fn check_log_distribution<I>(values: I) -> Result<(), String>
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    for value in values {
        if !value.is_finite() || value > 0.0 {
            return Err(format!("{value} is not a log probability"));
        }
        sum += value.exp();
    }
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(format!("probabilities sum to {sum}"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A tiny hand-built model: "chad" and "niger" are countries, "table" is not.
    pub(crate) fn toy_parameters() -> ModelParameters {
        let vocabulary = [("chad", 0), ("niger", 1), ("table", 2)]
            .into_iter()
            .map(|(t, i)| (t.to_owned(), i))
            .collect();
        let likelihoods = |weights: [f64; 3]| {
            let total = weights.iter().sum::<f64>();
            weights.iter().map(|w| (w / total).ln()).collect()
        };
        ModelParameters {
            format_version: FORMAT_VERSION,
            metadata: ModelMetadata {
                trained_at: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
                samples: PerLabel {
                    country: 2,
                    not_country: 2,
                },
            },
            ngrams: NgramConfig::default(),
            vocabulary,
            idf: vec![1.0, 1.0, 1.0],
            log_likelihoods: PerLabel {
                country: likelihoods([4.0, 4.0, 1.0]),
                not_country: likelihoods([1.0, 1.0, 7.0]),
            },
            log_priors: PerLabel {
                country: 0.5f64.ln(),
                not_country: 0.5f64.ln(),
            },
            smoothing: 1.0,
            acceptance_threshold: 0.6,
        }
    }

    fn toy_model() -> ClassifierModel {
        ClassifierModel::from_parameters(toy_parameters()).unwrap()
    }

    mod scoring {
        use super::*;

        #[test]
        fn test_country_token_wins() {
            let result = toy_model().classify("Chad");
            assert_eq!(result.label(), Label::Country);
            // log(4/9) - log(1/9) = log 4  =>  confidence 4 / 5
            assert!((result.confidence() - 0.8).abs() < 1e-9);
        }

        #[test]
        fn test_negative_token_wins() {
            let result = toy_model().classify("table");
            assert_eq!(result.label(), Label::NotCountry);
            assert!((result.confidence() - 7.0 / 8.0).abs() < 1e-9);
        }

        #[test]
        fn test_unknown_tokens_fall_back_to_priors() {
            let result = toy_model().classify("zxqplm");
            assert_eq!(result.label(), Label::NotCountry);
            assert!((result.confidence() - 0.5).abs() < 1e-9);
        }

        #[test]
        fn test_empty_input_is_not_a_country() {
            let result = toy_model().classify("  ?? ");
            assert_eq!(result, ClassificationResult::certain(Label::NotCountry));
        }

        #[test]
        fn test_long_input_stays_in_range() {
            let text = "chad ".repeat(5000);
            let result = toy_model().classify(&text);
            assert_eq!(result.label(), Label::Country);
            assert!((0.0..=1.0).contains(&result.confidence()));
        }
    }

    mod validation {
        use super::*;

        fn assert_inconsistent(parameters: ModelParameters) {
            let err = ClassifierModel::from_parameters(parameters).unwrap_err();
            assert!(err.is_inconsistent(), "unexpected error: {err}");
        }

        #[test]
        fn test_version_mismatch() {
            let mut p = toy_parameters();
            p.format_version = FORMAT_VERSION + 1;
            let err = ClassifierModel::from_parameters(p).unwrap_err();
            assert!(
                matches!(
                    err,
                    ModelFormatError::VersionMismatch { expected, found }
                        if expected == FORMAT_VERSION && found == FORMAT_VERSION + 1
                ),
                "unexpected error: {err}"
            );
        }

        #[test]
        fn test_misaligned_idf() {
            let mut p = toy_parameters();
            p.idf.pop();
            assert_inconsistent(p);
        }

        #[test]
        fn test_duplicated_index() {
            let mut p = toy_parameters();
            p.vocabulary.insert("table".to_owned(), 0);
            assert_inconsistent(p);
        }

        #[test]
        fn test_likelihoods_not_a_distribution() {
            let mut p = toy_parameters();
            p.log_likelihoods.country[0] = -0.01;
            assert_inconsistent(p);
        }

        #[test]
        fn test_non_finite_values() {
            let mut p = toy_parameters();
            p.log_likelihoods.not_country[2] = f64::NAN;
            assert_inconsistent(p);

            let mut p = toy_parameters();
            p.idf[1] = f64::INFINITY;
            assert_inconsistent(p);
        }

        #[test]
        fn test_bad_scalars() {
            let mut p = toy_parameters();
            p.smoothing = 0.0;
            assert_inconsistent(p);

            let mut p = toy_parameters();
            p.acceptance_threshold = 1.5;
            assert_inconsistent(p);

            let mut p = toy_parameters();
            p.log_priors.country = 0.0;
            assert_inconsistent(p);
        }
    }
}
