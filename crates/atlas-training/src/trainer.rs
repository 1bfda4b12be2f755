//! Fitting a classifier model from labeled text.
//!
//! # Steps
//!
//! 1. **Normalize** every sample; a sample without letters is an error
//! 2. **Deduplicate** by canonical form; the same text under both labels is an
//!    error
//! 3. **Vocabulary** - the union of all n-grams, indexed in sorted order
//! 4. **IDF** - `ln((N + 1) / (df + 1)) + 1` per token
//! 5. **Accumulate** each sample's L2-normalized TF-IDF vector into its class
//! 6. **Smooth** - `log P(token | class) = ln((sum + α) / (total + α·|V|))`
//!
//! Class priors are the log sample frequencies.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use atlas_classifier::{
    ClassifierModel, ClassifierModelBlob, FORMAT_VERSION, FeatureExtractor, Label, ModelMetadata,
    ModelParameters, PerLabel,
};
use atlas_text::normalize;
use chrono::Utc;

use crate::{TrainingConfig, TrainingDataError, TrainingSample};

/// Trains a model and serializes it.
///
/// See [`fit`].
pub fn train<P, N>(
    positives: P,
    negatives: N,
    config: &TrainingConfig,
) -> Result<ClassifierModelBlob, TrainingDataError>
where
    P: IntoIterator,
    P::Item: AsRef<str>,
    N: IntoIterator,
    N::Item: AsRef<str>,
{
    let samples = positives
        .into_iter()
        .map(|text| TrainingSample::new(text.as_ref(), Label::Country))
        .chain(
            negatives
                .into_iter()
                .map(|text| TrainingSample::new(text.as_ref(), Label::NotCountry)),
        )
        .collect::<Vec<_>>();
    Ok(fit(&samples, config)?.to_blob())
}

/// Fits a multinomial naive Bayes model over TF-IDF features.
///
/// Samples are raw text; they are normalized here. Repeated samples with the
/// same label count once.
pub fn fit(
    samples: &[TrainingSample],
    config: &TrainingConfig,
) -> Result<ClassifierModel, TrainingDataError> {
    config.validate()?;
    let corpus = canonical_corpus(samples)?;

    let counts = PerLabel::from_fn(|label| corpus.values().filter(|&&l| l == label).count());
    for label in Label::ALL {
        if counts[label] == 0 {
            return Err(TrainingDataError::EmptyClass { label });
        }
    }

    let documents = corpus
        .iter()
        .map(|(canonical, &label)| (canonical.as_str(), config.ngrams.ngrams(canonical), label))
        .collect::<Vec<_>>();

    let vocabulary = documents
        .iter()
        .flat_map(|(_, grams, _)| grams.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(index, token)| (token, index))
        .collect::<BTreeMap<_, _>>();

    let idf = inverse_document_frequencies(&vocabulary, documents.iter().map(|(_, g, _)| g));
    let extractor = FeatureExtractor::new(
        config.ngrams,
        vocabulary
            .iter()
            .map(|(token, &index)| (token.clone(), index))
            .collect::<HashMap<_, _>>(),
        idf.clone(),
    );

    let mut weights = PerLabel::from_fn(|_| vec![0.0; vocabulary.len()]);
    for (canonical, _, label) in &documents {
        for &(index, weight) in extractor.transform(canonical).entries() {
            weights[*label][index] += weight;
        }
    }

    let alpha = config.smoothing;
    #[expect(clippy::cast_precision_loss)]
    let vocabulary_size = vocabulary.len() as f64;
    let log_likelihoods = weights.map(|_, row| {
        let total = row.iter().sum::<f64>();
        let denominator = (total + alpha * vocabulary_size).ln();
        row.iter()
            .map(|weight| (weight + alpha).ln() - denominator)
            .collect::<Vec<_>>()
    });

    #[expect(clippy::cast_precision_loss)]
    let log_priors = counts.map(|_, &count| (count as f64 / corpus.len() as f64).ln());

    log::info!(
        "fitted classifier: {} country / {} not-country samples, {} vocabulary tokens",
        counts.country,
        counts.not_country,
        vocabulary.len()
    );

    let parameters = ModelParameters {
        format_version: FORMAT_VERSION,
        metadata: ModelMetadata {
            trained_at: Utc::now(),
            samples: counts,
        },
        ngrams: config.ngrams,
        vocabulary,
        idf,
        log_likelihoods,
        log_priors,
        smoothing: alpha,
        acceptance_threshold: config.acceptance_threshold,
    };
    ClassifierModel::from_parameters(parameters).map_err(|e| TrainingDataError::InvalidConfig {
        reason: format!("fitted model is invalid: {e}"),
    })
}

/// Canonical form → label, in sorted order.
fn canonical_corpus(samples: &[TrainingSample]) -> Result<BTreeMap<String, Label>, TrainingDataError> {
    let mut corpus = BTreeMap::new();
    for sample in samples {
        let canonical =
            normalize(&sample.text).map_err(|_| TrainingDataError::Unnormalizable {
                text: sample.text.clone(),
            })?;
        match corpus.get(&canonical) {
            Some(&label) if label != sample.label => {
                return Err(TrainingDataError::ConflictingLabels { canonical });
            }
            Some(_) => {}
            None => {
                corpus.insert(canonical, sample.label);
            }
        }
    }
    Ok(corpus)
}

#[expect(clippy::cast_precision_loss)]
fn inverse_document_frequencies<'a, I>(vocabulary: &BTreeMap<String, usize>, documents: I) -> Vec<f64>
where
    I: ExactSizeIterator<Item = &'a Vec<String>>,
{
    let n = documents.len() as f64;
    let mut document_frequency = vec![0usize; vocabulary.len()];
    for grams in documents {
        let distinct = grams.iter().collect::<BTreeSet<_>>();
        for gram in distinct {
            document_frequency[vocabulary[gram]] += 1;
        }
    }
    document_frequency
        .into_iter()
        .map(|df| ((n + 1.0) / (df as f64 + 1.0)).ln() + 1.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use atlas_classifier::{Classify as _, load_model};

    use super::*;

    const POSITIVES: &[&str] = &["Chad", "Niger", "Nigeria", "Costa Rica", "Cuba"];
    const NEGATIVES: &[&str] = &["table", "chair", "costa coffee", "bread", "river"];

    fn model() -> ClassifierModel {
        let blob = train(POSITIVES, NEGATIVES, &TrainingConfig::default()).unwrap();
        load_model(&blob).unwrap()
    }

    #[test]
    fn test_training_samples_are_separated() {
        let model = model();
        for text in POSITIVES {
            let result = model.classify(text);
            assert_eq!(result.label(), Label::Country, "{text}: {result:?}");
        }
        for text in NEGATIVES {
            let result = model.classify(text);
            assert_eq!(result.label(), Label::NotCountry, "{text}: {result:?}");
        }
    }

    #[test]
    fn test_model_tables() {
        let model = model();
        let parameters = model.parameters();
        assert_eq!(parameters.metadata.samples.country, 5);
        assert_eq!(parameters.metadata.samples.not_country, 5);
        assert!((parameters.log_priors.country - 0.5f64.ln()).abs() < 1e-12);

        // Vocabulary is indexed in sorted token order.
        let tokens = parameters.vocabulary.keys().collect::<Vec<_>>();
        let indices = parameters.vocabulary.values().copied().collect::<Vec<_>>();
        assert!(tokens.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(indices, (0..tokens.len()).collect::<Vec<_>>());
        assert!(parameters.vocabulary.contains_key("costa rica"));

        // "costa" appears in two of ten documents, "chad" in one.
        let idf = |token: &str| parameters.idf[parameters.vocabulary[token]];
        assert!((idf("costa") - ((11.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((idf("chad") - ((11.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_vocabulary_uses_priors() {
        let model = model();
        let result = model.classify("zxqplm");
        assert_eq!(result.label(), Label::NotCountry);
        assert!((result.confidence() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_duplicates_count_once() {
        let blob = train(["Chad", "chad!", "CHAD"], ["table"], &TrainingConfig::default()).unwrap();
        let model = load_model(blob).unwrap();
        assert_eq!(model.metadata().samples.country, 1);
    }

    #[test]
    fn test_invalid_training_data() {
        let config = TrainingConfig::default();

        let err = train(["Chad"], Vec::<String>::new(), &config).unwrap_err();
        assert_eq!(
            err,
            TrainingDataError::EmptyClass {
                label: Label::NotCountry
            }
        );

        let err = train(["Chad", "42"], ["table"], &config).unwrap_err();
        assert_eq!(
            err,
            TrainingDataError::Unnormalizable {
                text: "42".to_owned()
            }
        );

        let err = train(["Chad"], ["chad"], &config).unwrap_err();
        assert_eq!(
            err,
            TrainingDataError::ConflictingLabels {
                canonical: "chad".to_owned()
            }
        );

        let config = TrainingConfig {
            smoothing: -1.0,
            ..TrainingConfig::default()
        };
        let err = train(["Chad"], ["table"], &config).unwrap_err();
        assert!(matches!(err, TrainingDataError::InvalidConfig { .. }));
    }
}
