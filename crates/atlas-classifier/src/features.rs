//! TF-IDF feature extraction against a fixed vocabulary.
//!
//! A canonical string is turned into a sparse vector in three steps:
//!
//! 1. **Tokenize** - [`NgramConfig::ngrams`] produces word (and optional
//!    character) n-grams
//! 2. **Weight** - each in-vocabulary n-gram gets `count × idf`; n-grams
//!    outside the vocabulary are dropped
//! 3. **Normalize** - the vector is scaled to unit L2 norm so long and short
//!    names contribute on the same scale
//!
//! The vocabulary and IDF weights are learned offline (see `atlas-training`)
//! and never change once a model is loaded.

use std::collections::HashMap;

use atlas_text::ngram::NgramConfig;

/// Sparse, L2-normalized feature vector: `(vocabulary index, weight)` pairs
/// sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    #[must_use]
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product with a dense row aligned to the vocabulary.
    #[must_use]
    pub fn dot(&self, row: &[f64]) -> f64 {
        self.entries.iter().map(|&(i, w)| w * row[i]).sum()
    }
}

/// Maps canonical text to TF-IDF vectors.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    ngrams: NgramConfig,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl FeatureExtractor {
    /// Creates an extractor from a learned vocabulary.
    ///
    /// # Panics
    ///
    /// Panics if `idf` is not aligned with `vocabulary` (one weight per index).
    #[must_use]
    pub fn new(ngrams: NgramConfig, vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Self {
        assert_eq!(vocabulary.len(), idf.len(), "idf must be aligned to vocabulary");
        assert!(
            vocabulary.values().all(|&i| i < idf.len()),
            "vocabulary indices must be in range"
        );
        Self {
            ngrams,
            vocabulary,
            idf,
        }
    }

    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    #[must_use]
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.vocabulary.get(token).copied()
    }

    /// Computes the feature vector of `canonical`.
    ///
    /// Returns an empty vector when no n-gram is in the vocabulary.
    #[must_use]
    pub fn transform(&self, canonical: &str) -> FeatureVector {
        let mut counts = HashMap::<usize, f64>::new();
        for gram in self.ngrams.ngrams(canonical) {
            if let Some(index) = self.index_of(&gram) {
                *counts.entry(index).or_default() += 1.0;
            }
        }

        let mut entries = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect::<Vec<_>>();
        entries.sort_unstable_by_key(|&(index, _)| index);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        }

        FeatureVector { entries }
    }
}
