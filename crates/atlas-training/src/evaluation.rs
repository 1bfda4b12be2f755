//! Quality report of a trained classifier.
//!
//! A sample counts as predicted [`Label::Country`] only when the classifier
//! says so with at least the acceptance threshold, which is the rule the game
//! applies. Confidence statistics are computed over `P(country)` per true
//! label, so a good model has a high mean for countries and a low mean for the
//! rest.

use atlas_classifier::{Classify, Label, PerLabel};
use serde::Serialize;

use crate::TrainingSample;

/// Descriptive statistics of a set of probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes statistics from unsorted values, or `None` if there are none.
    ///
    /// ```
    /// # use atlas_training::evaluation::DescriptiveStats;
    /// let stats = DescriptiveStats::new([0.9, 0.1, 0.5]).unwrap();
    /// assert_eq!(stats.min, 0.1);
    /// assert_eq!(stats.median, 0.5);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    #[expect(clippy::cast_precision_loss)]
    fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let n = sorted_values.len() as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = sorted_values[sorted_values.len() / 2];
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;
        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

/// Counts of predictions by true label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Confusion {
    pub predicted_country: usize,
    pub predicted_not_country: usize,
}

impl Confusion {
    #[must_use]
    pub fn total(&self) -> usize {
        self.predicted_country + self.predicted_not_country
    }

    #[must_use]
    pub fn correct(&self, truth: Label) -> usize {
        match truth {
            Label::Country => self.predicted_country,
            Label::NotCountry => self.predicted_not_country,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Acceptance threshold the predictions were made with.
    pub threshold: f64,
    /// Predictions, keyed by true label.
    pub confusion: PerLabel<Confusion>,
    /// Fraction of correct predictions; 0 for an empty sample set.
    pub accuracy: f64,
    /// Statistics of `P(country)`, keyed by true label.
    pub country_probability: PerLabel<Option<DescriptiveStats>>,
}

impl EvaluationReport {
    /// Classifies every sample and summarizes the outcome.
    #[must_use]
    pub fn evaluate<C>(classifier: &C, samples: &[TrainingSample], threshold: f64) -> Self
    where
        C: Classify + ?Sized,
    {
        let mut confusion = PerLabel::<Confusion>::default();
        let mut probabilities = PerLabel::<Vec<f64>>::default();

        for sample in samples {
            let result = classifier.classify(&sample.text);
            let counts = &mut confusion[sample.label];
            if result.is_confident_country(threshold) {
                counts.predicted_country += 1;
            } else {
                counts.predicted_not_country += 1;
            }
            let p_country = match result.label() {
                Label::Country => result.confidence(),
                Label::NotCountry => 1.0 - result.confidence(),
            };
            probabilities[sample.label].push(p_country);
        }

        let correct = Label::ALL
            .iter()
            .map(|&label| confusion[label].correct(label))
            .sum::<usize>();
        #[expect(clippy::cast_precision_loss)]
        let accuracy = if samples.is_empty() {
            0.0
        } else {
            correct as f64 / samples.len() as f64
        };

        Self {
            threshold,
            confusion,
            accuracy,
            country_probability: probabilities
                .map(|_, values| DescriptiveStats::new(values.iter().copied())),
        }
    }

    #[must_use]
    pub fn samples(&self) -> usize {
        self.confusion.country.total() + self.confusion.not_country.total()
    }
}
