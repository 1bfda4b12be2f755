use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// The two classes the classifier separates.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    #[display("country")]
    Country,
    #[display("not a country")]
    NotCountry,
}

impl Label {
    pub const ALL: [Self; 2] = [Self::Country, Self::NotCountry];
}

/// One value per [`Label`].
///
/// Used for class priors, per-class likelihood rows and per-class counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerLabel<T> {
    pub country: T,
    pub not_country: T,
}

impl<T> PerLabel<T> {
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(Label) -> T,
    {
        Self {
            country: f(Label::Country),
            not_country: f(Label::NotCountry),
        }
    }

    pub fn map<U, F>(&self, mut f: F) -> PerLabel<U>
    where
        F: FnMut(Label, &T) -> U,
    {
        PerLabel {
            country: f(Label::Country, &self.country),
            not_country: f(Label::NotCountry, &self.not_country),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Label, &T)> {
        [
            (Label::Country, &self.country),
            (Label::NotCountry, &self.not_country),
        ]
        .into_iter()
    }
}

impl<T> Index<Label> for PerLabel<T> {
    type Output = T;

    fn index(&self, label: Label) -> &T {
        match label {
            Label::Country => &self.country,
            Label::NotCountry => &self.not_country,
        }
    }
}

impl<T> IndexMut<Label> for PerLabel<T> {
    fn index_mut(&mut self, label: Label) -> &mut T {
        match label {
            Label::Country => &mut self.country,
            Label::NotCountry => &mut self.not_country,
        }
    }
}

/// Verdict of the classifier for one input.
///
/// `confidence` is the posterior probability of `label` and always lies in
/// \[0.0, 1.0\]. For a two-class model it is never below 0.5 unless the
/// posterior could not be computed, in which case it is 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    label: Label,
    confidence: f64,
}

impl ClassificationResult {
    /// Creates a result, clamping `confidence` into \[0.0, 1.0\].
    #[must_use]
    pub fn new(label: Label, confidence: f64) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self { label, confidence }
    }

    /// A result with confidence 1.0.
    #[must_use]
    pub fn certain(label: Label) -> Self {
        Self::new(label, 1.0)
    }

    /// Picks the more probable class from unnormalized log posteriors.
    ///
    /// Ties go to [`Label::NotCountry`]. The confidence is computed with the
    /// log-sum-exp trick, so very negative log posteriors of long inputs do not
    /// underflow to `0 / 0`.
    #[must_use]
    pub fn from_log_posteriors(log_posteriors: PerLabel<f64>) -> Self {
        let PerLabel {
            country,
            not_country,
        } = log_posteriors;
        let (label, best) = if country > not_country {
            (Label::Country, country)
        } else {
            (Label::NotCountry, not_country)
        };
        let log_evidence = best + ((country - best).exp() + (not_country - best).exp()).ln();
        Self::new(label, (best - log_evidence).exp())
    }

    #[must_use]
    pub fn label(&self) -> Label {
        self.label
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Returns `true` if this is a [`Label::Country`] verdict at or above `threshold`.
    #[must_use]
    pub fn is_confident_country(&self, threshold: f64) -> bool {
        self.label.is_country() && self.confidence >= threshold
    }
}
