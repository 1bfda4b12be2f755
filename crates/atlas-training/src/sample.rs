use atlas_classifier::Label;
use serde::{Deserialize, Serialize};

/// A piece of raw text with its expected label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub text: String,
    pub label: Label,
}

impl TrainingSample {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }

    /// Labels every text with `label`.
    pub fn labeled<I>(texts: I, label: Label) -> impl Iterator<Item = Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        texts.into_iter().map(move |text| Self::new(text, label))
    }
}
