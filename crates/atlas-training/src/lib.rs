//! Offline training of the country classifier.
//!
//! # How Training Works
//!
//! 1. **Positives** - every name and alias of the country catalog
//! 2. **Negatives** - common words, random strings, misspellings of real names
//!    and fragments shared by several names, minus anything that collides with
//!    a positive (see [`negative`])
//! 3. **Fit** - TF-IDF features and a smoothed multinomial naive Bayes model
//!    (see [`trainer`])
//! 4. **Evaluate** - accuracy and confidence statistics on the training corpus
//!    and on held-out negatives (see [`evaluation`])
//! 5. **Export** - the model is serialized as a
//!    [`ClassifierModelBlob`](atlas_classifier::ClassifierModelBlob)
//!
//! # Example
//!
//! ```
//! use atlas_classifier::{Classify as _, Label, load_model};
//! use atlas_training::{TrainingConfig, train};
//!
//! let blob = train(
//!     ["Chad", "Niger", "Cuba"],
//!     ["table", "chair", "river"],
//!     &TrainingConfig::default(),
//! )?;
//! let model = load_model(&blob)?;
//! assert_eq!(model.classify("Cuba").label(), Label::Country);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Reproducibility
//!
//! Negative generation is the only random step. It is driven by a
//! [`TrainingSeed`], recorded in [`TrainingOutcome`], so a run can be repeated
//! exactly by putting the seed in the configuration.

use atlas_classifier::Label;

pub use self::{
    config::{NegativeConfig, TrainingConfig},
    evaluation::EvaluationReport,
    negative::{generate_negatives, name_fragments},
    pipeline::{TrainingOutcome, train_on_catalog},
    sample::TrainingSample,
    trainer::{fit, train},
};

mod config;
pub mod evaluation;
pub mod negative;
mod pipeline;
mod sample;
pub mod trainer;

/// Seed of negative sample generation.
///
/// Same 128-bit value and hex format as a game session seed.
pub type TrainingSeed = atlas_engine::SessionSeed;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TrainingDataError {
    #[display("no samples labeled '{label}'")]
    EmptyClass { label: Label },
    #[display("sample {text:?} is empty after normalization")]
    Unnormalizable { text: String },
    #[display("{canonical:?} is labeled both as a country and as not a country")]
    ConflictingLabels { canonical: String },
    #[display("invalid training configuration: {reason}")]
    InvalidConfig { reason: String },
}
