//! Country / not-country text classifier.
//!
//! This crate implements the inference side of the validation pipeline:
//!
//! ```text
//! raw text
//!     ↓ atlas_text::normalize
//! canonical form
//!     ↓ FeatureExtractor (n-grams × IDF, L2-normalized)
//! sparse feature vector
//!     ↓ ClassifierModel (multinomial naive Bayes, log space)
//! ClassificationResult { label, confidence }
//! ```
//!
//! Models are produced offline by `atlas-training` and exchanged as a
//! [`ClassifierModelBlob`]. [`load_model`] either returns a fully validated
//! [`ClassifierModel`] or a [`ModelFormatError`]; there is no partially loaded
//! state.
//!
//! A loaded model is immutable. Share it between sessions and threads behind an
//! `Arc`; [`Classify`] is the seam the game engine depends on, so tests can
//! substitute their own classifier.
//!
//! # Example
//!
//! ```rust,no_run
//! use atlas_classifier::{Classify as _, Label, load_model};
//!
//! let blob = std::fs::read("models/classifier.json")?;
//! let model = load_model(&blob)?;
//!
//! let result = model.classify("France");
//! if result.label() == Label::Country && result.confidence() >= model.acceptance_threshold() {
//!     println!("accepted");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;

use atlas_text::normalize;

pub use self::{
    blob::{ClassifierModelBlob, FORMAT_VERSION, ModelFormatError, load_model},
    features::{FeatureExtractor, FeatureVector},
    label::{ClassificationResult, Label, PerLabel},
    model::{ClassifierModel, ModelMetadata, ModelParameters},
};

pub mod blob;
pub mod features;
pub mod label;
pub mod model;

/// Something that can tell country names from other text.
pub trait Classify: fmt::Debug + Send + Sync {
    /// Classifies text that is already in canonical form.
    fn classify_canonical(&self, canonical: &str) -> ClassificationResult;

    /// Normalizes `text` and classifies it.
    ///
    /// Text with nothing left after normalization cannot be a country name and
    /// is reported as [`Label::NotCountry`] with full confidence.
    fn classify(&self, text: &str) -> ClassificationResult {
        match normalize(text) {
            Ok(canonical) => self.classify_canonical(&canonical),
            Err(_) => ClassificationResult::certain(Label::NotCountry),
        }
    }
}
