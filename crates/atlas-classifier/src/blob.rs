//! Exchange format of trained models.
//!
//! A [`ClassifierModelBlob`] is a UTF-8 JSON document holding
//! [`ModelParameters`]: format version, metadata, n-gram configuration,
//! vocabulary, IDF vector, per-class log-likelihood rows, class priors,
//! smoothing constant and default acceptance threshold.
//!
//! Loading is all-or-nothing. The version tag is checked before the rest of
//! the document is interpreted, then every field is validated by
//! [`ClassifierModel::from_parameters`].

use serde::Deserialize;

use crate::model::{ClassifierModel, ModelParameters};

/// Version written by this crate and the only one it reads.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum ModelFormatError {
    #[display("model data is malformed: {source}")]
    Malformed { source: serde_json::Error },
    #[display("unsupported model format version {found} (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },
    #[display("model data is inconsistent: {reason}")]
    Inconsistent { reason: String },
}

/// Serialized model bytes.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub struct ClassifierModelBlob(Vec<u8>);

impl ClassifierModelBlob {
    pub(crate) fn encode(parameters: &ModelParameters) -> Self {
        // Serializing plain data (string keys, finite floats, integers) into memory cannot fail.
        let bytes = serde_json::to_vec_pretty(parameters)
            .expect("model parameters should always serialize");
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Decodes and validates the model.
    pub fn load(&self) -> Result<ClassifierModel, ModelFormatError> {
        load_model(&self.0)
    }
}

impl AsRef<[u8]> for ClassifierModelBlob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Deserialize)]
struct VersionTag {
    format_version: u32,
}

/// Decodes a model from its serialized bytes.
///
/// Fails with [`ModelFormatError`] on truncated or corrupted data, on a
/// version mismatch, or when the decoded tables are inconsistent with each
/// other. No model is returned in any of those cases.
pub fn load_model<B>(blob: B) -> Result<ClassifierModel, ModelFormatError>
where
    B: AsRef<[u8]>,
{
    let bytes = blob.as_ref();
    let tag: VersionTag =
        serde_json::from_slice(bytes).map_err(|source| ModelFormatError::Malformed { source })?;
    if tag.format_version != FORMAT_VERSION {
        return Err(ModelFormatError::VersionMismatch {
            expected: FORMAT_VERSION,
            found: tag.format_version,
        });
    }

    let parameters: ModelParameters =
        serde_json::from_slice(bytes).map_err(|source| ModelFormatError::Malformed { source })?;
    let model = ClassifierModel::from_parameters(parameters)?;
    log::info!(
        "loaded classifier model: {} vocabulary tokens, trained at {}",
        model.vocabulary_size(),
        model.metadata().trained_at,
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use crate::{Classify as _, Label, model::tests::toy_parameters};

    use super::*;

    fn toy_blob() -> ClassifierModelBlob {
        ClassifierModel::from_parameters(toy_parameters())
            .unwrap()
            .to_blob()
    }

    #[test]
    fn test_saved_model_loads_with_same_verdicts() {
        let model = toy_blob().load().unwrap();
        assert_eq!(model.parameters(), &toy_parameters());
        assert_eq!(model.classify("niger").label(), Label::Country);
    }

    #[test]
    fn test_truncated_blob_is_malformed() {
        let bytes = toy_blob().into_bytes();
        for len in [0, 1, bytes.len() / 3, bytes.len() / 2, bytes.len() - 2] {
            let err = load_model(&bytes[..len]).unwrap_err();
            assert!(err.is_malformed(), "length {len}: {err}");
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(load_model(b"\x00\xffnot json").unwrap_err().is_malformed());
        assert!(load_model(b"[1, 2, 3]").unwrap_err().is_malformed());
        assert!(load_model(br#"{"format_version": 1}"#).unwrap_err().is_malformed());
    }

    #[test]
    fn test_version_is_checked_first() {
        let err = load_model(br#"{"format_version": 99, "other": "layout"}"#).unwrap_err();
        assert!(
            matches!(err, ModelFormatError::VersionMismatch { found: 99, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_tampered_values_are_inconsistent() {
        let mut document: serde_json::Value = serde_json::from_slice(toy_blob().as_bytes()).unwrap();
        document["idf"] = serde_json::json!([1.0, 1.0]);
        let bytes = serde_json::to_vec(&document).unwrap();
        assert!(load_model(bytes).unwrap_err().is_inconsistent());

        let mut document: serde_json::Value = serde_json::from_slice(toy_blob().as_bytes()).unwrap();
        document["log_priors"]["country"] = serde_json::json!(-5.0);
        let bytes = serde_json::to_vec(&document).unwrap();
        assert!(load_model(bytes).unwrap_err().is_inconsistent());
    }
}
