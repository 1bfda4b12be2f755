//! N-gram tokenization of canonical text.
//!
//! Features are contiguous runs of words (`"costa"`, `"costa rica"`) and,
//! optionally, contiguous runs of characters inside a word boundary
//! (`"#co"`, `"#ost"`). Character n-grams are prefixed with
//! [`CHAR_GRAM_MARKER`] so they never collide with a word n-gram.

use serde::{Deserialize, Serialize};

/// Prefix of every character n-gram.
///
/// Canonical text only contains letters and spaces, so no word n-gram can
/// start with it.
pub const CHAR_GRAM_MARKER: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid n-gram range {min}..={max}")]
pub struct NgramRangeError {
    pub min: usize,
    pub max: usize,
}

/// Inclusive range of n-gram lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramRange {
    pub min: usize,
    pub max: usize,
}

impl NgramRange {
    pub fn new(min: usize, max: usize) -> Result<Self, NgramRangeError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), NgramRangeError> {
        if self.min == 0 || self.min > self.max {
            return Err(NgramRangeError {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn lengths(self) -> impl Iterator<Item = usize> {
        self.min..=self.max
    }
}

/// Which n-grams are extracted from a canonical string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NgramConfig {
    /// Word n-gram lengths. Unigrams and bigrams by default.
    pub words: NgramRange,
    /// Character n-gram lengths inside word boundaries, if enabled.
    pub chars: Option<NgramRange>,
}

impl Default for NgramConfig {
    fn default() -> Self {
        Self {
            words: NgramRange { min: 1, max: 2 },
            chars: None,
        }
    }
}

impl NgramConfig {
    pub fn validate(&self) -> Result<(), NgramRangeError> {
        self.words.validate()?;
        if let Some(chars) = &self.chars {
            chars.validate()?;
        }
        Ok(())
    }

    /// Returns every n-gram of `canonical`, shortest word n-grams first.
    ///
    /// Repeated n-grams are kept; callers count them as term frequency.
    ///
    /// # Example
    ///
    /// ```
    /// use atlas_text::ngram::{NgramConfig, NgramRange};
    ///
    /// let config = NgramConfig {
    ///     words: NgramRange::new(1, 1).unwrap(),
    ///     chars: Some(NgramRange::new(3, 3).unwrap()),
    /// };
    /// assert_eq!(config.ngrams("chad"), ["chad", "# ch", "#cha", "#had", "#ad "]);
    /// ```
    #[must_use]
    pub fn ngrams(&self, canonical: &str) -> Vec<String> {
        let words = canonical.split_whitespace().collect::<Vec<_>>();
        let mut grams = Vec::new();

        for n in self.words.lengths() {
            grams.extend(words.windows(n).map(|window| window.join(" ")));
        }

        if let Some(chars) = self.chars {
            for word in &words {
                let padded = format!(" {word} ").chars().collect::<Vec<_>>();
                for n in chars.lengths() {
                    grams.extend(padded.windows(n).map(|window| {
                        let mut gram = String::with_capacity(n + 1);
                        gram.push(CHAR_GRAM_MARKER);
                        gram.extend(window);
                        gram
                    }));
                }
            }
        }

        grams
    }
}
