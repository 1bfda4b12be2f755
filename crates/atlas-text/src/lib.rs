//! Text canonicalization and tokenization for country names.
//!
//! Everything that compares, classifies or stores a country name goes through
//! this crate first:
//!
//! - [`normalize`] - Turns raw user input into a *canonical form* (lowercase
//!   letters separated by single spaces, leading qualifiers such as "the" or
//!   "republic of" removed)
//! - [`ngram`] - Splits a canonical form into word (and optionally character)
//!   n-grams used as classifier features
//!
//! # Example
//!
//! ```
//! use atlas_text::{ngram::NgramConfig, normalize};
//!
//! let canonical = normalize::normalize("  The Republic of  Korea! ").unwrap();
//! assert_eq!(canonical, "korea");
//!
//! let grams = NgramConfig::default().ngrams("costa rica");
//! assert_eq!(grams, ["costa", "rica", "costa rica"]);
//! ```

pub use self::normalize::{NormalizationError, Normalizer, PrefixRule, normalize};

pub mod ngram;
pub mod normalize;
