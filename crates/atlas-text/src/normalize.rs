//! Canonicalization of country names.
//!
//! [`normalize`] maps raw user input to the canonical form used for every
//! comparison in the game: history membership, starting-letter checks, catalog
//! lookups and classifier features.
//!
//! # Pipeline
//!
//! 1. Lowercase
//! 2. Replace every character that is not a letter with a space
//!    (`"Guinea-Bissau"` becomes `"guinea bissau"`)
//! 3. Collapse runs of whitespace into a single space
//! 4. Strip one leading qualifier phrase using the [`PrefixRule`] table
//! 5. Trim, and fail with [`NormalizationError`] if nothing is left
//!
//! # Prefix Rules
//!
//! Qualifiers are described as data ([`DEFAULT_PREFIX_RULES`]) rather than
//! conditionals. Rules are tried in order and only the first matching rule is
//! applied. A rule is skipped when its output would itself start with a
//! qualifier, so the result is always a fixed point:
//! `normalize(normalize(x)) == normalize(x)`.

use std::borrow::Cow;

/// Returned when the input has no letters left after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("input is empty after normalization")]
pub struct NormalizationError;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PrefixRuleError {
    #[display("prefix pattern must be lowercase words followed by a single space: {pattern:?}")]
    InvalidPattern { pattern: String },
    #[display("prefix replacement must be empty or lowercase words followed by a single space: {replacement:?}")]
    InvalidReplacement { replacement: String },
}

/// A leading qualifier and what it is rewritten to.
///
/// The pattern is matched against the start of an already collapsed string, so
/// it always ends with a space (`"the "` never matches inside `"thailand"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRule {
    pattern: Cow<'static, str>,
    replacement: Cow<'static, str>,
}

impl PrefixRule {
    /// A rule that removes `pattern`.
    ///
    /// Not validated; used for the built-in table, which is checked by tests.
    #[must_use]
    pub const fn strip(pattern: &'static str) -> Self {
        Self {
            pattern: Cow::Borrowed(pattern),
            replacement: Cow::Borrowed(""),
        }
    }

    /// A rule that replaces `pattern` with `replacement`.
    ///
    /// Not validated; used for the built-in table, which is checked by tests.
    #[must_use]
    pub const fn rewrite(pattern: &'static str, replacement: &'static str) -> Self {
        Self {
            pattern: Cow::Borrowed(pattern),
            replacement: Cow::Borrowed(replacement),
        }
    }

    /// Creates a validated rule.
    ///
    /// The pattern must be canonical words followed by one space. The
    /// replacement must be empty or follow the same shape, so rewriting never
    /// produces text that normalization would change again.
    pub fn new<P, R>(pattern: P, replacement: R) -> Result<Self, PrefixRuleError>
    where
        P: Into<String>,
        R: Into<String>,
    {
        let pattern = pattern.into();
        let replacement = replacement.into();
        if !is_rule_phrase(&pattern) {
            return Err(PrefixRuleError::InvalidPattern { pattern });
        }
        if !replacement.is_empty() && !is_rule_phrase(&replacement) {
            return Err(PrefixRuleError::InvalidReplacement { replacement });
        }
        Ok(Self {
            pattern: Cow::Owned(pattern),
            replacement: Cow::Owned(replacement),
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    fn apply(&self, text: &str) -> Option<String> {
        let rest = text.strip_prefix(&*self.pattern)?;
        Some(format!("{}{rest}", self.replacement))
    }
}

/// Leading qualifiers removed by [`normalize`], in priority order.
///
/// Longer phrases come before their own prefixes (`"the republic of the "`
/// before `"the "`), since only the first match is applied.
pub const DEFAULT_PREFIX_RULES: &[PrefixRule] = &[
    PrefixRule::strip("the republic of the "),
    PrefixRule::strip("the republic of "),
    PrefixRule::strip("republic of the "),
    PrefixRule::strip("republic of "),
    PrefixRule::strip("the kingdom of the "),
    PrefixRule::strip("the kingdom of "),
    PrefixRule::strip("kingdom of the "),
    PrefixRule::strip("kingdom of "),
    PrefixRule::strip("the united states of "),
    PrefixRule::strip("united states of "),
    PrefixRule::strip("the state of "),
    PrefixRule::strip("state of "),
    PrefixRule::rewrite("st ", "saint "),
    PrefixRule::strip("the "),
];

/// Normalizer with a configurable prefix rule table.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Cow<'static, [PrefixRule]>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            rules: Cow::Borrowed(DEFAULT_PREFIX_RULES),
        }
    }
}

impl Normalizer {
    #[must_use]
    pub fn with_rules(rules: Vec<PrefixRule>) -> Self {
        Self {
            rules: Cow::Owned(rules),
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[PrefixRule] {
        &self.rules
    }

    /// Produces the canonical form of `raw`.
    pub fn normalize(&self, raw: &str) -> Result<String, NormalizationError> {
        let cleaned = raw
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphabetic() { c } else { ' ' })
            .collect::<String>();
        let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        let stripped = self.strip_prefix(&collapsed).unwrap_or(collapsed);
        let canonical = stripped.trim();
        if canonical.is_empty() {
            return Err(NormalizationError);
        }
        Ok(canonical.to_owned())
    }

    fn strip_prefix(&self, text: &str) -> Option<String> {
        let rewritten = self.rules.iter().find_map(|rule| rule.apply(text))?;
        // Skip the rule if another one would fire on its output.
        if self.rules.iter().any(|rule| rewritten.starts_with(rule.pattern())) {
            return None;
        }
        Some(rewritten)
    }
}

/// Normalizes `raw` with [`DEFAULT_PREFIX_RULES`].
///
/// # Example
///
/// ```
/// use atlas_text::normalize;
///
/// assert_eq!(normalize("Guinea-Bissau").unwrap(), "guinea bissau");
/// assert_eq!(normalize("St. Lucia").unwrap(), "saint lucia");
/// assert!(normalize(" 42 !").is_err());
/// ```
pub fn normalize(raw: &str) -> Result<String, NormalizationError> {
    Normalizer::default().normalize(raw)
}

/// Returns `true` if `text` is already in canonical form.
#[must_use]
pub fn is_canonical(text: &str) -> bool {
    !text.is_empty()
        && !text.starts_with(' ')
        && !text.ends_with(' ')
        && !text.contains("  ")
        && text
            .chars()
            .all(|c| c == ' ' || (c.is_alphabetic() && c.to_lowercase().eq([c])))
}

fn is_rule_phrase(phrase: &str) -> bool {
    phrase
        .strip_suffix(' ')
        .is_some_and(is_canonical)
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _, seq::IndexedRandom as _};
    use rand_pcg::Pcg32;

    use super::*;

    mod pipeline {
        use super::*;

        #[test]
        fn test_lowercases_and_collapses() {
            assert_eq!(normalize("  FRANCE  ").unwrap(), "france");
            assert_eq!(normalize("New\t\tZealand").unwrap(), "new zealand");
        }

        #[test]
        fn test_punctuation_becomes_word_boundary() {
            assert_eq!(normalize("Timor-Leste").unwrap(), "timor leste");
            assert_eq!(normalize("Côte d'Ivoire").unwrap(), "côte d ivoire");
            assert_eq!(normalize("brazil!!!").unwrap(), "brazil");
        }

        #[test]
        fn test_digits_are_removed() {
            assert_eq!(normalize("chad 2024").unwrap(), "chad");
        }

        #[test]
        fn test_empty_results_fail() {
            for raw in ["", "   ", "123", "?!-", "\n\t"] {
                assert_eq!(normalize(raw), Err(NormalizationError), "input {raw:?}");
            }
        }
    }

    mod prefix_rules {
        use super::*;

        #[test]
        fn test_strips_leading_qualifiers() {
            assert_eq!(normalize("The Gambia").unwrap(), "gambia");
            assert_eq!(normalize("Republic of Korea").unwrap(), "korea");
            assert_eq!(normalize("the Republic of the Congo").unwrap(), "congo");
            assert_eq!(normalize("Kingdom of Spain").unwrap(), "spain");
            assert_eq!(normalize("United States of America").unwrap(), "america");
        }

        #[test]
        fn test_rewrites_abbreviation() {
            assert_eq!(normalize("St Kitts and Nevis").unwrap(), "saint kitts and nevis");
        }

        #[test]
        fn test_qualifier_inside_word_is_kept() {
            assert_eq!(normalize("Thailand").unwrap(), "thailand");
            assert_eq!(normalize("Theland").unwrap(), "theland");
            assert_eq!(normalize("United States").unwrap(), "united states");
        }

        #[test]
        fn test_bare_qualifier_is_kept() {
            assert_eq!(normalize("The").unwrap(), "the");
            assert_eq!(normalize("republic of").unwrap(), "republic of");
        }

        #[test]
        fn test_only_first_rule_applies() {
            // Stripping "the " would leave "the france", which is not a fixed point.
            assert_eq!(normalize("the the france").unwrap(), "the the france");
        }

        #[test]
        fn test_default_rules_are_valid() {
            for rule in DEFAULT_PREFIX_RULES {
                let validated = PrefixRule::new(rule.pattern(), rule.replacement());
                assert_eq!(validated.as_ref(), Ok(rule), "rule {rule:?}");
            }
        }

        #[test]
        fn test_longer_patterns_come_first() {
            for (i, earlier) in DEFAULT_PREFIX_RULES.iter().enumerate() {
                for later in &DEFAULT_PREFIX_RULES[i + 1..] {
                    assert!(
                        !later.pattern().starts_with(earlier.pattern()),
                        "{:?} is shadowed by {:?}",
                        later.pattern(),
                        earlier.pattern()
                    );
                }
            }
        }

        #[test]
        fn test_invalid_rules_are_rejected() {
            assert!(PrefixRule::new("the", "").is_err());
            assert!(PrefixRule::new("The ", "").is_err());
            assert!(PrefixRule::new("the  ", "").is_err());
            assert!(PrefixRule::new("st ", "saint").is_err());
            assert!(PrefixRule::new("st. ", "saint ").is_err());
        }

        #[test]
        fn test_custom_rule_table() {
            let normalizer = Normalizer::with_rules(vec![
                PrefixRule::new("la ", "").unwrap(),
                PrefixRule::new("rep ", "republic ").unwrap(),
            ]);
            assert_eq!(normalizer.normalize("La France").unwrap(), "france");
            assert_eq!(normalizer.normalize("Rep Czech").unwrap(), "republic czech");
            assert_eq!(normalizer.normalize("The Gambia").unwrap(), "the gambia");
        }
    }

    mod idempotence {
        use super::*;

        const FRAGMENTS: &[&str] = &[
            "the", "The", "republic", "of", "kingdom", "united", "states", "state", "st", "st.",
            "saint", "france", "Congo", "-", "  ", "'", "9", "Ω", "Straße", "İstanbul", "ΑΣ",
        ];

        #[test]
        fn test_known_inputs() {
            for raw in [
                "The Republic of the Congo",
                "the the france",
                "St. st. Lucia",
                "state of the union",
                "the St Lucia",
                "ΑΣ1Β",
                "İ",
            ] {
                let once = normalize(raw).unwrap();
                assert_eq!(normalize(&once).unwrap(), once, "input {raw:?}");
            }
        }

        #[test]
        fn test_random_fragment_sequences() {
            let mut rng = Pcg32::seed_from_u64(0x5eed);
            for _ in 0..2000 {
                let len = rng.random_range(1..=6);
                let raw = (0..len)
                    .map(|_| *FRAGMENTS.choose(&mut rng).unwrap())
                    .collect::<Vec<_>>()
                    .join(" ");
                let Ok(once) = normalize(&raw) else {
                    continue;
                };
                assert!(is_canonical(&once), "{once:?} from {raw:?}");
                assert_eq!(normalize(&once).unwrap(), once, "input {raw:?}");
            }
        }
    }
}
