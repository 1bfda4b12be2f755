//! Generation of not-a-country samples.
//!
//! Four sources, so the classifier sees plausible words, noise and parts of
//! real names:
//!
//! - **Common words** - everyday vocabulary from [`COMMON_WORDS`]
//! - **Random strings** - letters drawn uniformly, lengths drawn from a normal
//!   distribution around a typical country name length
//! - **Misspellings** - near misses of real names (two letters swapped, one
//!   dropped, doubled or substituted)
//! - **Name fragments** - words shared by several country names and bare
//!   qualifiers (`"south"`, `"islands"`, `"republic of"`, see [`name_fragments`])
//!
//! Every candidate is normalized, and candidates equal to a positive sample's
//! canonical form are discarded, as are duplicates.

use std::collections::{BTreeSet, HashMap, HashSet};

use atlas_engine::CountryCatalog;
use atlas_text::{
    Normalizer, normalize,
    ngram::{NgramConfig, NgramRange},
};
use rand::{Rng, distr::Distribution as _, seq::IndexedRandom as _};
use rand_distr::Normal;

use crate::NegativeConfig;

/// Everyday words that are not country names or aliases.
pub const COMMON_WORDS: &[&str] = &[
    "table", "chair", "window", "water", "bread", "apple", "banana", "orange", "pizza", "coffee",
    "music", "garden", "river", "mountain", "ocean", "forest", "desert", "island", "city",
    "village", "street", "bridge", "tower", "castle", "school", "farmer", "student", "doctor",
    "hospital", "market", "money", "book", "pencil", "paper", "letter", "phone", "computer",
    "keyboard", "mouse", "screen", "camera", "picture", "movie", "story", "dream", "night",
    "morning", "evening", "summer", "winter", "spring", "autumn", "rain", "snow", "cloud",
    "storm", "thunder", "sunshine", "flower", "tree", "grass", "stone", "sand", "fire", "ice",
    "wind", "bird", "horse", "tiger", "lion", "elephant", "rabbit", "turtle", "dolphin", "whale",
    "eagle", "spider", "butter", "cheese", "sugar", "salt", "pepper", "honey", "milk", "juice",
    "soup", "salad", "rice", "pasta", "noodle", "cookie", "candle", "lamp", "door", "floor",
    "roof", "kitchen", "bottle", "glass", "plate", "spoon", "fork", "knife", "shirt", "jacket",
    "shoe", "hat", "button", "pocket", "blanket", "pillow", "mirror", "clock", "watch", "engine",
    "wheel", "bicycle", "car", "train", "plane", "boat", "rocket", "planet", "star", "moon",
    "galaxy", "friend", "family", "mother", "father", "brother", "sister", "happy", "quickly",
    "yellow", "purple", "silver", "golden", "bright", "simple", "strong", "gentle", "football",
    "tennis", "guitar", "piano", "violin", "drum", "painting", "science", "history", "language",
    "number", "question", "answer", "kingdom", "republic", "nation", "country", "state",
    "capital", "border", "continent", "hello", "goodbye", "nothing", "something",
];

/// Shortest and longest random string.
const RANDOM_LENGTH_BOUNDS: (f64, f64) = (3.0, 20.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Misspelling {
    Swap,
    Drop,
    Double,
    Substitute,
}

const MISSPELLINGS: [Misspelling; 4] = [
    Misspelling::Swap,
    Misspelling::Drop,
    Misspelling::Double,
    Misspelling::Substitute,
];

/// Collects candidates, skipping collisions with positives and repeats.
struct NegativeSet<'a> {
    positives: &'a HashSet<String>,
    seen: HashSet<String>,
    samples: Vec<String>,
}

impl<'a> NegativeSet<'a> {
    fn new(positives: &'a HashSet<String>) -> Self {
        Self {
            positives,
            seen: HashSet::new(),
            samples: Vec::new(),
        }
    }

    fn offer(&mut self, candidate: &str) {
        let Ok(canonical) = normalize(candidate) else {
            return;
        };
        if self.positives.contains(&canonical) || !self.seen.insert(canonical.clone()) {
            return;
        }
        self.samples.push(canonical);
    }
}

/// Words and word pairs found in the names of at least two countries, plus
/// the leading qualifiers stripped by the default [`Normalizer`].
///
/// A fragment is left out when any run of its words is a country name or
/// alias, so the qualifier `"united states of"` never shows up. The result is
/// sorted and canonical.
///
/// ```
/// use atlas_engine::CountryCatalog;
/// use atlas_training::negative::name_fragments;
///
/// let fragments = name_fragments(&CountryCatalog::builtin());
/// assert!(fragments.iter().any(|f| f == "south"));
/// assert!(fragments.iter().any(|f| f == "republic of"));
/// assert!(!fragments.iter().any(|f| f == "guinea"));
/// ```
#[must_use]
pub fn name_fragments(catalog: &CountryCatalog) -> Vec<String> {
    let parts = NgramConfig {
        words: NgramRange { min: 1, max: 2 },
        chars: None,
    };
    let mut countries_per_part = HashMap::<String, usize>::new();
    for country in catalog.countries() {
        let country_parts = std::iter::once(country.canonical())
            .chain(country.aliases().iter().map(String::as_str))
            .flat_map(|name| parts.ngrams(name))
            .collect::<HashSet<_>>();
        for part in country_parts {
            *countries_per_part.entry(part).or_default() += 1;
        }
    }

    let shared = countries_per_part
        .into_iter()
        .filter(|&(_, countries)| countries >= 2)
        .map(|(part, _)| part);
    let qualifiers = Normalizer::default()
        .rules()
        .iter()
        .filter_map(|rule| normalize(rule.pattern()).ok())
        .collect::<Vec<_>>();

    shared
        .chain(qualifiers)
        .filter(|fragment| {
            word_runs(fragment)
                .iter()
                .all(|run| catalog.get(run).is_none())
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Every contiguous run of words in `text`.
fn word_runs(text: &str) -> Vec<String> {
    let words = text.split_whitespace().collect::<Vec<_>>();
    (1..=words.len())
        .flat_map(|n| words.windows(n).map(|run| run.join(" ")))
        .collect()
}

/// Generates canonical negative samples for the given positive canonical forms.
///
/// `fragments` are offered as they are when [`NegativeConfig::name_fragments`]
/// is set (see [`name_fragments`]).
///
/// The result never contains one of `positives`, and has no duplicates.
/// Misspellings are derived from `positives` in their iteration order, so the
/// output only depends on the inputs and the state of `rng`.
///
/// # Panics
///
/// Panics if `config` does not pass [`NegativeConfig::validate`].
pub fn generate_negatives<R>(
    positives: &[String],
    fragments: &[String],
    config: &NegativeConfig,
    rng: &mut R,
) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let positive_set = positives.iter().cloned().collect::<HashSet<_>>();
    let mut negatives = NegativeSet::new(&positive_set);

    let words = config.common_words.min(COMMON_WORDS.len());
    for word in COMMON_WORDS.choose_multiple(rng, words) {
        negatives.offer(word);
    }

    let lengths = Normal::new(config.random_length_mean, config.random_length_std_dev)
        .expect("random string length distribution should be validated");
    for _ in 0..config.random_strings {
        let length = random_length(&lengths, rng);
        negatives.offer(&random_string(length, rng));
    }

    for positive in positives {
        for _ in 0..config.misspellings_per_name {
            if let Some(misspelled) = misspell(positive, rng) {
                negatives.offer(&misspelled);
            }
        }
    }

    if config.name_fragments {
        for fragment in fragments {
            negatives.offer(fragment);
        }
    }

    log::debug!(
        "generated {} negative samples for {} positives",
        negatives.samples.len(),
        positives.len()
    );
    negatives.samples
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn random_length<R>(lengths: &Normal<f64>, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let (min, max) = RANDOM_LENGTH_BOUNDS;
    lengths.sample(rng).round().clamp(min, max) as usize
}

fn random_letter<R>(rng: &mut R) -> char
where
    R: Rng + ?Sized,
{
    char::from(rng.random_range(b'a'..=b'z'))
}

fn random_string<R>(length: usize, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    (0..length).map(|_| random_letter(rng)).collect()
}

/// Applies one random edit to a letter of `name`.
///
/// Returns `None` when the chosen edit is impossible (a swap in a name without
/// two adjacent letters, or dropping the only letter).
fn misspell<R>(name: &str, rng: &mut R) -> Option<String>
where
    R: Rng + ?Sized,
{
    let mut chars = name.chars().collect::<Vec<_>>();
    let letters = (0..chars.len())
        .filter(|&i| chars[i].is_alphabetic())
        .collect::<Vec<_>>();
    let &position = letters.choose(rng)?;

    match *MISSPELLINGS.choose(rng)? {
        Misspelling::Swap => {
            let pairs = (0..chars.len().saturating_sub(1))
                .filter(|&i| chars[i].is_alphabetic() && chars[i + 1].is_alphabetic())
                .collect::<Vec<_>>();
            let &i = pairs.choose(rng)?;
            chars.swap(i, i + 1);
        }
        Misspelling::Drop => {
            if letters.len() < 2 {
                return None;
            }
            chars.remove(position);
        }
        Misspelling::Double => {
            chars.insert(position, chars[position]);
        }
        Misspelling::Substitute => {
            let original = chars[position];
            let mut letter = random_letter(rng);
            while letter == original {
                letter = random_letter(rng);
            }
            chars[position] = letter;
        }
    }
    Some(chars.into_iter().collect())
}
