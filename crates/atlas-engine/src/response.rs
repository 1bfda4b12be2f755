//! Player-facing wording.
//!
//! Acknowledgements and computer moves rotate between a few phrasings chosen
//! with the session's random source. Rejections and round endings have fixed
//! wording.

use rand::{Rng, seq::IndexedRandom as _};

use crate::{RejectionReason, RoundOverReason};

const ACKNOWLEDGEMENTS: &[&str] = &[
    "Nice one, {country}!",
    "{country}, good choice.",
    "{country} it is.",
    "Correct, {country} counts.",
    "Well played, {country} is accepted.",
];

const COMPUTER_MOVES: &[&str] = &[
    "I choose {country}. Your turn!",
    "My pick is {country}. Over to you.",
    "How about {country}? Your move.",
    "{country}! Your turn.",
];

fn fill<R>(templates: &[&str], country: &str, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let template = templates.choose(rng).copied().unwrap_or("{country}");
    template.replace("{country}", country)
}

pub(crate) fn opening(letter: char) -> String {
    format!(
        "Let's play! Name a country that starts with '{}'.",
        letter.to_ascii_uppercase()
    )
}

pub(crate) fn acknowledgement<R>(display_name: &str, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    fill(ACKNOWLEDGEMENTS, display_name, rng)
}

pub(crate) fn computer_move<R>(display_name: &str, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    fill(COMPUTER_MOVES, display_name, rng)
}

pub(crate) fn rejection(reason: RejectionReason, input: &str, letter: char) -> String {
    let input = input.trim();
    let letter = letter.to_ascii_uppercase();
    match reason {
        RejectionReason::WrongState => "It's not your turn right now.".to_owned(),
        RejectionReason::InvalidInput => "Please type the name of a country.".to_owned(),
        RejectionReason::WrongStartingLetter => {
            format!("'{input}' doesn't start with '{letter}'. Try again.")
        }
        RejectionReason::DuplicateCountry => {
            format!("'{input}' has already been named this round. Try another one.")
        }
        RejectionReason::ClassificationLowConfidence => {
            format!("I don't recognize '{input}' as a country. Try again.")
        }
        RejectionReason::UnknownCountry => {
            format!("'{input}' isn't on my list of countries. Try again.")
        }
    }
}

pub(crate) fn round_over(reason: RoundOverReason, letter: char) -> String {
    match reason {
        RoundOverReason::ComputerExhausted => format!(
            "I can't think of another country starting with '{}'. You win!",
            letter.to_ascii_uppercase()
        ),
        RoundOverReason::UserForfeited => "You gave up. I win this round!".to_owned(),
    }
}

pub(crate) fn already_over() -> String {
    "This round is over. Start a new game to play again.".to_owned()
}

/// Capitalizes each word of a canonical name: `"costa rica"` becomes
/// `"Costa Rica"`.
#[must_use]
pub fn title_case(canonical: &str) -> String {
    canonical
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
