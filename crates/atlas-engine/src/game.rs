use std::sync::Arc;

use atlas_classifier::{ClassificationResult, Classify};
use atlas_text::Normalizer;
use rand::{Rng as _, seq::IndexedRandom as _};
use serde::Serialize;

use crate::{
    CountryCatalog, GameConfig, SessionSeed,
    catalog::first_letter,
    player::ComputerPlayer,
    response,
    session::{GameSession, GameState, Player, RoundOverReason},
};

/// Why a move was refused. A refused move never changes the session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    #[display("not this player's turn")]
    WrongState,
    #[display("input has no letters")]
    InvalidInput,
    #[display("wrong starting letter")]
    WrongStartingLetter,
    #[display("country already used")]
    DuplicateCountry,
    #[display("not recognized as a country")]
    ClassificationLowConfidence,
    #[display("not in the country catalog")]
    UnknownCountry,
}

#[derive(Debug, Clone, PartialEq, Serialize, derive_more::IsVariant)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    Accepted {
        player: Player,
        /// Canonical form recorded in the history.
        country: String,
        display_name: String,
    },
    Rejected {
        reason: RejectionReason,
        /// Present when the classifier was consulted.
        classification: Option<ClassificationResult>,
    },
    RoundOver {
        reason: RoundOverReason,
        winner: Player,
    },
}

/// Result of one game operation: what happened and what to tell the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResult {
    #[serde(flatten)]
    pub outcome: TurnOutcome,
    pub message: String,
}

impl TurnResult {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.outcome.is_accepted()
    }

    #[must_use]
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match self.outcome {
            TurnOutcome::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NewSessionError {
    #[display("no letter starts at least {min} catalog countries")]
    NoEligibleLetter { min: usize },
}

/// The game rules: validates user answers, plays the computer's turns and
/// drives sessions through their [`GameState`]s.
///
/// A `Game` is immutable and can be shared between threads. All per-round
/// state lives in [`GameSession`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use atlas_classifier::{ClassificationResult, Classify, Label};
/// use atlas_engine::{CountryCatalog, Game, GameConfig, GameSession, SessionSeed};
///
/// #[derive(Debug)]
/// struct TrustEveryone;
///
/// impl Classify for TrustEveryone {
///     fn classify_canonical(&self, _: &str) -> ClassificationResult {
///         ClassificationResult::certain(Label::Country)
///     }
/// }
///
/// let game = Game::new(
///     Arc::new(TrustEveryone),
///     Arc::new(CountryCatalog::builtin()),
///     GameConfig::default(),
/// );
/// let mut session = GameSession::with_letter('b', SessionSeed::from_u64(1));
///
/// assert!(game.submit_user_turn(&mut session, "Brazil").is_accepted());
/// assert!(game.computer_turn(&mut session).is_accepted());
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    classifier: Arc<dyn Classify>,
    catalog: Arc<CountryCatalog>,
    normalizer: Normalizer,
    config: GameConfig,
}

impl Game {
    #[must_use]
    pub fn new(
        classifier: Arc<dyn Classify>,
        catalog: Arc<CountryCatalog>,
        config: GameConfig,
    ) -> Self {
        Self {
            classifier,
            catalog,
            normalizer: Normalizer::default(),
            config,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &CountryCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Starts a round on a random letter.
    ///
    /// Without a seed a fresh one is drawn from the thread-local generator.
    /// The letter is the first value drawn from the session's generator, and
    /// only letters starting at least `min_countries_per_letter` catalog
    /// countries are eligible.
    pub fn new_session(&self, seed: Option<SessionSeed>) -> Result<GameSession, NewSessionError> {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = seed.rng();
        let min = self.config.min_countries_per_letter;
        let letters = self.catalog.letters_with_at_least(min);
        let letter = *letters
            .choose(&mut rng)
            .ok_or(NewSessionError::NoEligibleLetter { min })?;
        log::debug!("new session {seed} on letter {letter:?}");
        Ok(GameSession::from_parts(letter, seed, rng))
    }

    /// Greeting announcing the session's letter.
    #[must_use]
    pub fn opening_message(&self, session: &GameSession) -> String {
        response::opening(session.letter())
    }

    /// Validates and records the user's answer.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    ///
    /// 1. It must be the user's turn ([`RejectionReason::WrongState`])
    /// 2. The input must normalize to something ([`RejectionReason::InvalidInput`])
    /// 3. The canonical form of what was typed must start with the session
    ///    letter ([`RejectionReason::WrongStartingLetter`])
    /// 4. It must not be in the history ([`RejectionReason::DuplicateCountry`])
    /// 5. The classifier must accept it with at least the configured confidence
    ///    ([`RejectionReason::ClassificationLowConfidence`])
    /// 6. With `require_catalog_match`, the catalog must know it
    ///    ([`RejectionReason::UnknownCountry`])
    ///
    /// The letter check looks at the typed name, so `"Burma"` counts for 'b'.
    /// Aliases are then resolved through the catalog: the duplicate check and
    /// the history see `"burma"` as `"myanmar"` and `"usa"` as `"united states"`.
    pub fn submit_user_turn(&self, session: &mut GameSession, raw: &str) -> TurnResult {
        match session.state() {
            GameState::AwaitingUserTurn => {}
            GameState::AwaitingComputerTurn => {
                return reject(session, RejectionReason::WrongState, raw, None);
            }
            GameState::RoundOver(_) => return already_over(),
        }

        let Ok(typed) = self.normalizer.normalize(raw) else {
            return reject(session, RejectionReason::InvalidInput, raw, None);
        };
        if first_letter(&typed) != session.letter() {
            return reject(session, RejectionReason::WrongStartingLetter, raw, None);
        }

        let known = self.catalog.get(&typed);
        let canonical = known.map_or(typed.as_str(), |country| country.canonical());
        if session.history().contains(canonical) {
            return reject(session, RejectionReason::DuplicateCountry, raw, None);
        }

        let classification = self.classifier.classify_canonical(&typed);
        log::debug!(
            "classified {typed:?} as {} ({:.3})",
            classification.label(),
            classification.confidence()
        );
        if !classification.is_confident_country(self.config.acceptance_threshold) {
            return reject(
                session,
                RejectionReason::ClassificationLowConfidence,
                raw,
                Some(classification),
            );
        }
        if self.config.require_catalog_match && known.is_none() {
            return reject(
                session,
                RejectionReason::UnknownCountry,
                raw,
                Some(classification),
            );
        }

        let canonical = canonical.to_owned();
        let display_name = known.map_or_else(
            || response::title_case(&canonical),
            |country| country.name().to_owned(),
        );
        session.record_move(Player::User, canonical.clone());
        log::debug!("user played {canonical:?}");
        let message = response::acknowledgement(&display_name, session.rng());
        TurnResult {
            outcome: TurnOutcome::Accepted {
                player: Player::User,
                country: canonical,
                display_name,
            },
            message,
        }
    }

    /// Plays the computer's move, or ends the round in the user's favor when
    /// no unused country with the session letter remains.
    pub fn computer_turn(&self, session: &mut GameSession) -> TurnResult {
        match session.state() {
            GameState::AwaitingComputerTurn => {}
            GameState::AwaitingUserTurn => {
                return TurnResult {
                    outcome: TurnOutcome::Rejected {
                        reason: RejectionReason::WrongState,
                        classification: None,
                    },
                    message: "Waiting for your answer.".to_owned(),
                };
            }
            GameState::RoundOver(_) => return already_over(),
        }

        let letter = session.letter();
        let pick = {
            let (history, rng) = session.history_and_rng();
            ComputerPlayer::new(&self.catalog).pick(letter, history, rng)
        };
        let Some(country) = pick else {
            log::debug!("computer exhausted letter {letter:?}");
            return finish(session, RoundOverReason::ComputerExhausted);
        };

        session.record_move(Player::Computer, country.canonical().to_owned());
        log::debug!("computer played {:?}", country.canonical());
        let message = response::computer_move(country.name(), session.rng());
        TurnResult {
            outcome: TurnOutcome::Accepted {
                player: Player::Computer,
                country: country.canonical().to_owned(),
                display_name: country.name().to_owned(),
            },
            message,
        }
    }

    /// Ends the round in the computer's favor. Only allowed on the user's turn.
    pub fn forfeit(&self, session: &mut GameSession) -> TurnResult {
        match session.state() {
            GameState::AwaitingUserTurn => finish(session, RoundOverReason::UserForfeited),
            GameState::AwaitingComputerTurn => {
                reject(session, RejectionReason::WrongState, "", None)
            }
            GameState::RoundOver(_) => already_over(),
        }
    }
}

fn reject(
    session: &GameSession,
    reason: RejectionReason,
    raw: &str,
    classification: Option<ClassificationResult>,
) -> TurnResult {
    log::debug!("rejected {raw:?}: {reason}");
    TurnResult {
        outcome: TurnOutcome::Rejected {
            reason,
            classification,
        },
        message: response::rejection(reason, raw, session.letter()),
    }
}

fn already_over() -> TurnResult {
    TurnResult {
        outcome: TurnOutcome::Rejected {
            reason: RejectionReason::WrongState,
            classification: None,
        },
        message: response::already_over(),
    }
}

fn finish(session: &mut GameSession, reason: RoundOverReason) -> TurnResult {
    session.finish(reason);
    TurnResult {
        outcome: TurnOutcome::RoundOver {
            reason,
            winner: reason.winner(),
        },
        message: response::round_over(reason, session.letter()),
    }
}
