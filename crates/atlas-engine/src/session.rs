use std::collections::HashSet;

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::SessionSeed;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Player {
    #[display("user")]
    User,
    #[display("computer")]
    Computer,
}

impl Player {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::User => Self::Computer,
            Self::Computer => Self::User,
        }
    }
}

/// Why a round ended.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum RoundOverReason {
    #[display("the computer has no country left to name")]
    ComputerExhausted,
    #[display("the user gave up")]
    UserForfeited,
}

impl RoundOverReason {
    #[must_use]
    pub const fn winner(self) -> Player {
        match self {
            Self::ComputerExhausted => Player::User,
            Self::UserForfeited => Player::Computer,
        }
    }
}

/// Position of a session in its lifecycle.
///
/// ```text
/// AwaitingUserTurn --(user country accepted)--> AwaitingComputerTurn
/// AwaitingComputerTurn --(computer picks)--> AwaitingUserTurn
/// AwaitingComputerTurn --(nothing left)--> RoundOver(ComputerExhausted)
/// AwaitingUserTurn --(forfeit)--> RoundOver(UserForfeited)
/// ```
///
/// `RoundOver` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum GameState {
    AwaitingUserTurn,
    AwaitingComputerTurn,
    RoundOver(RoundOverReason),
}

impl GameState {
    /// The player expected to move, or `None` once the round is over.
    #[must_use]
    pub const fn turn(self) -> Option<Player> {
        match self {
            Self::AwaitingUserTurn => Some(Player::User),
            Self::AwaitingComputerTurn => Some(Player::Computer),
            Self::RoundOver(_) => None,
        }
    }

    #[must_use]
    pub const fn status(self) -> SessionStatus {
        match self {
            Self::AwaitingUserTurn | Self::AwaitingComputerTurn => SessionStatus::InProgress,
            Self::RoundOver(_) => SessionStatus::RoundOver,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    RoundOver,
}

/// Ordered record of accepted canonical names with O(1) membership checks.
#[derive(Debug, Clone, Default)]
pub struct History {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl History {
    #[must_use]
    pub fn contains(&self, canonical: &str) -> bool {
        self.seen.contains(canonical)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Appends `canonical`, returning `false` (and leaving the history
    /// unchanged) if it was already used.
    pub(crate) fn insert(&mut self, canonical: String) -> bool {
        if self.seen.contains(&canonical) {
            return false;
        }
        self.seen.insert(canonical.clone());
        self.order.push(canonical);
        true
    }
}

/// One round of the game.
///
/// A session only holds state. Moves are made through [`crate::Game`], which
/// validates them against the catalog and classifier before calling the
/// crate-private mutators here.
///
/// Every accepted name, whoever played it, is in [`Self::history`] exactly
/// once and starts with [`Self::letter`].
#[derive(Debug, Clone)]
pub struct GameSession {
    letter: char,
    seed: SessionSeed,
    rng: Pcg32,
    state: GameState,
    history: History,
}

impl GameSession {
    /// Starts a round on a given letter, with the user to move.
    ///
    /// Usually sessions are created by [`crate::Game::new_session`], which
    /// picks a letter the catalog can support. This constructor is for replays
    /// and tests that need a specific letter.
    #[must_use]
    pub fn with_letter(letter: char, seed: SessionSeed) -> Self {
        Self::from_parts(letter, seed, seed.rng())
    }

    pub(crate) fn from_parts(letter: char, seed: SessionSeed, rng: Pcg32) -> Self {
        let letter = letter.to_lowercase().next().unwrap_or(letter);
        Self {
            letter,
            seed,
            rng,
            state: GameState::AwaitingUserTurn,
            history: History::default(),
        }
    }

    /// Starting letter, lowercase.
    #[must_use]
    pub fn letter(&self) -> char {
        self.letter
    }

    #[must_use]
    pub fn seed(&self) -> SessionSeed {
        self.seed
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Number of accepted moves by either player.
    #[must_use]
    pub fn accepted_turns(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            letter: self.letter,
            seed: self.seed,
            state: self.state,
            accepted_turns: self.accepted_turns(),
            history: self.history.as_slice().to_vec(),
        }
    }

    pub(crate) fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub(crate) fn history_and_rng(&mut self) -> (&History, &mut Pcg32) {
        (&self.history, &mut self.rng)
    }

    /// Records an accepted move and passes the turn.
    ///
    /// Callers check the state, the letter and the history first.
    pub(crate) fn record_move(&mut self, player: Player, canonical: String) {
        debug_assert_eq!(self.state.turn(), Some(player));
        debug_assert!(canonical.starts_with(self.letter));
        let inserted = self.history.insert(canonical);
        debug_assert!(inserted, "duplicate move recorded");
        self.state = match player.opponent() {
            Player::User => GameState::AwaitingUserTurn,
            Player::Computer => GameState::AwaitingComputerTurn,
        };
    }

    pub(crate) fn finish(&mut self, reason: RoundOverReason) {
        self.state = GameState::RoundOver(reason);
    }
}

/// Serializable view of a session, for callers that store or display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub letter: char,
    pub seed: SessionSeed,
    pub state: GameState,
    pub accepted_turns: usize,
    pub history: Vec<String>,
}
