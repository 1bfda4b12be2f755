//! Turn-based country naming game.
//!
//! A round is dealt a starting letter. The user and the computer take turns
//! naming countries that start with it, and no country may be named twice.
//! User answers are checked by a [`Classify`](atlas_classifier::Classify)
//! implementation; the computer picks from a [`CountryCatalog`]. The round
//! ends when the computer has nothing left to name or the user forfeits.
//!
//! # Architecture
//!
//! - [`Game`]: immutable rules plus shared classifier and catalog, safe to
//!   share between threads
//! - [`GameSession`]: state of one round (letter, history, turn, random source)
//! - [`SessionRegistry`]: concurrent map from [`SessionId`] to sessions
//! - [`ComputerPlayer`]: the computer's uniform pick among unused countries
//!
//! Every random choice of a session (letter, computer picks, wording) comes
//! from one generator seeded by its [`SessionSeed`].

pub use self::{
    catalog::{CatalogError, Country, CountryCatalog, CountryRecord},
    config::GameConfig,
    game::{Game, NewSessionError, RejectionReason, TurnOutcome, TurnResult},
    player::ComputerPlayer,
    registry::{SessionId, SessionRegistry},
    response::title_case,
    seed::{ParseSeedError, SessionSeed},
    session::{
        GameSession, GameState, History, Player, RoundOverReason, SessionSnapshot, SessionStatus,
    },
};

mod catalog;
mod config;
mod game;
mod player;
mod registry;
mod response;
mod seed;
mod session;
