use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::GameSession;

/// Opaque handle of a registered session.
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
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct SessionId(Uuid);

/// Concurrent store of sessions keyed by [`SessionId`].
///
/// Each session sits behind its own mutex, so operations on one session are
/// serialized while different sessions proceed in parallel. Two simultaneous
/// submissions of the same country to one session therefore cannot both be
/// accepted.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<GameSession>>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `session` under a fresh random id.
    pub fn start(&self, session: GameSession) -> SessionId {
        let id = SessionId(Uuid::new_v4());
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(Mutex::new(session)));
        log::debug!("registered session {id}");
        id
    }

    /// Shared handle to a session.
    #[must_use]
    pub fn get(&self, id: SessionId) -> Option<Arc<Mutex<GameSession>>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Runs `f` with exclusive access to a session.
    ///
    /// Returns `None` if no session has this id.
    pub fn with<F, T>(&self, id: SessionId, f: F) -> Option<T>
    where
        F: FnOnce(&mut GameSession) -> T,
    {
        let session = self.get(id)?;
        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&mut session))
    }

    /// Unregisters a session, returning whether it existed.
    pub fn remove(&self, id: SessionId) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            log::debug!("removed session {id}");
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::{
        GameConfig, RejectionReason, SessionSeed,
        game::tests::{TableClassifier, game_with},
    };

    #[test]
    fn test_register_lookup_remove() {
        let registry = SessionRegistry::new();
        let id = registry.start(GameSession::with_letter('b', SessionSeed::from_u64(0)));
        let other = registry.start(GameSession::with_letter('c', SessionSeed::from_u64(0)));
        assert_ne!(id, other);
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.with(id, |session| session.letter()), Some('b'));
        assert_eq!(registry.with(other, |session| session.letter()), Some('c'));

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.get(id).is_none());
        assert_eq!(registry.with(id, |session| session.letter()), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_session_id_text_form() {
        let registry = SessionRegistry::new();
        let id = registry.start(GameSession::with_letter('b', SessionSeed::from_u64(0)));
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn test_concurrent_duplicate_submissions() {
        let game = Arc::new(game_with(
            TableClassifier::countries(&["brazil"]),
            GameConfig::default(),
        ));
        let registry = Arc::new(SessionRegistry::new());
        let id = registry.start(GameSession::with_letter('b', SessionSeed::from_u64(0)));

        let handles = (0..8)
            .map(|_| {
                let game = Arc::clone(&game);
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .with(id, |session| game.submit_user_turn(session, "Brazil"))
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();
        let results = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(results.iter().filter(|r| r.is_accepted()).count(), 1);
        assert!(
            results
                .iter()
                .filter(|r| !r.is_accepted())
                .all(|r| r.rejection_reason() == Some(RejectionReason::WrongState))
        );
        let history = registry.with(id, |session| session.history().len());
        assert_eq!(history, Some(1));
    }
}
