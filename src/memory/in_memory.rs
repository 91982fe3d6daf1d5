//! Volatile in-process history store.

use crate::error::{GatewayError, Result};
use crate::memory::{sanitize_component, MemoryStore, ResetOutcome, SessionKey};
use crate::message::ChatMessage;
use crate::provider::ProviderId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

type SharedHistory = Arc<Mutex<Vec<ChatMessage>>>;

/// Conversation history held entirely in process memory.
///
/// The outer map lock is held only long enough to fetch or create a
/// session's entry; appends then run under that session's own lock, so
/// different conversations never contend.
#[derive(Default)]
pub struct InMemoryStore {
    sessions: Mutex<HashMap<SessionKey, SharedHistory>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &SessionKey) -> Result<SharedHistory> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| GatewayError::MemoryError("session map lock poisoned".to_string()))?;
        Ok(sessions.entry(key.clone()).or_default().clone())
    }
}

impl MemoryStore for InMemoryStore {
    fn read(&self, key: &SessionKey) -> Result<Vec<ChatMessage>> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| GatewayError::MemoryError("session map lock poisoned".to_string()))?;
        match sessions.get(key) {
            Some(history) => {
                let history = history.lock().map_err(|_| {
                    GatewayError::MemoryError("session history lock poisoned".to_string())
                })?;
                Ok(history.clone())
            }
            None => Ok(Vec::new()),
        }
    }

    fn append(&self, key: &SessionKey, turn: ChatMessage) -> Result<()> {
        let entry = self.entry(key)?;
        let mut history = entry
            .lock()
            .map_err(|_| GatewayError::MemoryError("session history lock poisoned".to_string()))?;
        history.push(turn);
        Ok(())
    }

    fn reset(
        &self,
        provider: Option<ProviderId>,
        session: Option<&str>,
    ) -> Result<ResetOutcome> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| GatewayError::MemoryError("session map lock poisoned".to_string()))?;

        if provider.is_none() && session.is_none() {
            debug!(count = sessions.len(), "Clearing all conversation history");
            sessions.clear();
            return Ok(ResetOutcome::All);
        }

        let session = session.map(sanitize_component);
        let mut removed = Vec::new();
        sessions.retain(|key, _| {
            let matches = provider.map_or(true, |p| key.provider() == p)
                && session.as_deref().map_or(true, |s| key.session() == s);
            if matches {
                removed.push(key.storage_stem());
            }
            !matches
        });
        removed.sort();

        debug!(removed = removed.len(), "Reset conversation history");
        Ok(ResetOutcome::Removed(removed))
    }
}
