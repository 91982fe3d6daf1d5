//! Durable filesystem-backed history store.
//!
//! One file per conversation under a sessions directory, named
//! `provider__session.tsv`. Each line holds `role<TAB>content`, with
//! embedded newlines escaped as the literal `<NL>` marker so content
//! round-trips byte-for-byte apart from that escape. Files are replaced
//! atomically (write to a temp file, then rename).

use crate::error::{GatewayError, Result};
use crate::memory::{sanitize_component, MemoryStore, ResetOutcome, SessionKey};
use crate::message::{ChatMessage, Role};
use crate::provider::ProviderId;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

const EXTENSION: &str = "tsv";
const NEWLINE_MARKER: &str = "<NL>";

#[derive(Default)]
struct SessionState {
    loaded: bool,
    turns: Vec<ChatMessage>,
}

/// Conversation history persisted under `<root>/sessions/`.
///
/// Every append rewrites the session's file before returning, under that
/// session's own lock, so a crash never leaves a half-written conversation
/// and concurrent appends to one key cannot interleave. A fresh store
/// instance pointed at the same root reconstructs each history from disk on
/// first access.
pub struct FileMemoryStore {
    dir: PathBuf,
    sessions: Mutex<HashMap<SessionKey, Arc<Mutex<SessionState>>>>,
}

impl FileMemoryStore {
    /// Opens (creating if needed) the sessions directory under `root`.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().join("sessions");
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Directory holding the per-conversation files.
    pub fn sessions_dir(&self) -> &Path {
        &self.dir
    }

    fn session_path(&self, key: &SessionKey) -> PathBuf {
        self.dir.join(format!("{}.{}", key.storage_stem(), EXTENSION))
    }

    fn entry(&self, key: &SessionKey) -> Result<Arc<Mutex<SessionState>>> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| GatewayError::MemoryError("session map lock poisoned".to_string()))?;
        Ok(sessions.entry(key.clone()).or_default().clone())
    }

    fn load_if_needed(&self, key: &SessionKey, state: &mut SessionState) -> Result<()> {
        if state.loaded {
            return Ok(());
        }
        let path = self.session_path(key);
        if path.exists() {
            let text = fs::read_to_string(&path)?;
            state.turns = decode_history(&text)?;
            debug!(key = %key, turns = state.turns.len(), "Loaded conversation from disk");
        }
        state.loaded = true;
        Ok(())
    }

    fn persist(&self, key: &SessionKey, turns: &[ChatMessage]) -> Result<()> {
        let path = self.session_path(key);
        write_atomic(&path, encode_history(turns).as_bytes())
    }

    /// Keys present on disk, parsed from file stems. Files with foreign
    /// stems or extensions are ignored here.
    fn disk_keys(&self) -> Result<Vec<SessionKey>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()).and_then(SessionKey::parse_stem) {
                Some(key) => keys.push(key),
                None => warn!(path = %path.display(), "Skipping unrecognized session file"),
            }
        }
        Ok(keys)
    }

    fn remove_all_files(&self) -> Result<()> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION) {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

impl MemoryStore for FileMemoryStore {
    fn read(&self, key: &SessionKey) -> Result<Vec<ChatMessage>> {
        let entry = self.entry(key)?;
        let mut state = entry
            .lock()
            .map_err(|_| GatewayError::MemoryError("session history lock poisoned".to_string()))?;
        self.load_if_needed(key, &mut state)?;
        Ok(state.turns.clone())
    }

    fn append(&self, key: &SessionKey, turn: ChatMessage) -> Result<()> {
        let entry = self.entry(key)?;
        let mut state = entry
            .lock()
            .map_err(|_| GatewayError::MemoryError("session history lock poisoned".to_string()))?;
        self.load_if_needed(key, &mut state)?;
        state.turns.push(turn);
        self.persist(key, &state.turns)
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
            self.remove_all_files()?;
            debug!(count = sessions.len(), "Cleared all conversation history");
            sessions.clear();
            return Ok(ResetOutcome::All);
        }

        let session = session.map(sanitize_component);
        let matches = |key: &SessionKey| {
            provider.map_or(true, |p| key.provider() == p)
                && session.as_deref().map_or(true, |s| key.session() == s)
        };

        // The cache alone is not enough: files written by an earlier process
        // have no cache entry yet.
        let mut candidates: Vec<SessionKey> = self.disk_keys()?;
        for key in sessions.keys() {
            if !candidates.contains(key) {
                candidates.push(key.clone());
            }
        }

        let mut removed = Vec::new();
        for key in candidates.into_iter().filter(matches) {
            let path = self.session_path(&key);
            if path.exists() {
                fs::remove_file(&path)?;
            }
            sessions.remove(&key);
            removed.push(key.storage_stem());
        }
        removed.sort();

        debug!(removed = removed.len(), "Reset conversation history");
        Ok(ResetOutcome::Removed(removed))
    }
}

fn encode_history(turns: &[ChatMessage]) -> String {
    turns
        .iter()
        .map(|turn| {
            format!(
                "{}\t{}",
                turn.role.as_str(),
                turn.content.replace('\n', NEWLINE_MARKER)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_history(text: &str) -> Result<Vec<ChatMessage>> {
    let mut turns = Vec::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let (role, content) = line.split_once('\t').ok_or_else(|| {
            GatewayError::MemoryError(format!("malformed history line: {line:?}"))
        })?;
        let role = Role::parse(role)
            .ok_or_else(|| GatewayError::MemoryError(format!("unknown role {role:?} in history")))?;
        turns.push(ChatMessage {
            role,
            content: content.replace(NEWLINE_MARKER, "\n"),
        });
    }
    Ok(turns)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension(format!("{}.tmp", EXTENSION));
    fs::write(&tmp, bytes)?;
    if path.exists() {
        fs::remove_file(path)?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
