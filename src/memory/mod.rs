//! Session-scoped conversation memory.
//!
//! History is keyed by (provider, session) pairs and polymorphic over
//! storage: [`InMemoryStore`] keeps everything in process, while
//! [`FileMemoryStore`] persists each conversation to a sessions directory
//! and survives restarts. Both serialize append-then-persist per key, so
//! concurrent `ask` calls against the same conversation never interleave
//! partial writes while different conversations proceed in parallel.

pub mod file;
pub mod in_memory;

pub use file::FileMemoryStore;
pub use in_memory::InMemoryStore;

use crate::error::Result;
use crate::message::ChatMessage;
use crate::provider::ProviderId;
use std::fmt;

/// Identifies one conversation thread: a provider paired with a
/// caller-chosen session identifier.
///
/// The session component is normalized once at construction so cache keys
/// and on-disk file names always agree: any character outside
/// `[A-Za-z0-9._-]` becomes `-`. Provider tags contain no underscores, so
/// the `provider__session` storage stem parses unambiguously on the first
/// double underscore even when a session id itself contains `__`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    provider: ProviderId,
    session: String,
}

impl SessionKey {
    pub fn new(provider: ProviderId, session: impl AsRef<str>) -> Self {
        Self {
            provider,
            session: sanitize_component(session.as_ref()),
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    /// Filesystem-safe stem joining provider and session with a double
    /// underscore.
    pub fn storage_stem(&self) -> String {
        format!("{}__{}", self.provider.as_str(), self.session)
    }

    /// Parses a storage stem back into a key. Returns `None` when the stem
    /// has no separator or names an unknown provider.
    pub fn parse_stem(stem: &str) -> Option<SessionKey> {
        let (provider, session) = stem.split_once("__")?;
        let provider = ProviderId::parse(provider)?;
        Some(SessionKey {
            provider,
            session: session.to_string(),
        })
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_stem())
    }
}

/// Normalizes a session identifier for use in cache keys and file names.
pub(crate) fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Outcome of a reset: either everything went, or the listed keys did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    All,
    /// Storage stems of the removed conversations, sorted.
    Removed(Vec<String>),
}

impl ResetOutcome {
    /// Keys for transport reports: the literal `ALL` sentinel, or the
    /// removed stems.
    pub fn removed_keys(&self) -> Vec<String> {
        match self {
            ResetOutcome::All => vec!["ALL".to_string()],
            ResetOutcome::Removed(keys) => keys.clone(),
        }
    }
}

/// Storage for per-session conversation history.
///
/// - `read` returns an empty history for an unseen key.
/// - `append` preserves turn order; the durable variant persists before
///   returning.
/// - `reset` applies the four-way filter: no filters removes everything,
///   a provider filter removes every session under that provider, a session
///   filter removes that session id across all providers, and both filters
///   remove exactly one key. Durable stores drop the cache entry and the
///   persisted file together.
pub trait MemoryStore: Send + Sync {
    fn read(&self, key: &SessionKey) -> Result<Vec<ChatMessage>>;

    fn append(&self, key: &SessionKey, turn: ChatMessage) -> Result<()>;

    fn reset(
        &self,
        provider: Option<ProviderId>,
        session: Option<&str>,
    ) -> Result<ResetOutcome>;
}
