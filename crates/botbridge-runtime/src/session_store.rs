//! Session store collaborator.
//!
//! Maps `(channel, peer)` pairs to backend session ids. Persistence is a
//! host concern; the bridge only consumes this interface. An in-memory
//! implementation is provided for composition and tests.

use botbridge_core::ChannelId;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Binding store between chat peers and backend sessions.
pub trait SessionStore: Send + Sync {
    /// Look up the bound session id for a peer.
    fn lookup_session(&self, channel: ChannelId, peer_key: &str) -> Option<String>;

    /// Bind (or rebind) a peer to a session id.
    fn upsert_session(&self, channel: ChannelId, peer_key: &str, session_id: &str);

    /// Remove a peer's binding.
    fn delete_session(&self, channel: ChannelId, peer_key: &str);
}

/// Map-backed session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<(ChannelId, String), String>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn lookup_session(&self, channel: ChannelId, peer_key: &str) -> Option<String> {
        let sessions = self.sessions.lock();
        sessions.get(&(channel, peer_key.to_string())).cloned()
    }

    fn upsert_session(&self, channel: ChannelId, peer_key: &str, session_id: &str) {
        let mut sessions = self.sessions.lock();
        sessions.insert((channel, peer_key.to_string()), session_id.to_string());
    }

    fn delete_session(&self, channel: ChannelId, peer_key: &str) {
        let mut sessions = self.sessions.lock();
        sessions.remove(&(channel, peer_key.to_string()));
    }
}
