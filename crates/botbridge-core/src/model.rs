//! Model references and per-peer override storage.

use crate::channel::ChannelId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Reference to a concrete model at a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    /// Provider identifier (e.g. "anthropic").
    #[serde(rename = "providerID")]
    pub provider_id: String,

    /// Model identifier within the provider.
    #[serde(rename = "modelID")]
    pub model_id: String,
}

impl ModelRef {
    /// Create a model reference.
    pub fn new(provider_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            model_id: model_id.into(),
        }
    }

    /// Parse a `provider/model` string.
    pub fn parse(s: &str) -> Option<Self> {
        let (provider, model) = s.split_once('/')?;
        if provider.is_empty() || model.is_empty() {
            return None;
        }
        Some(Self::new(provider, model))
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider_id, self.model_id)
    }
}

/// Per-(channel, peer) model override map.
///
/// Process-lifetime state, owned by the composition root and mutated only
/// through these methods.
#[derive(Debug, Default)]
pub struct ModelStore {
    overrides: Mutex<HashMap<String, ModelRef>>,
}

fn store_key(channel: ChannelId, peer_key: &str) -> String {
    format!("{channel}:{peer_key}")
}

impl ModelStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the model for a peer: the override if set, else the default.
    pub fn get(
        &self,
        channel: ChannelId,
        peer_key: &str,
        default: Option<&ModelRef>,
    ) -> Option<ModelRef> {
        let overrides = self.overrides.lock();
        overrides
            .get(&store_key(channel, peer_key))
            .cloned()
            .or_else(|| default.cloned())
    }

    /// Set a model override for a peer.
    pub fn set(&self, channel: ChannelId, peer_key: &str, model: ModelRef) {
        let mut overrides = self.overrides.lock();
        overrides.insert(store_key(channel, peer_key), model);
    }

    /// Clear a peer's override, falling back to the default.
    pub fn clear(&self, channel: ChannelId, peer_key: &str) {
        let mut overrides = self.overrides.lock();
        overrides.remove(&store_key(channel, peer_key));
    }

    /// Drop all overrides. Test hook for composition roots.
    pub fn reset(&self) {
        self.overrides.lock().clear();
    }
}
