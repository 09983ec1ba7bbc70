//! Per-channel stream coordination strategies.

use async_trait::async_trait;
use botbridge_core::{ChannelId, MessageInfo, MessagePart};
use std::collections::HashMap;
use std::sync::Arc;

/// Channel-specific policy for buffering and flushing streamed partial
/// output.
///
/// Every method has a no-op default, so a coordinator only overrides the
/// events it cares about. Coordinators hold no per-run flags themselves;
/// those live on the run state's channel variant.
#[async_trait]
pub trait StreamCoordinator: Send + Sync {
    /// Message metadata changed (carries the role used to filter
    /// streamable messages).
    fn on_message_updated(&self, _info: &MessageInfo) {}

    /// An incremental text delta arrived for a part.
    async fn on_message_part_delta(
        &self,
        _session_id: &str,
        _message_id: &str,
        _part_id: &str,
        _delta: &str,
    ) {
    }

    /// A part snapshot arrived.
    async fn on_message_part_updated(&self, _part: &MessagePart) {}

    /// The session finished its turn; flush whatever is buffered.
    async fn on_session_idle(&self, _session_id: &str) {}

    /// Deliver the final reply text.
    ///
    /// Returns `true` when the coordinator delivered it (fully or as the
    /// remaining tail of a streamed message), `false` when the caller
    /// must send the text itself.
    async fn finalize_reply(&self, _session_id: &str, _peer_id: &str, _text: &str) -> bool {
        false
    }

    /// Whether any streamed output went out for this session.
    fn has_streamed_message(&self, _session_id: &str) -> bool {
        false
    }

    /// Drop all buffered state for a session.
    fn clear_session(&self, _session_id: &str) {}
}

/// Coordinator that does nothing; the registry default.
pub struct NoopStreamCoordinator;

#[async_trait]
impl StreamCoordinator for NoopStreamCoordinator {}

/// `ChannelId -> StreamCoordinator` lookup with a shared no-op default.
pub struct StreamCoordinatorRegistry {
    coordinators: HashMap<ChannelId, Arc<dyn StreamCoordinator>>,
    default: Arc<dyn StreamCoordinator>,
}

impl Default for StreamCoordinatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamCoordinatorRegistry {
    pub fn new() -> Self {
        Self {
            coordinators: HashMap::new(),
            default: Arc::new(NoopStreamCoordinator),
        }
    }

    /// Register a coordinator for a channel, replacing any previous one.
    pub fn register(&mut self, channel: ChannelId, coordinator: Arc<dyn StreamCoordinator>) {
        self.coordinators.insert(channel, coordinator);
    }

    /// The coordinator for a channel, or the no-op default.
    pub fn get(&self, channel: ChannelId) -> &Arc<dyn StreamCoordinator> {
        self.coordinators.get(&channel).unwrap_or(&self.default)
    }
}
