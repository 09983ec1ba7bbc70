//! Per-channel cosmetic hooks (thinking/done notices and the like).

use crate::outbound::OutboundDispatcher;
use crate::state::run_state::RunState;
use async_trait::async_trait;
use botbridge_core::{BridgeConfig, ChannelId, MessagePart, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Dependencies a hook invocation sees.
pub struct HookContext<'a> {
    /// The run the event belongs to.
    pub run: &'a RunState,

    /// Read-only configuration snapshot.
    pub config: &'a BridgeConfig,

    /// Outbound send path.
    pub outbound: &'a OutboundDispatcher,
}

/// Channel-specific reactions to stream events.
///
/// Hook failures are caught at the router's dispatch boundary; a broken
/// hook degrades one channel's cosmetics, never the shared stream.
#[async_trait]
pub trait ChannelHooks: Send + Sync {
    /// A part snapshot arrived for a run on this channel.
    async fn on_message_part_updated(
        &self,
        _ctx: &HookContext<'_>,
        _part: &MessagePart,
    ) -> Result<()> {
        Ok(())
    }

    /// The run's session went idle.
    async fn on_session_idle(&self, _ctx: &HookContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Hooks that do nothing; the registry default.
pub struct DefaultChannelHooks;

#[async_trait]
impl ChannelHooks for DefaultChannelHooks {}

/// `ChannelId -> ChannelHooks` lookup with a shared no-op default.
pub struct ChannelHooksRegistry {
    hooks: HashMap<ChannelId, Arc<dyn ChannelHooks>>,
    default: Arc<dyn ChannelHooks>,
}

impl Default for ChannelHooksRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelHooksRegistry {
    pub fn new() -> Self {
        Self {
            hooks: HashMap::new(),
            default: Arc::new(DefaultChannelHooks),
        }
    }

    /// Register hooks for a channel, replacing any previous entry.
    pub fn register(&mut self, channel: ChannelId, hooks: Arc<dyn ChannelHooks>) {
        self.hooks.insert(channel, hooks);
    }

    /// The hooks for a channel, or the no-op default.
    pub fn get(&self, channel: ChannelId) -> &Arc<dyn ChannelHooks> {
        self.hooks.get(&channel).unwrap_or(&self.default)
    }
}
