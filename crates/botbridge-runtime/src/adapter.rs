//! The adapter contract every channel implementation satisfies.

use async_trait::async_trait;
use botbridge_core::{BridgeError, ChannelId, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Capability flags advertised by a channel adapter.
///
/// A flag may be true while the underlying call still refuses at runtime
/// (missing permissions, degraded connection), so callers check the flag
/// and treat a refusal as recoverable.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdapterCapabilities {
    /// Supports typing indicators.
    pub typing: bool,

    /// Supports file uploads.
    pub file: bool,

    /// Supports progressive partial-result delivery.
    pub progress: bool,
}

/// A channel adapter bound to exactly one [`ChannelId`].
///
/// Adapters own their wire protocol; the runtime only sees this surface.
/// `start`/`stop` are idempotent: calling either when already in that
/// state is a no-op. All failures are channel-specific errors the runtime
/// logs and recovers from.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// The channel this adapter serves.
    fn channel(&self) -> ChannelId;

    /// Capability flags.
    fn capabilities(&self) -> AdapterCapabilities;

    /// Maximum length of one outbound text message, in characters.
    /// Callers chunk; adapters never split text themselves.
    fn max_text_length(&self) -> usize {
        4096
    }

    /// Begin receiving. Safe to call when already started.
    async fn start(&self) -> Result<()>;

    /// Stop receiving and release resources. Safe to call when already
    /// stopped.
    async fn stop(&self) -> Result<()>;

    /// Send one text chunk no longer than [`max_text_length`](Self::max_text_length).
    async fn send_text(&self, peer_id: &str, text: &str) -> Result<()>;

    /// Send a typing indicator. Optional; the default refuses.
    async fn send_typing(&self, _peer_id: &str) -> Result<()> {
        Err(BridgeError::unsupported(
            self.channel().as_str(),
            "send_typing",
        ))
    }

    /// Send a file by path. Optional; the default refuses.
    async fn send_file(&self, _peer_id: &str, _path: &str) -> Result<()> {
        Err(BridgeError::unsupported(
            self.channel().as_str(),
            "send_file",
        ))
    }
}

/// Read-only channel-to-adapter lookup held by the runtime.
///
/// Owned by the composition root; the router and dispatcher only read it.
pub type AdapterMap = HashMap<ChannelId, Arc<dyn ChannelAdapter>>;
