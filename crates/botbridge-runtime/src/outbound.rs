//! Outbound dispatcher: one logical send becomes ordered adapter calls.

use crate::adapter::AdapterMap;
use botbridge_core::text::chunk_text;
use botbridge_core::{ChannelId, OutboundRecord, Reporter, Result, SendTextOptions};
use std::sync::Arc;
use tracing::{debug, info};

/// Marker prefix for file delivery through `send_file`.
const FILE_MARKER: &str = "FILE:";

/// Turns a `(channel, peer, text)` triple into adapter calls.
///
/// Chunks long text to the adapter's limit and sends the chunks in
/// order, awaiting each send so message ordering on the channel is
/// preserved.
pub struct OutboundDispatcher {
    adapters: Arc<AdapterMap>,
    reporter: Option<Arc<dyn Reporter>>,
}

impl OutboundDispatcher {
    /// Create a dispatcher over the adapter lookup.
    pub fn new(adapters: Arc<AdapterMap>, reporter: Option<Arc<dyn Reporter>>) -> Self {
        Self { adapters, reporter }
    }

    /// Send text to a peer on a channel.
    ///
    /// Silently no-ops when no adapter serves the channel. Text starting
    /// with the `FILE:` marker is delegated to `send_file` when the
    /// adapter advertises the file capability; a runtime refusal of the
    /// delegated call propagates as the adapter's error. Without the
    /// capability the marker text is sent as-is.
    pub async fn send_text(
        &self,
        channel: ChannelId,
        peer_id: &str,
        text: &str,
        options: SendTextOptions,
    ) -> Result<()> {
        let Some(adapter) = self.adapters.get(&channel) else {
            return Ok(());
        };

        debug!(
            channel = %channel,
            peer = peer_id,
            kind = ?options.kind,
            length = text.len(),
            "send requested"
        );

        if options.display {
            if let Some(reporter) = &self.reporter {
                reporter.on_outbound(&OutboundRecord {
                    channel,
                    peer_id: peer_id.to_string(),
                    text: text.to_string(),
                    kind: options.kind,
                });
            }
        }

        if let Some(path) = text.strip_prefix(FILE_MARKER) {
            if adapter.capabilities().file {
                adapter.send_file(peer_id, path.trim()).await?;
                return Ok(());
            }
        }

        for chunk in chunk_text(text, adapter.max_text_length()) {
            info!(channel = %channel, peer = peer_id, length = chunk.len(), "sending message");
            adapter.send_text(peer_id, &chunk).await?;
        }
        Ok(())
    }
}
