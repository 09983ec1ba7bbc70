//! Inbound and outbound message types.

use crate::channel::ChannelId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound message handed to the bridge by a channel adapter.
///
/// Single hop: created on receipt, consumed once by the inbound pipeline,
/// not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Source channel.
    pub channel: ChannelId,

    /// Peer (chat/user) identifier on that channel.
    pub peer_id: String,

    /// Text content.
    pub text: String,

    /// Raw channel payload, used for channel-specific inspection
    /// (e.g. Telegram duplicate detection).
    #[serde(default)]
    pub raw: Option<Value>,

    /// Whether the message was sent by the bridge's own account.
    #[serde(default)]
    pub from_me: bool,

    /// Timestamp when the adapter received the message.
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Create an inbound message received now.
    pub fn new(channel: ChannelId, peer_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel,
            peer_id: peer_id.into(),
            text: text.into(),
            raw: None,
            from_me: false,
            received_at: Utc::now(),
        }
    }

    /// Attach the raw channel payload.
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }
}

/// Classification of outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutboundKind {
    /// Final reply text from the agent.
    Reply,

    /// Bridge-generated notice (thinking/done/errors/commands).
    System,

    /// Tool progress notification.
    Tool,
}

/// Options for the dispatcher's send-text call.
#[derive(Debug, Clone, Copy)]
pub struct SendTextOptions {
    /// Classification reported alongside the message.
    pub kind: OutboundKind,

    /// Whether to surface the message to the reporter.
    pub display: bool,
}

impl Default for SendTextOptions {
    fn default() -> Self {
        Self {
            kind: OutboundKind::System,
            display: true,
        }
    }
}

impl SendTextOptions {
    /// Options for a final agent reply.
    pub fn reply() -> Self {
        Self {
            kind: OutboundKind::Reply,
            display: true,
        }
    }

    /// Options for a tool progress notification.
    pub fn tool() -> Self {
        Self {
            kind: OutboundKind::Tool,
            display: true,
        }
    }

    /// Suppress reporter display for this send.
    pub fn hidden(mut self) -> Self {
        self.display = false;
        self
    }
}

/// An outbound message as seen by the reporter.
#[derive(Debug, Clone)]
pub struct OutboundRecord {
    /// Destination channel.
    pub channel: ChannelId,

    /// Destination peer.
    pub peer_id: String,

    /// Full text before chunking.
    pub text: String,

    /// Classification.
    pub kind: OutboundKind,
}

/// Host-process callbacks for live status display.
///
/// Never required for correctness: every method has a no-op default and
/// all calls are fire-and-forget.
pub trait Reporter: Send + Sync {
    /// A one-line status update ("[Telegram] 42 Thinking...").
    fn on_status(&self, _text: &str) {}

    /// An inbound message accepted by the pipeline.
    fn on_inbound(&self, _message: &InboundMessage) {}

    /// An outbound message about to be dispatched.
    fn on_outbound(&self, _record: &OutboundRecord) {}
}
