//! Typed events on the agent backend's stream.
//!
//! The backend emits an ordered sequence of these for every live session.
//! The router demultiplexes them by session id; variants it does not
//! handle are ignored.

use crate::model::ModelRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event on the shared backend stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A message record changed (role/model metadata).
    MessageUpdated {
        /// Message metadata.
        info: MessageInfo,
    },

    /// An incremental text delta for a streaming part.
    MessagePartDelta {
        /// Session the part belongs to.
        session_id: String,
        /// Message the part belongs to.
        message_id: String,
        /// Part receiving the delta.
        part_id: String,
        /// Appended text.
        delta: String,
    },

    /// A message part reached a new state (text/reasoning/tool).
    MessagePartUpdated {
        /// The updated part.
        part: MessagePart,
    },

    /// Coarse session status transition (busy/retry/idle).
    SessionStatus {
        /// Session concerned.
        session_id: String,
        /// New status.
        status: SessionStatus,
    },

    /// The session finished its current turn.
    SessionIdle {
        /// Session concerned.
        session_id: String,
    },

    /// The backend asks for a tool permission decision.
    PermissionAsked {
        /// Session concerned.
        session_id: String,
        /// Permission request id to respond to.
        permission_id: String,
    },

    /// A session record was created. Not routed; present so the stream
    /// can carry it without tripping deserialization.
    SessionCreated {
        /// New session id.
        session_id: String,
    },
}

/// Coarse session status reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// The session is working on a turn.
    Busy,

    /// The session is retrying a provider call.
    Retry,

    /// The session finished its turn.
    Idle,
}

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Metadata for a message on the stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageInfo {
    /// Message id.
    pub id: String,

    /// Session the message belongs to.
    pub session_id: String,

    /// Message role.
    pub role: MessageRole,

    /// Model attached to the message (user messages carry the
    /// requested model).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRef>,
}

/// Lifecycle status of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl ToolStatus {
    /// Lowercase label for user-facing notifications.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Pending => "pending",
            ToolStatus::Running => "running",
            ToolStatus::Completed => "completed",
            ToolStatus::Error => "error",
        }
    }
}

/// State of a tool call part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolState {
    /// Current status.
    pub status: ToolStatus,

    /// Human-readable title supplied by the backend, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Tool input arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,

    /// Tool output, present once completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// A part of a streamed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "part_type", rename_all = "lowercase")]
pub enum MessagePart {
    /// Assistant-visible text.
    Text {
        /// Part id.
        id: String,
        /// Owning session.
        session_id: String,
        /// Owning message.
        message_id: String,
        /// Accumulated text.
        text: String,
    },

    /// Model reasoning output.
    Reasoning {
        /// Part id.
        id: String,
        /// Owning session.
        session_id: String,
        /// Owning message.
        message_id: String,
        /// Accumulated reasoning text.
        text: String,
        /// Whether the reasoning block has finished.
        ended: bool,
    },

    /// A tool invocation.
    Tool {
        /// Part id.
        id: String,
        /// Owning session.
        session_id: String,
        /// Owning message.
        message_id: String,
        /// Tool call id; status changes are deduplicated per call id.
        call_id: String,
        /// Tool name.
        tool: String,
        /// Call state.
        state: ToolState,
    },
}

impl MessagePart {
    /// Session the part belongs to.
    pub fn session_id(&self) -> &str {
        match self {
            MessagePart::Text { session_id, .. }
            | MessagePart::Reasoning { session_id, .. }
            | MessagePart::Tool { session_id, .. } => session_id,
        }
    }

    /// Part id.
    pub fn id(&self) -> &str {
        match self {
            MessagePart::Text { id, .. }
            | MessagePart::Reasoning { id, .. }
            | MessagePart::Tool { id, .. } => id,
        }
    }
}

impl AgentEvent {
    /// Session id the event addresses, if it targets one.
    pub fn session_id(&self) -> Option<&str> {
        match self {
            AgentEvent::MessageUpdated { info } => Some(&info.session_id),
            AgentEvent::MessagePartDelta { session_id, .. }
            | AgentEvent::SessionStatus { session_id, .. }
            | AgentEvent::SessionIdle { session_id }
            | AgentEvent::PermissionAsked { session_id, .. }
            | AgentEvent::SessionCreated { session_id } => Some(session_id),
            AgentEvent::MessagePartUpdated { part } => Some(part.session_id()),
        }
    }
}
