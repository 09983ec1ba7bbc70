//! The agent backend client contract.
//!
//! The backend is an external collaborator: an opaque event source and
//! command target. The bridge only needs session creation, prompting,
//! the shared event subscription, and permission responses.

use async_trait::async_trait;
use botbridge_core::{AgentEvent, ModelRef, Result};
use futures::stream::Stream;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// The ordered event sequence returned by [`BackendClient::subscribe`].
pub type EventStream = Pin<Box<dyn Stream<Item = AgentEvent> + Send>>;

/// Decision returned to the backend for a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    /// Reject this request.
    Reject,

    /// Approve this request only.
    Once,

    /// Approve this and future identical requests.
    Always,
}

/// One part of a prompt response.
#[derive(Debug, Clone)]
pub enum ReplyPart {
    /// Reply text. Parts marked `ignored` are bookkeeping the backend
    /// excludes from the user-visible reply.
    Text {
        /// Text content.
        text: String,
        /// Whether this part is excluded from the reply.
        ignored: bool,
    },

    /// A non-text part (tool call records and the like).
    Other,
}

/// Response to a prompt call.
#[derive(Debug, Clone, Default)]
pub struct PromptReply {
    /// Response parts in backend order.
    pub parts: Vec<ReplyPart>,
}

impl PromptReply {
    /// Join the non-ignored text parts into the user-visible reply.
    pub fn reply_text(&self) -> String {
        let joined: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|part| match part {
                ReplyPart::Text { text, ignored: false } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        joined.join("\n").trim().to_string()
    }
}

/// Client for the agent backend.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Create a backend session and return its id.
    async fn create_session(&self, title: &str) -> Result<String>;

    /// Send one user turn and wait for the full response.
    async fn prompt(
        &self,
        session_id: &str,
        text: &str,
        model: Option<&ModelRef>,
    ) -> Result<PromptReply>;

    /// Open the shared event subscription.
    ///
    /// The stream ends when `cancel` fires or the backend closes it. A
    /// failure to establish the subscription is the one fatal error class
    /// in the bridge.
    async fn subscribe(&self, cancel: CancellationToken) -> Result<EventStream>;

    /// Answer a permission request.
    async fn respond_permission(
        &self,
        session_id: &str,
        permission_id: &str,
        decision: PermissionDecision,
    ) -> Result<()>;
}
