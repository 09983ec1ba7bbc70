//! Telegram progressive streaming of assistant text.

use crate::adapter::AdapterMap;
use crate::state::registry::SessionRunRegistry;
use crate::stream::coordinator::StreamCoordinator;
use async_trait::async_trait;
use botbridge_core::text::chunk_text;
use botbridge_core::{ChannelId, MessageInfo, MessagePart, MessageRole};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(300);

/// Buffered stream state for one session.
#[derive(Default)]
struct StreamState {
    /// `message id -> role`, learned from message metadata. Only
    /// assistant messages stream.
    roles: HashMap<String, MessageRole>,

    /// Accumulated text per part id.
    parts: HashMap<String, String>,

    /// Part ids in first-seen order.
    part_order: Vec<String>,

    /// Prefix of the composed text already delivered to the peer.
    sent: String,

    pending: bool,
    flush_scheduled: bool,
    disabled: bool,
}

impl StreamState {
    /// Join parts with the same separator the final reply uses, so the
    /// streamed prefix matches the finalized text.
    fn compose(&self) -> String {
        let mut pieces = Vec::new();
        for part_id in &self.part_order {
            if let Some(text) = self.parts.get(part_id) {
                if !text.trim().is_empty() {
                    pieces.push(text.as_str());
                }
            }
        }
        pieces.join("\n")
    }

    fn clear_part(&mut self, part_id: &str) {
        self.parts.remove(part_id);
        self.part_order.retain(|id| id != part_id);
    }
}

struct Inner {
    registry: Arc<SessionRunRegistry>,
    adapters: Arc<AdapterMap>,
    flush_interval: Duration,
    sessions: Mutex<HashMap<String, StreamState>>,
}

/// Streams assistant text to Telegram while the backend is still working.
///
/// Text deltas accumulate per session and flush on a short cadence
/// through the adapter's progress path, each flush delivering only the
/// not-yet-sent tail. `finalize_reply` then sends whatever tail remains,
/// so the peer never sees the same text twice. Streaming quietly turns
/// itself off for a session when a tail outgrows one message; the final
/// reply path picks up from there.
pub struct TelegramStreamCoordinator {
    inner: Arc<Inner>,
}

impl TelegramStreamCoordinator {
    pub fn new(registry: Arc<SessionRunRegistry>, adapters: Arc<AdapterMap>) -> Self {
        Self::with_flush_interval(registry, adapters, DEFAULT_FLUSH_INTERVAL)
    }

    pub fn with_flush_interval(
        registry: Arc<SessionRunRegistry>,
        adapters: Arc<AdapterMap>,
        flush_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                adapters,
                flush_interval,
                sessions: Mutex::new(HashMap::new()),
            }),
        }
    }
}

impl Inner {
    /// Whether the session's run is a live, unsuppressed Telegram run.
    fn run_streams(&self, session_id: &str) -> Option<String> {
        let run = self.registry.get(session_id)?;
        let telegram = run.telegram()?;
        if telegram.streaming_suppressed() {
            return None;
        }
        Some(run.peer_id.clone())
    }

    fn schedule_flush(self: &Arc<Self>, session_id: &str) {
        {
            let mut sessions = self.sessions.lock();
            let Some(state) = sessions.get_mut(session_id) else {
                return;
            };
            if state.disabled || state.flush_scheduled {
                return;
            }
            state.flush_scheduled = true;
        }

        let inner = Arc::clone(self);
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(inner.flush_interval).await;
            if let Some(state) = inner.sessions.lock().get_mut(&session_id) {
                state.flush_scheduled = false;
            }
            inner.flush(&session_id).await;
        });
    }

    /// Send the not-yet-delivered tail of the composed text, if any.
    async fn flush(&self, session_id: &str) {
        let Some(peer_id) = self.run_streams(session_id) else {
            if let Some(state) = self.sessions.lock().get_mut(session_id) {
                state.pending = false;
            }
            return;
        };
        let Some(adapter) = self.adapters.get(&ChannelId::Telegram) else {
            return;
        };
        if !adapter.capabilities().progress {
            return;
        }

        let tail = {
            let mut sessions = self.sessions.lock();
            let Some(state) = sessions.get_mut(session_id) else {
                return;
            };
            if state.disabled || !state.pending {
                return;
            }
            let composed = state.compose();
            // A shrinking buffer means the backend rewrote the message;
            // wait for it to grow past what already went out.
            let Some(tail) = composed.strip_prefix(state.sent.as_str()) else {
                state.pending = false;
                return;
            };
            let tail = tail.to_string();
            if tail.trim().is_empty() {
                state.pending = false;
                return;
            }
            if tail.chars().count() > adapter.max_text_length() {
                state.disabled = true;
                debug!(
                    session = session_id,
                    length = tail.len(),
                    "telegram stream disabled, tail exceeds one message"
                );
                return;
            }
            state.pending = false;
            state.sent = composed;
            tail
        };

        if let Err(err) = adapter.send_text(&peer_id, &tail).await {
            warn!(session = session_id, error = %err, "telegram stream flush failed");
        }
    }
}

#[async_trait]
impl StreamCoordinator for TelegramStreamCoordinator {
    fn on_message_updated(&self, info: &MessageInfo) {
        if self.inner.registry.get(&info.session_id).is_none() {
            return;
        }
        let mut sessions = self.inner.sessions.lock();
        let state = sessions.entry(info.session_id.clone()).or_default();
        state.roles.insert(info.id.clone(), info.role);
    }

    async fn on_message_part_delta(
        &self,
        session_id: &str,
        message_id: &str,
        part_id: &str,
        delta: &str,
    ) {
        if delta.is_empty() {
            return;
        }
        if self.inner.run_streams(session_id).is_none() {
            if let Some(state) = self.inner.sessions.lock().get_mut(session_id) {
                state.clear_part(part_id);
            }
            return;
        }

        {
            let mut sessions = self.inner.sessions.lock();
            let state = sessions.entry(session_id.to_string()).or_default();
            // Only assistant messages stream; an unknown role means the
            // metadata has not arrived yet and the part snapshot will
            // carry the text later.
            if state.roles.get(message_id) != Some(&MessageRole::Assistant) {
                return;
            }
            if !state.parts.contains_key(part_id) {
                state.part_order.push(part_id.to_string());
            }
            state
                .parts
                .entry(part_id.to_string())
                .or_default()
                .push_str(delta);
            state.pending = true;
        }
        self.inner.schedule_flush(session_id);
    }

    async fn on_message_part_updated(&self, part: &MessagePart) {
        let MessagePart::Text {
            id,
            session_id,
            message_id,
            text,
        } = part
        else {
            return;
        };
        if self.inner.run_streams(session_id).is_none() {
            if let Some(state) = self.inner.sessions.lock().get_mut(session_id) {
                state.clear_part(id);
            }
            return;
        }

        let should_flush = {
            let mut sessions = self.inner.sessions.lock();
            let state = sessions.entry(session_id.to_string()).or_default();
            if state.roles.get(message_id) != Some(&MessageRole::Assistant) {
                state.clear_part(id);
                return;
            }
            if !state.parts.contains_key(id) {
                state.part_order.push(id.clone());
            }
            let previous = state.parts.entry(id.clone()).or_default();
            // Snapshots carry the full accumulated text; never regress
            // below what deltas already built up.
            if text.chars().count() >= previous.chars().count() {
                *previous = text.clone();
            }
            if state.parts.get(id).is_some_and(|t| !t.trim().is_empty()) {
                state.pending = true;
                true
            } else {
                false
            }
        };
        if should_flush {
            self.inner.schedule_flush(session_id);
        }
    }

    async fn on_session_idle(&self, session_id: &str) {
        self.inner.flush(session_id).await;
    }

    async fn finalize_reply(&self, session_id: &str, peer_id: &str, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.inner.flush(session_id).await;

        let tail = {
            let sessions = self.inner.sessions.lock();
            let Some(state) = sessions.get(session_id) else {
                return false;
            };
            if state.sent.is_empty() {
                return false;
            }
            let Some(tail) = text.strip_prefix(state.sent.trim_end()) else {
                // The final reply diverged from what streamed; let the
                // caller send it whole.
                return false;
            };
            tail.to_string()
        };

        let Some(adapter) = self.inner.adapters.get(&ChannelId::Telegram) else {
            return false;
        };
        let tail = tail.trim();
        if !tail.is_empty() {
            for chunk in chunk_text(tail, adapter.max_text_length()) {
                if let Err(err) = adapter.send_text(peer_id, &chunk).await {
                    warn!(session = session_id, error = %err, "telegram final tail send failed");
                    return false;
                }
            }
        }
        if let Some(state) = self.inner.sessions.lock().get_mut(session_id) {
            state.sent = text.to_string();
            state.pending = false;
        }
        true
    }

    fn has_streamed_message(&self, session_id: &str) -> bool {
        self.inner
            .sessions
            .lock()
            .get(session_id)
            .is_some_and(|state| !state.sent.is_empty())
    }

    fn clear_session(&self, session_id: &str) {
        self.inner.sessions.lock().remove(session_id);
    }
}
