//! Shared simulators for the bridge integration tests.
//!
//! [`ChannelSim`] stands in for a channel adapter and records everything
//! the runtime sends through it. [`AgentSim`] stands in for the agent
//! backend: prompts return scripted replies, and each prompt can emit a
//! scripted batch of events onto the shared subscription, emulating a
//! backend that streams while it works.

use async_trait::async_trait;
use botbridge_core::{AgentEvent, ChannelId, ModelRef, Result};
use botbridge_runtime::{
    AdapterCapabilities, BackendClient, ChannelAdapter, EventStream, PermissionDecision,
    PromptReply, ReplyPart,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A recording channel adapter.
pub struct ChannelSim {
    channel: ChannelId,
    caps: AdapterCapabilities,
    sent: Mutex<Vec<String>>,
    typing: AtomicUsize,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl ChannelSim {
    pub fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            caps: AdapterCapabilities::default(),
            sent: Mutex::new(Vec::new()),
            typing: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn with_capabilities(mut self, caps: AdapterCapabilities) -> Self {
        self.caps = caps;
        self
    }

    /// Every text sent through this adapter, in send order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn typing_count(&self) -> usize {
        self.typing.load(Ordering::SeqCst)
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChannelAdapter for ChannelSim {
    fn channel(&self) -> ChannelId {
        self.channel
    }

    fn capabilities(&self) -> AdapterCapabilities {
        self.caps
    }

    async fn start(&self) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_text(&self, _peer_id: &str, text: &str) -> Result<()> {
        self.sent.lock().push(text.to_string());
        Ok(())
    }

    async fn send_typing(&self, _peer_id: &str) -> Result<()> {
        self.typing.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// One recorded prompt call.
#[derive(Debug, Clone)]
pub struct PromptCall {
    pub session_id: String,
    pub text: String,
    pub model: Option<ModelRef>,
}

struct Turn {
    reply: String,
    events: Vec<AgentEvent>,
}

/// A scripted agent backend.
///
/// Session ids are assigned as `ses_1`, `ses_2`, ... in creation order.
#[derive(Default)]
pub struct AgentSim {
    turns: Mutex<VecDeque<Turn>>,
    prompts: Mutex<Vec<PromptCall>>,
    permissions: Mutex<Vec<(String, String, PermissionDecision)>>,
    sessions: AtomicUsize,
    events_tx: Mutex<Option<mpsc::UnboundedSender<AgentEvent>>>,
}

impl AgentSim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next prompt to return `reply` with no mid-run events.
    pub fn push_reply(&self, reply: &str) {
        self.push_turn(reply, Vec::new());
    }

    /// Script the next prompt: `events` go out on the subscription while
    /// the prompt is in flight, then `reply` is returned.
    pub fn push_turn(&self, reply: &str, events: Vec<AgentEvent>) {
        self.turns.lock().push_back(Turn {
            reply: reply.to_string(),
            events,
        });
    }

    pub fn prompts(&self) -> Vec<PromptCall> {
        self.prompts.lock().clone()
    }

    pub fn permissions(&self) -> Vec<(String, String, PermissionDecision)> {
        self.permissions.lock().clone()
    }
}

#[async_trait]
impl BackendClient for AgentSim {
    async fn create_session(&self, _title: &str) -> Result<String> {
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("ses_{n}"))
    }

    async fn prompt(
        &self,
        session_id: &str,
        text: &str,
        model: Option<&ModelRef>,
    ) -> Result<PromptReply> {
        self.prompts.lock().push(PromptCall {
            session_id: session_id.to_string(),
            text: text.to_string(),
            model: model.cloned(),
        });

        let turn = self.turns.lock().pop_front();
        let Some(turn) = turn else {
            return Ok(PromptReply::default());
        };
        if let Some(tx) = self.events_tx.lock().as_ref() {
            for event in turn.events {
                let _ = tx.send(event);
            }
        }
        // Let the stream consumer drain what was just emitted before the
        // run finishes and releases its state.
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }

        Ok(PromptReply {
            parts: vec![ReplyPart::Text {
                text: turn.reply,
                ignored: false,
            }],
        })
    }

    async fn subscribe(&self, _cancel: CancellationToken) -> Result<EventStream> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        *self.events_tx.lock() = Some(tx);
        Ok(Box::pin(futures::stream::poll_fn(move |cx| {
            rx.poll_recv(cx)
        })))
    }

    async fn respond_permission(
        &self,
        session_id: &str,
        permission_id: &str,
        decision: PermissionDecision,
    ) -> Result<()> {
        self.permissions.lock().push((
            session_id.to_string(),
            permission_id.to_string(),
            decision,
        ));
        Ok(())
    }
}
