//! Shared test fixtures: recording adapters and a scripted backend.

use crate::adapter::{AdapterCapabilities, AdapterMap, ChannelAdapter};
use crate::backend::{BackendClient, EventStream, PermissionDecision, PromptReply, ReplyPart};
use async_trait::async_trait;
use botbridge_core::{AgentEvent, BridgeError, ChannelId, ModelRef, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A send observed by a [`RecordingAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentItem {
    Text { peer_id: String, text: String },
    Typing { peer_id: String },
    File { peer_id: String, path: String },
}

/// Adapter that records every call instead of talking to a wire.
pub struct RecordingAdapter {
    channel: ChannelId,
    capabilities: AdapterCapabilities,
    max_text_length: usize,
    sent: Mutex<Vec<SentItem>>,
    fail_sends: Mutex<bool>,
    start_count: AtomicUsize,
    stop_count: AtomicUsize,
}

impl RecordingAdapter {
    pub fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            capabilities: AdapterCapabilities::default(),
            max_text_length: 4096,
            sent: Mutex::new(Vec::new()),
            fail_sends: Mutex::new(false),
            start_count: AtomicUsize::new(0),
            stop_count: AtomicUsize::new(0),
        }
    }

    pub fn with_typing_support(mut self) -> Self {
        self.capabilities.typing = true;
        self
    }

    pub fn with_file_support(mut self) -> Self {
        self.capabilities.file = true;
        self
    }

    pub fn with_progress_support(mut self) -> Self {
        self.capabilities.progress = true;
        self
    }

    pub fn with_max_text_length(mut self, max: usize) -> Self {
        self.max_text_length = max;
        self
    }

    /// Make subsequent sends fail with an adapter error.
    pub fn fail_sends(&self, fail: bool) {
        *self.fail_sends.lock() = fail;
    }

    pub fn sent(&self) -> Vec<SentItem> {
        self.sent.lock().clone()
    }

    /// Text sends only, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|item| match item {
                SentItem::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn typing_count(&self) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|item| matches!(item, SentItem::Typing { .. }))
            .count()
    }

    pub fn start_count(&self) -> usize {
        self.start_count.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<()> {
        if *self.fail_sends.lock() {
            Err(BridgeError::adapter(self.channel.as_str(), "injected failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChannelAdapter for RecordingAdapter {
    fn channel(&self) -> ChannelId {
        self.channel
    }

    fn capabilities(&self) -> AdapterCapabilities {
        self.capabilities
    }

    fn max_text_length(&self) -> usize {
        self.max_text_length
    }

    async fn start(&self) -> Result<()> {
        self.start_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_text(&self, peer_id: &str, text: &str) -> Result<()> {
        self.check_failure()?;
        self.sent.lock().push(SentItem::Text {
            peer_id: peer_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_typing(&self, peer_id: &str) -> Result<()> {
        self.check_failure()?;
        self.sent.lock().push(SentItem::Typing {
            peer_id: peer_id.to_string(),
        });
        Ok(())
    }

    async fn send_file(&self, peer_id: &str, path: &str) -> Result<()> {
        self.check_failure()?;
        self.sent.lock().push(SentItem::File {
            peer_id: peer_id.to_string(),
            path: path.to_string(),
        });
        Ok(())
    }
}

/// Build an adapter map from recording adapters.
pub fn adapter_map<const N: usize>(adapters: [Arc<RecordingAdapter>; N]) -> Arc<AdapterMap> {
    let mut map = AdapterMap::new();
    for adapter in adapters {
        map.insert(adapter.channel(), adapter as Arc<dyn ChannelAdapter>);
    }
    Arc::new(map)
}

/// A prompt call observed by [`ScriptedBackend`].
#[derive(Debug, Clone)]
pub struct PromptCall {
    pub session_id: String,
    pub text: String,
    pub model: Option<ModelRef>,
}

/// Backend that replies from a script and records every call.
pub struct ScriptedBackend {
    replies: Mutex<Vec<Result<PromptReply>>>,
    prompts: Mutex<Vec<PromptCall>>,
    permissions: Mutex<Vec<(String, String, PermissionDecision)>>,
    created: AtomicUsize,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            permissions: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
        }
    }

    /// Queue a successful text reply.
    pub fn push_reply(&self, text: &str) {
        self.replies.lock().push(Ok(PromptReply {
            parts: vec![ReplyPart::Text {
                text: text.to_string(),
                ignored: false,
            }],
        }));
    }

    /// Queue a prompt failure.
    pub fn push_error(&self, message: &str) {
        self.replies.lock().push(Err(BridgeError::backend(message)));
    }

    pub fn prompts(&self) -> Vec<PromptCall> {
        self.prompts.lock().clone()
    }

    pub fn permissions(&self) -> Vec<(String, String, PermissionDecision)> {
        self.permissions.lock().clone()
    }
}

#[async_trait]
impl BackendClient for ScriptedBackend {
    async fn create_session(&self, _title: &str) -> Result<String> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(format!("ses_{}", n + 1))
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
        let mut replies = self.replies.lock();
        if replies.is_empty() {
            Ok(PromptReply::default())
        } else {
            replies.remove(0)
        }
    }

    async fn subscribe(&self, _cancel: CancellationToken) -> Result<EventStream> {
        Ok(Box::pin(futures::stream::empty::<AgentEvent>()))
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
