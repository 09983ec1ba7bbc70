//! The inbound pipeline: from adapter handoff to an enqueued run.

use crate::adapter::AdapterMap;
use crate::inbound::commands::CommandService;
use crate::inbound::dedup::TelegramInboundDeduper;
use crate::inbound::run::RunExecutionService;
use crate::inbound::session::SessionBindingService;
use crate::session_store::SessionStore;
use crate::state::registry::SessionRunRegistry;
use botbridge_core::text::truncate_text;
use botbridge_core::{BridgeConfig, InboundMessage, Reporter, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything the pipeline needs to turn an inbound message into work.
pub struct InboundPipelineDeps {
    pub config: BridgeConfig,
    pub adapters: Arc<AdapterMap>,
    pub store: Arc<dyn SessionStore>,
    pub registry: Arc<SessionRunRegistry>,
    pub deduper: Arc<TelegramInboundDeduper>,
    pub commands: Arc<CommandService>,
    pub sessions: Arc<SessionBindingService>,
    pub runner: Arc<RunExecutionService>,
    pub reporter: Option<Arc<dyn Reporter>>,
}

/// Converts an inbound message into exactly one of: a dropped duplicate,
/// a handled command, or a bound session with an enqueued run task.
pub struct InboundPipeline {
    deps: InboundPipelineDeps,
}

impl InboundPipeline {
    pub fn new(deps: InboundPipelineDeps) -> Self {
        Self { deps }
    }

    /// Handle one inbound message. The run task it may enqueue executes
    /// asynchronously on the session's queue.
    pub async fn handle_inbound(&self, message: InboundMessage) -> Result<()> {
        if !self.deps.adapters.contains_key(&message.channel) {
            return Ok(());
        }
        if !self.deps.config.channel_enabled(message.channel) {
            debug!(channel = %message.channel, "channel disabled, inbound dropped");
            return Ok(());
        }
        if message.from_me {
            return Ok(());
        }
        if self.deps.deduper.is_duplicate(&message) {
            debug!(
                channel = %message.channel,
                peer = %message.peer_id,
                "duplicate inbound ignored"
            );
            return Ok(());
        }

        info!(
            channel = %message.channel,
            peer = %message.peer_id,
            length = message.text.len(),
            preview = %truncate_text(message.text.trim(), 120),
            "received message"
        );

        let peer_key = message.peer_id.clone();
        let trimmed = message.text.trim();
        if trimmed.starts_with('/') {
            let handled = self
                .deps
                .commands
                .maybe_handle(message.channel, &peer_key, &message.peer_id, trimmed)
                .await?;
            if handled {
                return Ok(());
            }
        }

        if let Some(reporter) = &self.deps.reporter {
            reporter.on_inbound(&message);
        }

        let resolved = self.deps.sessions.resolve_session(&message, &peer_key).await?;
        let session_id = resolved.session_id;

        let runner = Arc::clone(&self.deps.runner);
        let task_session = session_id.clone();
        self.deps.registry.enqueue(&session_id, async move {
            runner.execute(&message, &peer_key, &task_session).await
        });
        Ok(())
    }

    /// Handle one inbound message and wait for the run it triggered.
    ///
    /// The entry point adapters use; logs failures instead of returning
    /// them so a broken message never takes the adapter loop down.
    pub async fn dispatch_inbound(&self, message: InboundMessage) {
        let channel = message.channel;
        let peer_key = message.peer_id.clone();
        if let Err(err) = self.handle_inbound(message).await {
            warn!(channel = %channel, peer = %peer_key, error = %err, "inbound handling failed");
            return;
        }

        let pending = self
            .deps
            .store
            .lookup_session(channel, &peer_key)
            .and_then(|session_id| self.deps.registry.pending_task(&session_id));
        if let Some(pending) = pending {
            pending.await;
        }
    }
}
