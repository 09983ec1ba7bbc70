//! One enqueued run: prompt the backend and deliver the reply.

use crate::backend::BackendClient;
use crate::outbound::OutboundDispatcher;
use crate::reporting::RunReporter;
use crate::state::registry::SessionRunRegistry;
use crate::state::run_state::RunState;
use crate::stream::coordinator::StreamCoordinatorRegistry;
use crate::typing::TypingManager;
use botbridge_core::{
    BridgeConfig, InboundMessage, ModelStore, Result, SendTextOptions,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Executes one run task end to end.
///
/// A run registers its state, reports thinking, starts the typing loop,
/// prompts the backend with the peer's resolved model, and delivers the
/// reply through the channel's stream coordinator (falling back to a
/// regular send). Whatever happens, the run is finalized: typing stopped,
/// coordinator state cleared, done reported, run state dropped.
pub struct RunExecutionService {
    config: BridgeConfig,
    backend: Arc<dyn BackendClient>,
    registry: Arc<SessionRunRegistry>,
    typing: Arc<TypingManager>,
    coordinators: Arc<StreamCoordinatorRegistry>,
    models: Arc<ModelStore>,
    reporter: Arc<RunReporter>,
    outbound: Arc<OutboundDispatcher>,
}

impl RunExecutionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: BridgeConfig,
        backend: Arc<dyn BackendClient>,
        registry: Arc<SessionRunRegistry>,
        typing: Arc<TypingManager>,
        coordinators: Arc<StreamCoordinatorRegistry>,
        models: Arc<ModelStore>,
        reporter: Arc<RunReporter>,
        outbound: Arc<OutboundDispatcher>,
    ) -> Self {
        Self {
            config,
            backend,
            registry,
            typing,
            coordinators,
            models,
            reporter,
            outbound,
        }
    }

    /// Run the prompt for an inbound message on its bound session.
    pub async fn execute(
        &self,
        message: &InboundMessage,
        peer_key: &str,
        session_id: &str,
    ) -> Result<()> {
        let run = Arc::new(RunState::new(
            session_id,
            message.channel,
            &message.peer_id,
            self.config.tool_updates_enabled,
        ));
        self.registry.insert(Arc::clone(&run));
        self.reporter.report_thinking(&run);
        self.typing.start(session_id, run.channel, &run.peer_id);

        let result = self.prompt_and_deliver(&run, message, peer_key).await;

        self.typing.stop(session_id);
        self.coordinators
            .get(run.channel)
            .clear_session(session_id);
        self.reporter.report_done(&run);
        self.registry.remove(session_id);

        result
    }

    async fn prompt_and_deliver(
        &self,
        run: &RunState,
        message: &InboundMessage,
        peer_key: &str,
    ) -> Result<()> {
        let model = self
            .models
            .get(message.channel, peer_key, self.config.model.as_ref());
        debug!(
            session = %run.session_id,
            length = message.text.len(),
            model = model.as_ref().map(|m| m.to_string()).unwrap_or_default(),
            "prompt start"
        );

        let reply = match self
            .backend
            .prompt(&run.session_id, &message.text, model.as_ref())
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                error!(session = %run.session_id, error = %err, "prompt failed");
                return self
                    .outbound
                    .send_text(
                        run.channel,
                        &run.peer_id,
                        &format!("Agent request failed: {err}"),
                        SendTextOptions::default(),
                    )
                    .await;
            }
        };

        let text = reply.reply_text();
        if text.is_empty() {
            debug!(session = %run.session_id, "reply empty");
            return self
                .outbound
                .send_text(
                    run.channel,
                    &run.peer_id,
                    "No response generated. Try again.",
                    SendTextOptions::default(),
                )
                .await;
        }

        self.deliver_reply(run, &text).await
    }

    /// Deliver the final reply without ever sending it twice.
    async fn deliver_reply(&self, run: &RunState, reply: &str) -> Result<()> {
        let coordinator = self.coordinators.get(run.channel);
        let streamed_before = coordinator.has_streamed_message(&run.session_id);
        if coordinator
            .finalize_reply(&run.session_id, &run.peer_id, reply)
            .await
        {
            debug!(
                session = %run.session_id,
                length = reply.len(),
                "reply finalized by stream coordinator"
            );
            return Ok(());
        }

        // When streamed output already reached the peer but finalization
        // could not complete, a full resend would duplicate the prefix.
        if streamed_before || coordinator.has_streamed_message(&run.session_id) {
            warn!(
                session = %run.session_id,
                length = reply.len(),
                "stream finalization failed, skipping fallback send"
            );
            return Ok(());
        }

        if let Some(telegram) = run.telegram() {
            telegram.suppress_streaming();
            debug!(
                session = %run.session_id,
                "stream finalization unavailable, falling back to regular send"
            );
        }
        self.outbound
            .send_text(run.channel, &run.peer_id, reply, SendTextOptions::reply())
            .await
    }
}
