//! The single consumer of the backend event stream.

use crate::backend::{BackendClient, EventStream, PermissionDecision};
use crate::outbound::OutboundDispatcher;
use crate::reporting::RunReporter;
use crate::state::registry::SessionRunRegistry;
use crate::stream::coordinator::StreamCoordinatorRegistry;
use crate::stream::hooks::{ChannelHooksRegistry, HookContext};
use crate::stream::tool_notifier::ToolUpdateNotifier;
use crate::typing::TypingManager;
use botbridge_core::{
    AgentEvent, BridgeConfig, MessageInfo, MessagePart, MessageRole, PermissionMode, Result,
    SendTextOptions, SessionStatus,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Everything the router needs to dispatch one event.
pub struct EventRouterDeps {
    pub config: BridgeConfig,
    pub backend: Arc<dyn BackendClient>,
    pub registry: Arc<SessionRunRegistry>,
    pub typing: Arc<TypingManager>,
    pub coordinators: Arc<StreamCoordinatorRegistry>,
    pub hooks: Arc<ChannelHooksRegistry>,
    pub outbound: Arc<OutboundDispatcher>,
    pub reporter: Arc<RunReporter>,
}

/// Demultiplexes backend events onto per-session run state.
///
/// Exactly one task drives [`run`](Self::run) per subscription; events
/// are processed strictly in arrival order, one fully handled before the
/// next begins. Handler failures are logged with session context and
/// never stop the stream.
pub struct EventRouter {
    deps: EventRouterDeps,
    tool_notifier: ToolUpdateNotifier,
}

impl EventRouter {
    pub fn new(deps: EventRouterDeps) -> Self {
        let tool_notifier = ToolUpdateNotifier::new(&deps.config);
        Self {
            deps,
            tool_notifier,
        }
    }

    /// Consume the stream until it ends or `cancel` fires. The current
    /// event finishes before the loop exits.
    pub async fn run(&self, mut stream: EventStream, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = stream.next() => {
                    let Some(event) = event else { break };
                    self.route(&event).await;
                }
            }
        }
        debug!("event stream consumer stopped");
    }

    /// Dispatch one event; failures are logged here, never propagated.
    pub async fn route(&self, event: &AgentEvent) {
        if let Err(err) = self.dispatch(event).await {
            warn!(
                session = event.session_id().unwrap_or("-"),
                error = %err,
                "event handler failed"
            );
        }
    }

    async fn dispatch(&self, event: &AgentEvent) -> Result<()> {
        match event {
            AgentEvent::MessageUpdated { info } => self.handle_message_updated(info).await,
            AgentEvent::MessagePartDelta {
                session_id,
                message_id,
                part_id,
                delta,
            } => {
                self.handle_message_part_delta(session_id, message_id, part_id, delta)
                    .await
            }
            AgentEvent::MessagePartUpdated { part } => {
                self.handle_message_part_updated(part).await
            }
            AgentEvent::SessionStatus { session_id, status } => {
                self.handle_session_status(session_id, *status).await
            }
            AgentEvent::SessionIdle { session_id } => self.handle_session_idle(session_id).await,
            AgentEvent::PermissionAsked {
                session_id,
                permission_id,
            } => self.handle_permission_asked(session_id, permission_id).await,
            AgentEvent::SessionCreated { .. } => Ok(()),
        }
    }

    async fn handle_message_updated(&self, info: &MessageInfo) -> Result<()> {
        let run = self.deps.registry.get(&info.session_id);
        if let Some(run) = &run {
            self.deps
                .coordinators
                .get(run.channel)
                .on_message_updated(info);
        }

        // User messages carry the requested model; remember it for
        // status lines.
        if info.role == MessageRole::User {
            if let Some(model) = &info.model {
                self.deps
                    .reporter
                    .models()
                    .record(&info.session_id, model.clone());
                if let Some(run) = &run {
                    self.deps.reporter.report_thinking(run);
                }
            }
        }
        Ok(())
    }

    async fn handle_message_part_delta(
        &self,
        session_id: &str,
        message_id: &str,
        part_id: &str,
        delta: &str,
    ) -> Result<()> {
        let Some(run) = self.deps.registry.get(session_id) else {
            return Ok(());
        };
        self.deps
            .coordinators
            .get(run.channel)
            .on_message_part_delta(session_id, message_id, part_id, delta)
            .await;
        Ok(())
    }

    async fn handle_message_part_updated(&self, part: &MessagePart) -> Result<()> {
        let Some(run) = self.deps.registry.get(part.session_id()) else {
            return Ok(());
        };

        self.deps
            .coordinators
            .get(run.channel)
            .on_message_part_updated(part)
            .await;

        let ctx = HookContext {
            run: &run,
            config: &self.deps.config,
            outbound: &self.deps.outbound,
        };
        self.deps
            .hooks
            .get(run.channel)
            .on_message_part_updated(&ctx, part)
            .await?;

        self.tool_notifier
            .notify(&run, part, &self.deps.outbound)
            .await
    }

    async fn handle_session_status(&self, session_id: &str, status: SessionStatus) -> Result<()> {
        match status {
            SessionStatus::Busy | SessionStatus::Retry => {
                if let Some(run) = self.deps.registry.get(session_id) {
                    self.deps.reporter.report_thinking(&run);
                    self.deps.typing.start(session_id, run.channel, &run.peer_id);
                }
                Ok(())
            }
            SessionStatus::Idle => self.handle_session_idle(session_id).await,
        }
    }

    async fn handle_session_idle(&self, session_id: &str) -> Result<()> {
        let Some(run) = self.deps.registry.get(session_id) else {
            // No live run; just make sure no stray typing loop survives.
            self.deps.typing.stop(session_id);
            return Ok(());
        };

        self.deps
            .coordinators
            .get(run.channel)
            .on_session_idle(session_id)
            .await;
        self.deps.typing.stop(session_id);

        let ctx = HookContext {
            run: &run,
            config: &self.deps.config,
            outbound: &self.deps.outbound,
        };
        self.deps.hooks.get(run.channel).on_session_idle(&ctx).await?;

        self.deps.reporter.report_done(&run);
        self.deps.registry.remove(session_id);
        Ok(())
    }

    async fn handle_permission_asked(&self, session_id: &str, permission_id: &str) -> Result<()> {
        let decision = match self.deps.config.permission_mode {
            PermissionMode::Deny => PermissionDecision::Reject,
            PermissionMode::Allow => PermissionDecision::Always,
        };
        self.deps
            .backend
            .respond_permission(session_id, permission_id, decision)
            .await?;

        if decision != PermissionDecision::Reject {
            return Ok(());
        }
        let Some(run) = self.deps.registry.get(session_id) else {
            return Ok(());
        };
        self.deps
            .outbound
            .send_text(
                run.channel,
                &run.peer_id,
                "Permission denied. Update configuration to allow tools.",
                SendTextOptions::default(),
            )
            .await
    }
}
