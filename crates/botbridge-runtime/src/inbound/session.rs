//! Session resolution: bind a peer to an existing or fresh backend session.

use crate::backend::BackendClient;
use crate::outbound::OutboundDispatcher;
use crate::session_store::SessionStore;
use botbridge_core::{InboundMessage, Reporter, Result, SendTextOptions};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a session lookup.
pub struct ResolvedSession {
    /// The backend session bound to the peer.
    pub session_id: String,

    /// Whether an existing binding was reused.
    pub reused: bool,
}

/// Resolves `(channel, peer)` pairs to backend sessions, creating and
/// announcing new ones on first contact.
pub struct SessionBindingService {
    backend: Arc<dyn BackendClient>,
    store: Arc<dyn SessionStore>,
    outbound: Arc<OutboundDispatcher>,
    reporter: Option<Arc<dyn Reporter>>,
}

impl SessionBindingService {
    pub fn new(
        backend: Arc<dyn BackendClient>,
        store: Arc<dyn SessionStore>,
        outbound: Arc<OutboundDispatcher>,
        reporter: Option<Arc<dyn Reporter>>,
    ) -> Self {
        Self {
            backend,
            store,
            outbound,
            reporter,
        }
    }

    /// Look up the peer's session, creating one when none is bound.
    pub async fn resolve_session(
        &self,
        message: &InboundMessage,
        peer_key: &str,
    ) -> Result<ResolvedSession> {
        if let Some(session_id) = self.store.lookup_session(message.channel, peer_key) {
            debug!(
                session = %session_id,
                channel = %message.channel,
                peer = peer_key,
                reused = true,
                "session resolved"
            );
            return Ok(ResolvedSession {
                session_id,
                reused: true,
            });
        }

        let title = format!("bridge {} {}", message.channel, peer_key);
        let session_id = self.backend.create_session(&title).await?;
        self.store
            .upsert_session(message.channel, peer_key, &session_id);
        info!(
            session = %session_id,
            channel = %message.channel,
            peer = peer_key,
            "session created"
        );

        if let Some(reporter) = &self.reporter {
            reporter.on_status(&format!(
                "{} session created for {} (ID: {}).",
                message.channel.label(),
                peer_key,
                session_id
            ));
        }
        self.outbound
            .send_text(
                message.channel,
                &message.peer_id,
                "\u{1F9ED} Session started.",
                SendTextOptions::default(),
            )
            .await?;

        Ok(ResolvedSession {
            session_id,
            reused: false,
        })
    }
}
