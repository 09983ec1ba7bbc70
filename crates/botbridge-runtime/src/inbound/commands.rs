//! Slash commands handled by the bridge itself, without a backend run.

use crate::outbound::OutboundDispatcher;
use crate::session_store::SessionStore;
use botbridge_core::{BridgeConfig, ChannelId, ModelRef, ModelStore, Result, SendTextOptions};
use std::sync::Arc;
use tracing::info;

const HELP_TEXT: &str = "/model - show current model\n\
/model <provider>/<model> - switch model for this chat\n\
/reset - start a fresh session\n\
/help - this";

/// Executes administrative slash commands.
///
/// Commands reply directly through the outbound dispatcher; an unknown
/// command is not an error, it falls through to the backend as a normal
/// message. Command failures are reported as chat replies too.
pub struct CommandService {
    config: BridgeConfig,
    store: Arc<dyn SessionStore>,
    models: Arc<ModelStore>,
    outbound: Arc<OutboundDispatcher>,
}

impl CommandService {
    pub fn new(
        config: BridgeConfig,
        store: Arc<dyn SessionStore>,
        models: Arc<ModelStore>,
        outbound: Arc<OutboundDispatcher>,
    ) -> Self {
        Self {
            config,
            store,
            models,
            outbound,
        }
    }

    /// Handle `text` if it is a recognized command.
    ///
    /// Returns `true` when the command was handled (including a handled
    /// usage error), `false` when the text should go to the backend.
    pub async fn maybe_handle(
        &self,
        channel: ChannelId,
        peer_key: &str,
        reply_peer_id: &str,
        text: &str,
    ) -> Result<bool> {
        let Some(rest) = text.strip_prefix('/') else {
            return Ok(false);
        };
        let mut words = rest.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(false);
        };

        match command.to_lowercase().as_str() {
            "model" => {
                match words.next() {
                    None => {
                        let current = self
                            .models
                            .get(channel, peer_key, self.config.model.as_ref());
                        let label = current
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "default".to_string());
                        self.reply(channel, reply_peer_id, &format!("Current model: {label}"))
                            .await?;
                    }
                    Some(spec) => match ModelRef::parse(spec) {
                        Some(model) => {
                            self.models.set(channel, peer_key, model.clone());
                            info!(channel = %channel, peer = peer_key, model = %model, "model switched via command");
                            self.reply(
                                channel,
                                reply_peer_id,
                                &format!("Model switched to {model}"),
                            )
                            .await?;
                        }
                        None => {
                            self.reply(channel, reply_peer_id, "Usage: /model <provider>/<model>")
                                .await?;
                        }
                    },
                }
                Ok(true)
            }
            "reset" => {
                self.models.clear(channel, peer_key);
                self.store.delete_session(channel, peer_key);
                info!(channel = %channel, peer = peer_key, "session and model reset");
                self.reply(
                    channel,
                    reply_peer_id,
                    "Session and model reset. Send a message to start fresh.",
                )
                .await?;
                Ok(true)
            }
            "help" => {
                self.reply(channel, reply_peer_id, HELP_TEXT).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reply(&self, channel: ChannelId, peer_id: &str, text: &str) -> Result<()> {
        self.outbound
            .send_text(channel, peer_id, text, SendTextOptions::default())
            .await
    }
}
