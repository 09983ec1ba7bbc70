//! Bridge configuration snapshot.
//!
//! The bridge never loads configuration itself; a host process hands it a
//! read-only [`BridgeConfig`] at composition time.

use crate::channel::ChannelId;
use crate::model::ModelRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Policy applied when the backend asks for tool permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    /// Auto-approve permission requests.
    #[default]
    Allow,

    /// Auto-reject permission requests and notify the peer.
    Deny,
}

/// How much reasoning output a channel surfaces to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkingMode {
    /// No thinking notices.
    #[default]
    Off,

    /// One "Thinking..." notice per run, one "Done." at idle.
    Summary,

    /// Summary notices plus raw reasoning text for debugging.
    RawDebug,
}

/// Read-only configuration snapshot for a bridge instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Channels the bridge accepts traffic from.
    #[serde(default)]
    pub enabled_channels: Vec<ChannelId>,

    /// Whether group chats are bridged in addition to direct messages.
    #[serde(default)]
    pub groups_enabled: bool,

    /// Policy for backend permission requests.
    #[serde(default)]
    pub permission_mode: PermissionMode,

    /// Whether tool progress notifications are sent to peers.
    #[serde(default = "default_true")]
    pub tool_updates_enabled: bool,

    /// Character limit for tool output excerpts and debug dumps.
    #[serde(default = "default_tool_output_limit")]
    pub tool_output_limit: usize,

    /// Per-channel thinking-notice mode; absent channels are `Off`.
    #[serde(default)]
    pub thinking_modes: HashMap<ChannelId, ThinkingMode>,

    /// Default model used when a peer has no override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRef>,
}

fn default_true() -> bool {
    true
}

fn default_tool_output_limit() -> usize {
    1500
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled_channels: ChannelId::ALL.to_vec(),
            groups_enabled: false,
            permission_mode: PermissionMode::default(),
            tool_updates_enabled: true,
            tool_output_limit: default_tool_output_limit(),
            thinking_modes: HashMap::new(),
            model: None,
        }
    }
}

impl BridgeConfig {
    /// Whether a channel is enabled.
    pub fn channel_enabled(&self, channel: ChannelId) -> bool {
        self.enabled_channels.contains(&channel)
    }

    /// Thinking mode for a channel, `Off` when unset.
    pub fn thinking_mode(&self, channel: ChannelId) -> ThinkingMode {
        self.thinking_modes
            .get(&channel)
            .copied()
            .unwrap_or_default()
    }
}
