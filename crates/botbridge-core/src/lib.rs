//! # botbridge-core
//!
//! Shared types for the BotBridge multi-channel agent bridge.
//!
//! This crate holds everything the runtime and its collaborators need to
//! agree on:
//!
//! - **Channel identity**: the [`ChannelId`] enum used as a map key everywhere
//! - **Messages**: inbound/outbound message types and the reporter callbacks
//! - **Events**: the typed event stream emitted by the agent backend
//! - **Models**: model references and the per-peer override store
//! - **Configuration**: the read-only config snapshot the bridge runs against

pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod message;
pub mod model;
pub mod text;

pub use channel::ChannelId;
pub use config::{BridgeConfig, PermissionMode, ThinkingMode};
pub use error::BridgeError;
pub use event::{
    AgentEvent, MessageInfo, MessagePart, MessageRole, SessionStatus, ToolState, ToolStatus,
};
pub use message::{
    InboundMessage, OutboundKind, OutboundRecord, Reporter, SendTextOptions,
};
pub use model::{ModelRef, ModelStore};

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
