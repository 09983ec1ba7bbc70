//! # botbridge-runtime
//!
//! The event-routing and session-concurrency runtime of BotBridge.
//!
//! One long-running agent backend serves many independent chat
//! conversations. This crate owns everything between a channel adapter
//! handing over an inbound message and the outbound text arriving back on
//! the channel:
//!
//! - **Inbound pipeline**: dedup, slash-command interception, session
//!   binding, run task enqueue
//! - **Session run registry**: per-session serialized task queues and the
//!   live run state map
//! - **Event stream router**: the single consumer of the backend's shared
//!   event stream
//! - **Stream coordinators / channel hooks**: per-channel pluggable
//!   behavior with no-op defaults
//! - **Typing manager** and **outbound dispatcher**

pub mod adapter;
pub mod backend;
pub mod bridge;
pub mod inbound;
pub mod outbound;
pub mod reporting;
pub mod session_store;
pub mod state;
pub mod stream;
pub mod typing;

pub use adapter::{AdapterCapabilities, AdapterMap, ChannelAdapter};
pub use backend::{BackendClient, EventStream, PermissionDecision, PromptReply, ReplyPart};
pub use bridge::{Bridge, BridgeBuilder};
pub use inbound::commands::CommandService;
pub use inbound::dedup::TelegramInboundDeduper;
pub use inbound::pipeline::{InboundPipeline, InboundPipelineDeps};
pub use inbound::run::RunExecutionService;
pub use inbound::session::SessionBindingService;
pub use outbound::OutboundDispatcher;
pub use reporting::{RunReporter, SessionModelMap};
pub use session_store::{InMemorySessionStore, SessionStore};
pub use state::registry::SessionRunRegistry;
pub use state::run_state::{ChannelRunState, RunState, TelegramRunState};
pub use stream::coordinator::{NoopStreamCoordinator, StreamCoordinator, StreamCoordinatorRegistry};
pub use stream::hooks::{ChannelHooks, ChannelHooksRegistry, DefaultChannelHooks};
pub use stream::router::{EventRouter, EventRouterDeps};
pub use stream::telegram::TelegramStreamCoordinator;
pub use stream::telegram_hooks::TelegramChannelHooks;
pub use stream::tool_notifier::ToolUpdateNotifier;
pub use typing::TypingManager;

pub use botbridge_core::{BridgeError, Result};

#[cfg(test)]
pub(crate) mod testutil;
