//! Event-stream consumption: router, per-channel coordinators and hooks.

pub mod coordinator;
pub mod hooks;
pub mod router;
pub mod telegram;
pub mod telegram_hooks;
pub mod tool_notifier;
