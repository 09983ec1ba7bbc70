//! Per-session run state and the registry that owns it.

pub mod registry;
pub mod run_state;
