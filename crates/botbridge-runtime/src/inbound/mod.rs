//! Inbound handling: dedup, commands, session binding, run execution.

pub mod commands;
pub mod dedup;
pub mod pipeline;
pub mod run;
pub mod session;
