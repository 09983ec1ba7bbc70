//! Live state of one backend session's current turn.

use botbridge_core::{ChannelId, ToolStatus};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// Host-status lifecycle flags for a run.
#[derive(Debug, Default)]
pub struct RunLifecycle {
    /// Last "Thinking" label reported for this run.
    pub thinking_label: Option<String>,

    /// Whether a thinking status line is currently active.
    pub thinking_active: bool,
}

/// Telegram-specific run state.
///
/// Mutated concurrently by the router task and the run task, so the
/// fields are individually synchronized rather than the whole struct.
#[derive(Debug, Default)]
pub struct TelegramRunState {
    streaming_suppressed: AtomicBool,
    thinking_notice_sent: AtomicBool,
    seen_reasoning_parts: Mutex<HashSet<String>>,
}

impl TelegramRunState {
    /// Whether progressive streaming is suppressed for this run.
    pub fn streaming_suppressed(&self) -> bool {
        self.streaming_suppressed.load(Ordering::Acquire)
    }

    /// Suppress progressive streaming (the reply went out as a regular
    /// send instead).
    pub fn suppress_streaming(&self) {
        self.streaming_suppressed.store(true, Ordering::Release);
    }

    /// Mark the thinking notice as sent. Returns `true` on the first
    /// call of the run, `false` afterwards.
    pub fn mark_thinking_notice(&self) -> bool {
        !self.thinking_notice_sent.swap(true, Ordering::AcqRel)
    }

    /// Whether a thinking notice went out this run.
    pub fn thinking_notice_sent(&self) -> bool {
        self.thinking_notice_sent.load(Ordering::Acquire)
    }

    /// Clear the thinking-notice flag (after the done notice).
    pub fn reset_thinking_notice(&self) {
        self.thinking_notice_sent.store(false, Ordering::Release);
    }

    /// Record a reasoning part id. Returns `true` the first time the
    /// part is seen.
    pub fn record_reasoning_part(&self, part_id: &str) -> bool {
        self.seen_reasoning_parts.lock().insert(part_id.to_string())
    }
}

/// Channel-specific portion of a run, tagged by channel.
#[derive(Debug)]
pub enum ChannelRunState {
    /// No channel-specific state.
    Generic,

    /// Telegram streaming and notice flags.
    Telegram(TelegramRunState),
}

/// Live state of one backend session's current turn.
///
/// Created when a run starts, removed when the session goes idle or the
/// run finishes. At most one exists per live session id.
#[derive(Debug)]
pub struct RunState {
    /// Backend session id the run is bound to.
    pub session_id: String,

    /// Originating channel.
    pub channel: ChannelId,

    /// Peer the reply goes back to.
    pub peer_id: String,

    /// Whether tool progress notifications are sent for this run.
    pub tool_updates_enabled: bool,

    seen_tool_states: Mutex<HashMap<String, ToolStatus>>,
    lifecycle: Mutex<RunLifecycle>,
    channel_state: ChannelRunState,
}

impl RunState {
    /// Create run state for a session; Telegram gets its variant.
    pub fn new(
        session_id: impl Into<String>,
        channel: ChannelId,
        peer_id: impl Into<String>,
        tool_updates_enabled: bool,
    ) -> Self {
        let channel_state = match channel {
            ChannelId::Telegram => ChannelRunState::Telegram(TelegramRunState::default()),
            _ => ChannelRunState::Generic,
        };
        Self {
            session_id: session_id.into(),
            channel,
            peer_id: peer_id.into(),
            tool_updates_enabled,
            seen_tool_states: Mutex::new(HashMap::new()),
            lifecycle: Mutex::new(RunLifecycle::default()),
            channel_state,
        }
    }

    /// Type-narrowing accessor for the Telegram payload.
    pub fn telegram(&self) -> Option<&TelegramRunState> {
        match &self.channel_state {
            ChannelRunState::Telegram(state) => Some(state),
            ChannelRunState::Generic => None,
        }
    }

    /// Record a tool call status observation.
    ///
    /// Returns `true` when the status is new for this call id (first
    /// observation or a change), `false` when unchanged.
    pub fn record_tool_status(&self, call_id: &str, status: ToolStatus) -> bool {
        let mut seen = self.seen_tool_states.lock();
        match seen.get(call_id) {
            Some(previous) if *previous == status => false,
            _ => {
                seen.insert(call_id.to_string(), status);
                true
            }
        }
    }

    /// Activate the thinking status with `label`.
    ///
    /// Returns `false` when the identical label is already active, so
    /// callers can skip duplicate status lines.
    pub fn begin_thinking(&self, label: &str) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.thinking_active && lifecycle.thinking_label.as_deref() == Some(label) {
            return false;
        }
        lifecycle.thinking_label = Some(label.to_string());
        lifecycle.thinking_active = true;
        true
    }

    /// Deactivate the thinking status. Returns whether it was active.
    pub fn end_thinking(&self) -> bool {
        let mut lifecycle = self.lifecycle.lock();
        std::mem::take(&mut lifecycle.thinking_active)
    }
}
