//! Keeps channel typing indicators alive while a run is busy.

use crate::adapter::AdapterMap;
use botbridge_core::ChannelId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Typing indicators expire quickly on most platforms, so one call per
/// interval keeps the indicator visibly alive.
const TYPING_INTERVAL: Duration = Duration::from_secs(6);

/// Runs one typing refresh loop per active session.
///
/// The first indicator goes out immediately on [`start`](Self::start);
/// the loop then refreshes on a fixed cadence until [`stop`](Self::stop).
/// Starting an already-running session is a no-op, so callers fire
/// `start` on every busy signal without tracking state themselves.
pub struct TypingManager {
    adapters: Arc<AdapterMap>,
    loops: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TypingManager {
    pub fn new(adapters: Arc<AdapterMap>) -> Self {
        Self {
            adapters,
            loops: Mutex::new(HashMap::new()),
        }
    }

    /// Start the refresh loop for a session. No-op when the adapter is
    /// missing, lacks the typing capability, or the loop already runs.
    pub fn start(&self, session_id: &str, channel: ChannelId, peer_id: &str) {
        let Some(adapter) = self.adapters.get(&channel) else {
            return;
        };
        if !adapter.capabilities().typing {
            return;
        }

        let mut loops = self.loops.lock();
        if let Some(handle) = loops.get(session_id) {
            if !handle.is_finished() {
                return;
            }
        }

        debug!(session = session_id, channel = %channel, peer = peer_id, "typing loop started");
        let adapter = Arc::clone(adapter);
        let peer = peer_id.to_string();
        let session = session_id.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(TYPING_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = adapter.send_typing(&peer).await {
                    warn!(session = %session, channel = %channel, error = %err, "typing send failed");
                }
            }
        });
        loops.insert(session_id.to_string(), handle);
    }

    /// Stop the refresh loop for a session, if one runs.
    pub fn stop(&self, session_id: &str) {
        if let Some(handle) = self.loops.lock().remove(session_id) {
            handle.abort();
            debug!(session = session_id, "typing loop stopped");
        }
    }

    /// Stop every running loop.
    pub fn stop_all(&self) {
        let mut loops = self.loops.lock();
        for (_, handle) in loops.drain() {
            handle.abort();
        }
    }
}

impl Drop for TypingManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}
