//! Telegram inbound duplicate detection.
//!
//! Telegram redelivers updates after reconnects, so inbound messages are
//! keyed by `chat id:message id` and dropped when seen again within the
//! TTL window.

use botbridge_core::{ChannelId, InboundMessage};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(120);
const DEFAULT_MAX_ENTRIES: usize = 2048;

/// Stable identity for a Telegram update, from its raw payload.
fn dedup_key(message: &InboundMessage) -> Option<String> {
    let raw = message.raw.as_ref()?;
    let message_id = raw.get("message_id")?.as_i64()?;
    let chat_id = match raw.get("chat").and_then(|chat| chat.get("id")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => message.peer_id.clone(),
    };
    Some(format!("{chat_id}:{message_id}"))
}

/// TTL-bounded record of recently seen Telegram message identities.
///
/// The table holds at most `max_entries` keys: on overflow, expired
/// entries go first, then the single oldest entry.
pub struct TelegramInboundDeduper {
    ttl: Duration,
    max_entries: usize,
    seen: Mutex<HashMap<String, Instant>>,
}

impl Default for TelegramInboundDeduper {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl TelegramInboundDeduper {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Whether the message was already seen within the TTL window.
    /// Non-Telegram messages and payloads without a message id never
    /// count as duplicates.
    pub fn is_duplicate(&self, message: &InboundMessage) -> bool {
        self.is_duplicate_at(message, Instant::now())
    }

    /// Clock-injected variant of [`is_duplicate`](Self::is_duplicate).
    pub fn is_duplicate_at(&self, message: &InboundMessage, now: Instant) -> bool {
        if message.channel != ChannelId::Telegram {
            return false;
        }
        let Some(key) = dedup_key(message) else {
            return false;
        };

        let mut seen = self.seen.lock();
        if let Some(seen_at) = seen.get(&key) {
            if now.saturating_duration_since(*seen_at) <= self.ttl {
                return true;
            }
        }
        seen.insert(key, now);
        Self::prune(&mut seen, now, self.ttl, self.max_entries);
        false
    }

    /// Drop all recorded identities.
    pub fn clear(&self) {
        self.seen.lock().clear();
    }

    fn prune(seen: &mut HashMap<String, Instant>, now: Instant, ttl: Duration, max: usize) {
        if seen.len() <= max {
            return;
        }
        seen.retain(|_, seen_at| now.saturating_duration_since(*seen_at) <= ttl);
        if seen.len() <= max {
            return;
        }
        if let Some(oldest) = seen
            .iter()
            .min_by_key(|(_, seen_at)| **seen_at)
            .map(|(key, _)| key.clone())
        {
            seen.remove(&oldest);
        }
    }
}
