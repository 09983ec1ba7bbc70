//! Inbound-side scenarios through the whole bridge: deduplication,
//! command interception, and session binding across messages.

use botbridge_core::{BridgeConfig, ChannelId, InboundMessage, ModelRef};
use botbridge_integration_tests::{AgentSim, ChannelSim};
use botbridge_runtime::{BackendClient, Bridge, BridgeBuilder, ChannelAdapter};
use std::sync::Arc;

fn bridge() -> (Arc<ChannelSim>, Arc<AgentSim>, Bridge) {
    let adapter = Arc::new(ChannelSim::new(ChannelId::Telegram));
    let backend = Arc::new(AgentSim::new());
    let bridge = BridgeBuilder::new(BridgeConfig::default())
        .backend(backend.clone() as Arc<dyn BackendClient>)
        .adapter(adapter.clone() as Arc<dyn ChannelAdapter>)
        .build()
        .expect("bridge builds");
    (adapter, backend, bridge)
}

fn telegram_message(text: &str, message_id: i64) -> InboundMessage {
    InboundMessage::new(ChannelId::Telegram, "7", text).with_raw(serde_json::json!({
        "message_id": message_id,
        "chat": {"id": "7"},
    }))
}

#[tokio::test]
async fn test_redelivered_update_is_dropped() {
    let (_adapter, backend, bridge) = bridge();
    bridge.start().await.unwrap();
    backend.push_reply("pong");

    bridge.dispatch_inbound(telegram_message("ping", 42)).await;
    bridge.dispatch_inbound(telegram_message("ping", 42)).await;
    bridge.stop().await;

    assert_eq!(backend.prompts().len(), 1);
}

#[tokio::test]
async fn test_model_command_applies_to_later_prompts() {
    let (adapter, backend, bridge) = bridge();
    bridge.start().await.unwrap();
    backend.push_reply("hi there");

    bridge
        .dispatch_inbound(telegram_message("/model anthropic/claude-opus", 1))
        .await;
    bridge.dispatch_inbound(telegram_message("hello", 2)).await;
    bridge.stop().await;

    assert!(adapter
        .sent_texts()
        .contains(&"Model switched to anthropic/claude-opus".to_string()));
    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(
        prompts[0].model,
        Some(ModelRef::new("anthropic", "claude-opus"))
    );
}

#[tokio::test]
async fn test_session_binding_survives_across_messages() {
    let (adapter, backend, bridge) = bridge();
    bridge.start().await.unwrap();
    backend.push_reply("one");
    backend.push_reply("two");

    bridge.dispatch_inbound(telegram_message("first", 1)).await;
    bridge.dispatch_inbound(telegram_message("second", 2)).await;
    bridge.stop().await;

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0].session_id, prompts[1].session_id);
    let announcements = adapter
        .sent_texts()
        .iter()
        .filter(|text| text.contains("Session started"))
        .count();
    assert_eq!(announcements, 1);
}

#[tokio::test]
async fn test_reset_command_forces_a_fresh_session() {
    let (_adapter, backend, bridge) = bridge();
    bridge.start().await.unwrap();
    backend.push_reply("one");
    backend.push_reply("two");

    bridge.dispatch_inbound(telegram_message("first", 1)).await;
    bridge.dispatch_inbound(telegram_message("/reset", 2)).await;
    bridge.dispatch_inbound(telegram_message("second", 3)).await;
    bridge.stop().await;

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 2);
    assert_ne!(prompts[0].session_id, prompts[1].session_id);
}
