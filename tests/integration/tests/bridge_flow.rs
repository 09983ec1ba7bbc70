//! End-to-end bridge scenarios: one simulated channel, one simulated
//! backend, events flowing through the real router while a run is live.

use botbridge_core::{
    AgentEvent, BridgeConfig, ChannelId, InboundMessage, MessageInfo, MessagePart, MessageRole,
    PermissionMode, SessionStatus, ThinkingMode, ToolState, ToolStatus,
};
use botbridge_integration_tests::{AgentSim, ChannelSim};
use botbridge_runtime::{
    AdapterCapabilities, BackendClient, Bridge, BridgeBuilder, ChannelAdapter, PermissionDecision,
};
use std::sync::Arc;

fn bridge_with(
    config: BridgeConfig,
    caps: AdapterCapabilities,
) -> (Arc<ChannelSim>, Arc<AgentSim>, Bridge) {
    let adapter = Arc::new(ChannelSim::new(ChannelId::Telegram).with_capabilities(caps));
    let backend = Arc::new(AgentSim::new());
    let bridge = BridgeBuilder::new(config)
        .backend(backend.clone() as Arc<dyn BackendClient>)
        .adapter(adapter.clone() as Arc<dyn ChannelAdapter>)
        .build()
        .expect("bridge builds");
    (adapter, backend, bridge)
}

fn reasoning_part(text: &str) -> MessagePart {
    MessagePart::Reasoning {
        id: "prt_r".into(),
        session_id: "ses_1".into(),
        message_id: "msg_1".into(),
        text: text.into(),
        ended: true,
    }
}

#[tokio::test]
async fn test_summary_thinking_notices_once_per_run() {
    let mut config = BridgeConfig::default();
    config
        .thinking_modes
        .insert(ChannelId::Telegram, ThinkingMode::Summary);
    let (adapter, backend, bridge) = bridge_with(
        config,
        AdapterCapabilities {
            typing: true,
            ..Default::default()
        },
    );
    bridge.start().await.unwrap();

    backend.push_turn(
        "final answer",
        vec![
            AgentEvent::SessionStatus {
                session_id: "ses_1".into(),
                status: SessionStatus::Busy,
            },
            AgentEvent::MessagePartUpdated {
                part: reasoning_part("weighing options"),
            },
            AgentEvent::MessagePartUpdated {
                part: reasoning_part("weighing options some more"),
            },
            AgentEvent::SessionIdle {
                session_id: "ses_1".into(),
            },
        ],
    );
    bridge
        .dispatch_inbound(InboundMessage::new(ChannelId::Telegram, "7", "hello"))
        .await;
    bridge.stop().await;

    // One thinking notice despite two reasoning updates, and no raw
    // reasoning text in summary mode.
    assert_eq!(
        adapter.sent_texts(),
        vec![
            "\u{1F9ED} Session started.",
            "\u{1F914} Thinking...",
            "\u{2705} Done.",
            "final answer",
        ]
    );
    assert!(adapter.typing_count() >= 1);
}

#[tokio::test]
async fn test_raw_debug_mode_dumps_ended_reasoning() {
    let mut config = BridgeConfig::default();
    config
        .thinking_modes
        .insert(ChannelId::Telegram, ThinkingMode::RawDebug);
    let (adapter, backend, bridge) = bridge_with(config, AdapterCapabilities::default());
    bridge.start().await.unwrap();

    backend.push_turn(
        "final answer",
        vec![
            AgentEvent::MessagePartUpdated {
                part: reasoning_part("weighing options"),
            },
            AgentEvent::SessionIdle {
                session_id: "ses_1".into(),
            },
        ],
    );
    bridge
        .dispatch_inbound(InboundMessage::new(ChannelId::Telegram, "7", "hello"))
        .await;
    bridge.stop().await;

    assert_eq!(
        adapter.sent_texts(),
        vec![
            "\u{1F9ED} Session started.",
            "\u{1F914} Thinking...",
            "[debug][thinking]\nweighing options",
            "\u{2705} Done.",
            "final answer",
        ]
    );
}

#[tokio::test]
async fn test_streamed_text_is_not_sent_twice() {
    let (adapter, backend, bridge) = bridge_with(
        BridgeConfig::default(),
        AdapterCapabilities {
            progress: true,
            ..Default::default()
        },
    );
    bridge.start().await.unwrap();

    backend.push_turn(
        "Hello world",
        vec![
            AgentEvent::MessageUpdated {
                info: MessageInfo {
                    id: "msg_1".into(),
                    session_id: "ses_1".into(),
                    role: MessageRole::Assistant,
                    model: None,
                },
            },
            AgentEvent::MessagePartDelta {
                session_id: "ses_1".into(),
                message_id: "msg_1".into(),
                part_id: "prt_1".into(),
                delta: "Hello".into(),
            },
            AgentEvent::MessagePartDelta {
                session_id: "ses_1".into(),
                message_id: "msg_1".into(),
                part_id: "prt_1".into(),
                delta: " world".into(),
            },
            AgentEvent::SessionIdle {
                session_id: "ses_1".into(),
            },
        ],
    );
    bridge
        .dispatch_inbound(InboundMessage::new(ChannelId::Telegram, "7", "hello"))
        .await;
    bridge.stop().await;

    // The idle flush streams the full text; finalization then has no
    // remaining tail, so no duplicate send.
    assert_eq!(
        adapter.sent_texts(),
        vec!["\u{1F9ED} Session started.", "Hello world"]
    );
}

#[tokio::test]
async fn test_tool_updates_reach_the_peer_with_output_excerpt() {
    let (adapter, backend, bridge) = bridge_with(BridgeConfig::default(), AdapterCapabilities::default());
    bridge.start().await.unwrap();

    let tool_part = |status: ToolStatus, output: Option<&str>| MessagePart::Tool {
        id: "prt_t".into(),
        session_id: "ses_1".into(),
        message_id: "msg_1".into(),
        call_id: "call_1".into(),
        tool: "bash".into(),
        state: ToolState {
            status,
            title: Some("ls".into()),
            input: None,
            output: output.map(String::from),
        },
    };
    backend.push_turn(
        "done",
        vec![
            AgentEvent::MessagePartUpdated {
                part: tool_part(ToolStatus::Running, None),
            },
            AgentEvent::MessagePartUpdated {
                part: tool_part(ToolStatus::Running, None),
            },
            AgentEvent::MessagePartUpdated {
                part: tool_part(ToolStatus::Completed, Some("total 0")),
            },
            AgentEvent::SessionIdle {
                session_id: "ses_1".into(),
            },
        ],
    );
    bridge
        .dispatch_inbound(InboundMessage::new(ChannelId::Telegram, "7", "run ls"))
        .await;
    bridge.stop().await;

    assert_eq!(
        adapter.sent_texts(),
        vec![
            "\u{1F9ED} Session started.",
            "[tool] bash running: ls",
            "[tool] bash completed: ls\ntotal 0",
            "done",
        ]
    );
}

#[tokio::test]
async fn test_permission_deny_rejects_and_notifies() {
    let mut config = BridgeConfig::default();
    config.permission_mode = PermissionMode::Deny;
    let (adapter, backend, bridge) = bridge_with(config, AdapterCapabilities::default());
    bridge.start().await.unwrap();

    backend.push_turn(
        "done",
        vec![AgentEvent::PermissionAsked {
            session_id: "ses_1".into(),
            permission_id: "perm_1".into(),
        }],
    );
    bridge
        .dispatch_inbound(InboundMessage::new(ChannelId::Telegram, "7", "hello"))
        .await;
    bridge.stop().await;

    let permissions = backend.permissions();
    assert_eq!(permissions.len(), 1);
    assert_eq!(permissions[0].0, "ses_1");
    assert_eq!(permissions[0].1, "perm_1");
    assert_eq!(permissions[0].2, PermissionDecision::Reject);
    assert!(adapter
        .sent_texts()
        .contains(&"Permission denied. Update configuration to allow tools.".to_string()));
}

#[tokio::test]
async fn test_permission_allow_is_silent() {
    let (adapter, backend, bridge) = bridge_with(BridgeConfig::default(), AdapterCapabilities::default());
    bridge.start().await.unwrap();

    backend.push_turn(
        "done",
        vec![AgentEvent::PermissionAsked {
            session_id: "ses_1".into(),
            permission_id: "perm_1".into(),
        }],
    );
    bridge
        .dispatch_inbound(InboundMessage::new(ChannelId::Telegram, "7", "hello"))
        .await;
    bridge.stop().await;

    assert_eq!(backend.permissions()[0].2, PermissionDecision::Always);
    assert_eq!(
        adapter.sent_texts(),
        vec!["\u{1F9ED} Session started.", "done"]
    );
}
