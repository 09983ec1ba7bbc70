//! Tool progress notifications toward the originating peer.

use crate::outbound::OutboundDispatcher;
use crate::state::run_state::RunState;
use botbridge_core::text::{format_input_summary, truncate_text};
use botbridge_core::{BridgeConfig, MessagePart, Result, SendTextOptions, ToolStatus};

/// Display labels for well-known tool names; unknown tools show as-is.
fn tool_label(tool: &str) -> &str {
    match tool {
        "multiedit" => "edit",
        "task" => "agent",
        other => other,
    }
}

/// Emits one chat line per tool call status change.
///
/// Status changes are deduplicated per call id through the run state, so
/// repeated part snapshots with the same status stay silent. Output
/// excerpts are attached only on completion, bounded by the configured
/// character limit.
pub struct ToolUpdateNotifier {
    tool_output_limit: usize,
}

impl ToolUpdateNotifier {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            tool_output_limit: config.tool_output_limit,
        }
    }

    /// React to a part snapshot; no-op for non-tool parts.
    pub async fn notify(
        &self,
        run: &RunState,
        part: &MessagePart,
        outbound: &OutboundDispatcher,
    ) -> Result<()> {
        if !run.tool_updates_enabled {
            return Ok(());
        }
        let MessagePart::Tool {
            call_id,
            tool,
            state,
            ..
        } = part
        else {
            return Ok(());
        };
        if !run.record_tool_status(call_id, state.status) {
            return Ok(());
        }

        let title = state
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| {
                state
                    .input
                    .as_ref()
                    .map(|input| truncate_text(&format_input_summary(input), 120))
                    .filter(|s| !s.is_empty())
            })
            .unwrap_or_else(|| "running".to_string());

        let mut message = format!(
            "[tool] {} {}: {}",
            tool_label(tool),
            state.status.as_str(),
            title
        );
        if state.status == ToolStatus::Completed {
            if let Some(output) = &state.output {
                let output = truncate_text(output.trim(), self.tool_output_limit);
                if !output.is_empty() {
                    message.push('\n');
                    message.push_str(&output);
                }
            }
        }

        outbound
            .send_text(run.channel, &run.peer_id, &message, SendTextOptions::tool())
            .await
    }
}
