//! Telegram thinking/done notices.

use crate::stream::hooks::{ChannelHooks, HookContext};
use async_trait::async_trait;
use botbridge_core::text::truncate_text;
use botbridge_core::{ChannelId, MessagePart, Result, SendTextOptions, ThinkingMode};

/// Telegram notice behavior, gated by the channel's thinking mode.
///
/// `summary` sends one "Thinking" notice per run and one "Done" notice at
/// idle. `raw_debug` additionally dumps each finished reasoning part
/// once, truncated to the tool output limit. Runs whose streaming got
/// suppressed skip the done notice so the peer is not told twice.
pub struct TelegramChannelHooks;

#[async_trait]
impl ChannelHooks for TelegramChannelHooks {
    async fn on_message_part_updated(
        &self,
        ctx: &HookContext<'_>,
        part: &MessagePart,
    ) -> Result<()> {
        let Some(telegram) = ctx.run.telegram() else {
            return Ok(());
        };
        if telegram.streaming_suppressed() {
            return Ok(());
        }
        let MessagePart::Reasoning {
            id, text, ended, ..
        } = part
        else {
            return Ok(());
        };

        let mode = ctx.config.thinking_mode(ChannelId::Telegram);
        if mode == ThinkingMode::Off {
            return Ok(());
        }

        if telegram.mark_thinking_notice() {
            ctx.outbound
                .send_text(
                    ctx.run.channel,
                    &ctx.run.peer_id,
                    "\u{1F914} Thinking...",
                    SendTextOptions::default(),
                )
                .await?;
        }

        if mode != ThinkingMode::RawDebug || !ended {
            return Ok(());
        }
        let text = text.trim();
        if text.is_empty() || !telegram.record_reasoning_part(id) {
            return Ok(());
        }

        ctx.outbound
            .send_text(
                ctx.run.channel,
                &ctx.run.peer_id,
                &format!(
                    "[debug][thinking]\n{}",
                    truncate_text(text, ctx.config.tool_output_limit)
                ),
                SendTextOptions::default(),
            )
            .await
    }

    async fn on_session_idle(&self, ctx: &HookContext<'_>) -> Result<()> {
        let Some(telegram) = ctx.run.telegram() else {
            return Ok(());
        };
        if telegram.streaming_suppressed() {
            telegram.reset_thinking_notice();
            return Ok(());
        }
        if !telegram.thinking_notice_sent() {
            return Ok(());
        }
        if ctx.config.thinking_mode(ChannelId::Telegram) == ThinkingMode::Off {
            return Ok(());
        }

        telegram.reset_thinking_notice();
        ctx.outbound
            .send_text(
                ctx.run.channel,
                &ctx.run.peer_id,
                "\u{2705} Done.",
                SendTextOptions::default(),
            )
            .await
    }
}
