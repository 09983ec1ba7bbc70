//! Channel identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of an external chat channel.
///
/// Used as a map key throughout the bridge: adapter lookup, strategy
/// registries, session keys, and model overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelId {
    Telegram,
    WhatsApp,
    Slack,
    Discord,
    Feishu,
    DingTalk,
    Email,
    Webhook,
    Qq,
}

impl ChannelId {
    /// All supported channels, in display order.
    pub const ALL: [ChannelId; 9] = [
        ChannelId::Telegram,
        ChannelId::WhatsApp,
        ChannelId::Slack,
        ChannelId::Discord,
        ChannelId::Feishu,
        ChannelId::DingTalk,
        ChannelId::Email,
        ChannelId::Webhook,
        ChannelId::Qq,
    ];

    /// Stable lowercase identifier, used in session keys and config.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelId::Telegram => "telegram",
            ChannelId::WhatsApp => "whatsapp",
            ChannelId::Slack => "slack",
            ChannelId::Discord => "discord",
            ChannelId::Feishu => "feishu",
            ChannelId::DingTalk => "dingtalk",
            ChannelId::Email => "email",
            ChannelId::Webhook => "webhook",
            ChannelId::Qq => "qq",
        }
    }

    /// Human-readable label for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            ChannelId::Telegram => "Telegram",
            ChannelId::WhatsApp => "WhatsApp",
            ChannelId::Slack => "Slack",
            ChannelId::Discord => "Discord",
            ChannelId::Feishu => "Feishu",
            ChannelId::DingTalk => "DingTalk",
            ChannelId::Email => "Email",
            ChannelId::Webhook => "Webhook",
            ChannelId::Qq => "QQ",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelId {
    type Err = crate::BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "telegram" => Ok(ChannelId::Telegram),
            "whatsapp" => Ok(ChannelId::WhatsApp),
            "slack" => Ok(ChannelId::Slack),
            "discord" => Ok(ChannelId::Discord),
            "feishu" => Ok(ChannelId::Feishu),
            "dingtalk" => Ok(ChannelId::DingTalk),
            "email" => Ok(ChannelId::Email),
            "webhook" => Ok(ChannelId::Webhook),
            "qq" => Ok(ChannelId::Qq),
            other => Err(crate::BridgeError::UnknownChannel(other.to_string())),
        }
    }
}
