use std::time::Duration;

use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::EmbedBuilder;

/// Default brand color used for plain embeds.
pub const DEFAULT_COLOR: u32 = 0xF8_80_38;

/// Semantic reply styles. Each one maps to a fixed glyph and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    Success,
    Invalid,
    Error,
    Time,
}

impl MessageStyle {
    pub fn emoji(self) -> &'static str {
        match self {
            MessageStyle::Success => "✅",
            MessageStyle::Invalid => "❌",
            MessageStyle::Error => "⚠",
            MessageStyle::Time => "⏱",
        }
    }

    pub fn color(self) -> u32 {
        match self {
            MessageStyle::Success => 0x00_FF_00,
            MessageStyle::Invalid => DEFAULT_COLOR,
            MessageStyle::Error => 0xFF_00_00,
            MessageStyle::Time => DEFAULT_COLOR,
        }
    }

    /// Wraps plain text into the styled embed.
    pub fn embed(self, content: &str) -> Embed {
        EmbedBuilder::new()
            .color(self.color())
            .description(format!("{} **{}**", self.emoji(), content))
            .build()
    }
}

/// How a reply reaches the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyMethod {
    /// Initial response to the interaction.
    #[default]
    Reply,
    /// Edit of the initial response.
    EditReply,
    /// Acknowledge a component interaction by updating its message.
    Update,
}

#[derive(Debug, Clone, Default)]
pub struct ReplyOptions {
    pub style: Option<MessageStyle>,
    pub method: ReplyMethod,
    /// Best-effort deletion of the response after this delay.
    pub auto_delete_after: Option<Duration>,
}

impl ReplyOptions {
    pub fn styled(style: MessageStyle) -> Self {
        Self {
            style: Some(style),
            ..Default::default()
        }
    }

    pub fn method(mut self, method: ReplyMethod) -> Self {
        self.method = method;
        self
    }

    pub fn delete_after(mut self, delay: Duration) -> Self {
        self.auto_delete_after = Some(delay);
        self
    }
}
