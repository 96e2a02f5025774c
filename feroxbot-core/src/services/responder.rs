use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use twilight_model::channel::message::{Embed, MessageFlags};
use twilight_model::http::interaction::{
    InteractionResponse, InteractionResponseData, InteractionResponseType,
};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};
use twilight_model::util::Timestamp;

use feroxbot_common::models::{DEFAULT_COLOR, InteractionEvent, ReplyMethod, ReplyOptions};
use feroxbot_common::traits::api::InteractionApi;

use crate::Error;
use crate::utils::time::current_epoch_ms;

/// Sends, edits and updates interaction responses on behalf of handlers and
/// the router.
#[derive(Clone)]
pub struct Responder {
    api: Arc<dyn InteractionApi>,
    bot_name: String,
}

impl Responder {
    pub fn new(api: Arc<dyn InteractionApi>, bot_name: impl Into<String>) -> Self {
        Self {
            api,
            bot_name: bot_name.into(),
        }
    }

    pub fn api(&self) -> &Arc<dyn InteractionApi> {
        &self.api
    }

    /// Sends `data` using the method in `options`.
    ///
    /// A style may only be combined with plain text content. The method must
    /// fit the event: `Reply` and `Update` need an unanswered event (and
    /// `Update` a component interaction), `EditReply` an answered one.
    pub async fn reply(
        &self,
        event: &InteractionEvent,
        mut data: InteractionResponseData,
        options: ReplyOptions,
    ) -> Result<(), Error> {
        if let Some(style) = options.style {
            if data.embeds.as_ref().is_some_and(|e| !e.is_empty()) {
                return Err(Error::InvalidUsage(
                    "a message style cannot be combined with embeds".into(),
                ));
            }
            let content = data.content.take().unwrap_or_default();
            data.embeds = Some(vec![style.embed(&content)]);
        }

        match options.method {
            ReplyMethod::Reply => {
                self.respond(event, InteractionResponseType::ChannelMessageWithSource, data)
                    .await?
            }
            ReplyMethod::Update => {
                if !event.is_component() {
                    return Err(Error::InvalidUsage(
                        "update replies are only valid for component interactions".into(),
                    ));
                }
                self.respond(event, InteractionResponseType::UpdateMessage, data)
                    .await?
            }
            ReplyMethod::EditReply => {
                if !event.is_acknowledged() {
                    return Err(Error::InvalidUsage(
                        "cannot edit a reply that was never sent".into(),
                    ));
                }
                self.api.update_response(&event.token, &data).await?
            }
        }

        if let Some(delay) = options.auto_delete_after {
            self.schedule_delete(event.token.clone(), delay);
        }
        Ok(())
    }

    /// Embed carrying the bot's footer, brand color and current timestamp.
    pub fn base_embed(&self) -> EmbedBuilder {
        base_embed(&self.bot_name)
    }

    async fn respond(
        &self,
        event: &InteractionEvent,
        kind: InteractionResponseType,
        data: InteractionResponseData,
    ) -> Result<(), Error> {
        if !event.try_acknowledge() {
            return Err(Error::InvalidUsage(
                "interaction was already answered, use an edit instead".into(),
            ));
        }
        let response = InteractionResponse {
            kind,
            data: Some(data),
        };
        if let Err(e) = self.api.create_response(event.id, &event.token, &response).await {
            event.release_acknowledgement();
            return Err(e);
        }
        Ok(())
    }

    fn schedule_delete(&self, token: String, delay: Duration) {
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match api.delete_response(&token).await {
                Ok(()) => debug!("Auto-deleted interaction response"),
                Err(e) => debug!("Auto-delete failed (ignored): {:?}", e),
            }
        });
    }
}

/// Brand embed for senders without a [`Responder`], e.g. features.
pub fn base_embed(bot_name: &str) -> EmbedBuilder {
    let mut builder = EmbedBuilder::new()
        .color(DEFAULT_COLOR)
        .footer(EmbedFooterBuilder::new(format!(
            "{} v{}",
            bot_name,
            env!("CARGO_PKG_VERSION")
        )));
    if let Ok(ts) = Timestamp::from_micros(current_epoch_ms() as i64 * 1000) {
        builder = builder.timestamp(ts);
    }
    builder
}

/// Plain text response body.
pub fn text(content: impl Into<String>) -> InteractionResponseData {
    InteractionResponseData {
        content: Some(content.into()),
        ..Default::default()
    }
}

/// Plain text visible only to the invoker.
pub fn ephemeral(content: impl Into<String>) -> InteractionResponseData {
    InteractionResponseData {
        flags: Some(MessageFlags::EPHEMERAL),
        ..text(content)
    }
}

pub fn embeds(embeds: Vec<Embed>) -> InteractionResponseData {
    InteractionResponseData {
        embeds: Some(embeds),
        ..Default::default()
    }
}

/// Logs instead of propagating, for replies whose failure leaves nothing to do.
pub async fn reply_or_log(
    responder: &Responder,
    event: &InteractionEvent,
    data: InteractionResponseData,
    options: ReplyOptions,
) {
    if let Err(e) = responder.reply(event, data, options).await {
        warn!("Failed to reply to interaction {}: {:?}", event.id, e);
    }
}
