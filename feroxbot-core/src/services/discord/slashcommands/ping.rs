// File: feroxbot-core/src/services/discord/slashcommands/ping.rs

use async_trait::async_trait;
use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::InteractionResponseData;
use twilight_util::builder::command::StringBuilder;

use feroxbot_common::models::{
    BotSettings, CommandDefinition, CommandStatus, InteractionEvent, ReplyMethod, ReplyOptions,
};

use crate::Error;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};
use crate::utils::time::current_epoch_ms;

const RTT_EMOJI: &str = "🔁";

pub fn create(_settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let definition = CommandDefinition::new("ping", "View the bots response time", CommandStatus::Enabled)
        .option(
            StringBuilder::new("action", "Extra actions for the ping command")
                .choices([("Explain", "explain")])
                .build(),
        )
        .cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, PingCommand))
}

pub struct PingCommand;

#[async_trait]
impl CommandHandler for PingCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        let responder = &ctx.responder;

        if event.get_string("action") == Some("explain") {
            let embed = responder
                .base_embed()
                .title("Ping explanation")
                .description(format!(
                    "{RTT_EMOJI} **RTT**: The delay between you sending the command and the bot replying"
                ))
                .build();
            return responder
                .reply(
                    event,
                    InteractionResponseData {
                        embeds: Some(vec![embed]),
                        flags: Some(MessageFlags::EPHEMERAL),
                        ..Default::default()
                    },
                    ReplyOptions::default(),
                )
                .await;
        }

        let pinging = responder.base_embed().title("Pinging...").build();
        responder
            .reply(
                event,
                InteractionResponseData {
                    embeds: Some(vec![pinging]),
                    flags: Some(MessageFlags::EPHEMERAL),
                    ..Default::default()
                },
                ReplyOptions::default(),
            )
            .await?;

        let rtt = current_epoch_ms().saturating_sub(event.created_at_ms());
        let result = responder
            .base_embed()
            .title("Ping result")
            .description(format!("{RTT_EMOJI} **RTT**: {rtt}ms"))
            .build();
        responder
            .reply(
                event,
                InteractionResponseData {
                    embeds: Some(vec![result]),
                    ..Default::default()
                },
                ReplyOptions::default().method(ReplyMethod::EditReply),
            )
            .await
    }
}
