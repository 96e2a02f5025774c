use async_trait::async_trait;
use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::InteractionResponseData;

use feroxbot_common::models::{BotSettings, CommandDefinition, CommandStatus, InteractionEvent, ReplyOptions};

use crate::Error;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};

pub fn create(_settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let definition = CommandDefinition::new(
        "help",
        "View a list of available commands with a short description",
        CommandStatus::Enabled,
    )
    .cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, HelpCommand))
}

pub struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        let lines: Vec<String> = ctx
            .registry
            .definitions()
            .into_iter()
            .map(|def| format!("**{}**\n- {}", def.name, def.description))
            .collect();

        let embed = ctx
            .responder
            .base_embed()
            .title("Main commands")
            .description(lines.join("\n"))
            .build();

        ctx.responder
            .reply(
                event,
                InteractionResponseData {
                    embeds: Some(vec![embed]),
                    flags: Some(MessageFlags::EPHEMERAL),
                    ..Default::default()
                },
                ReplyOptions::default(),
            )
            .await
    }
}
