use async_trait::async_trait;
use twilight_model::channel::message::component::ButtonStyle;
use twilight_model::http::interaction::InteractionResponseData;

use feroxbot_common::models::{BotSettings, CommandDefinition, CommandStatus, InteractionEvent, ReplyOptions};

use crate::Error;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};
use crate::services::discord::slashcommands::{action_row, button};

pub fn create(settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let invite_link = settings
        .invite_link
        .clone()
        .ok_or_else(|| Error::CommandLoad("/invite needs BOT_INVITE_LINK to be set".into()))?;
    let definition = CommandDefinition::new("invite", "Get a link to invite the bot", CommandStatus::Dev)
        .cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, InviteCommand { invite_link }))
}

pub struct InviteCommand {
    invite_link: String,
}

#[async_trait]
impl CommandHandler for InviteCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        let embed = ctx
            .responder
            .base_embed()
            .title("Click the button to invite the bot")
            .description("Make sure to check out the premium features as well")
            .build();
        let row = action_row(vec![button(
            "🔗 Invite",
            ButtonStyle::Link,
            None,
            Some(self.invite_link.clone()),
        )]);

        ctx.responder
            .reply(
                event,
                InteractionResponseData {
                    embeds: Some(vec![embed]),
                    components: Some(vec![row]),
                    ..Default::default()
                },
                ReplyOptions::default(),
            )
            .await
    }
}
