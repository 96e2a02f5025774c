use async_trait::async_trait;
use twilight_util::builder::embed::{EmbedAuthorBuilder, EmbedFieldBuilder};

use feroxbot_common::models::{BotSettings, CommandDefinition, CommandStatus, InteractionEvent, ReplyOptions};

use crate::Error;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};
use crate::services::responder::embeds;
use crate::utils::time::format_duration;

pub fn create(_settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let definition = CommandDefinition::new(
        "info",
        "View some information about the bot",
        CommandStatus::Enabled,
    )
    .cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, InfoCommand))
}

pub struct InfoCommand;

#[async_trait]
impl CommandHandler for InfoCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        let client = &ctx.services.client;
        let settings = ctx.settings();
        let uptime = match format_duration(client.uptime()) {
            u if u.is_empty() => "0s".to_string(),
            u => u,
        };

        let embed = ctx
            .responder
            .base_embed()
            .author(EmbedAuthorBuilder::new(settings.bot_name.clone()))
            .field(EmbedFieldBuilder::new("Version", format!("v{}", env!("CARGO_PKG_VERSION"))).inline())
            .field(EmbedFieldBuilder::new("Library", "twilight").inline())
            .field(
                EmbedFieldBuilder::new("Creator", settings.creator.as_deref().unwrap_or("Unknown"))
                    .inline(),
            )
            .field(EmbedFieldBuilder::new("Servers", client.guild_count().to_string()).inline())
            .field(EmbedFieldBuilder::new("Users", client.member_count().to_string()).inline())
            .field(EmbedFieldBuilder::new("Uptime", uptime).inline())
            .build();

        ctx.responder
            .reply(event, embeds(vec![embed]), ReplyOptions::default())
            .await
    }
}
