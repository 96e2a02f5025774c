use async_trait::async_trait;

use feroxbot_common::models::{
    BotSettings, CommandDefinition, CommandStatus, InteractionEvent, MessageStyle, ReplyOptions,
};

use crate::Error;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};
use crate::services::discord::slashcommands::settings::dm_stats_enabled_reply;
use crate::services::responder::ephemeral;

pub fn create(_settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let definition = CommandDefinition::new(
        "dmstats",
        "Toggle statistics being sent to you in dm after each game",
        CommandStatus::Dev,
    )
    .cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, DmStatsCommand))
}

/// Shortcut for flipping the setting `/settings dmstats` manages.
pub struct DmStatsCommand;

#[async_trait]
impl CommandHandler for DmStatsCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        let repo = &ctx.services.user_settings;
        let discord_id = event.invoker_id.to_string();

        let enabled = !repo.get(&discord_id).await?.is_some_and(|s| s.dm_stats);
        repo.set_dm_stats(&discord_id, enabled).await?;

        if enabled {
            dm_stats_enabled_reply(ctx, event, "The feature dm stats has been `enabled`").await
        } else {
            ctx.responder
                .reply(
                    event,
                    ephemeral("The feature dm stats has been `disabled`"),
                    ReplyOptions::styled(MessageStyle::Success),
                )
                .await
        }
    }
}
