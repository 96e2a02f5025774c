use std::time::Duration;

use async_trait::async_trait;
use twilight_util::builder::command::StringBuilder;

use feroxbot_common::models::{
    BotSettings, CommandDefinition, CommandStatus, InteractionEvent, ReplyOptions, Statistic,
};

use crate::Error;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};
use crate::services::responder::embeds;
use crate::utils::time::format_duration;

/// Rows shown per leaderboard.
pub const LEADERBOARD_SIZE: i64 = 10;

pub fn create(_settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let definition = CommandDefinition::new("leaderboard", "View the leaderboards", CommandStatus::Dev)
        .option(
            StringBuilder::new("statistic", "The statistic you want to view")
                .choices(Statistic::ALL.map(|stat| (stat.label(), stat.key())))
                .required(true)
                .build(),
        )
        .cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, LeaderboardCommand))
}

pub struct LeaderboardCommand;

#[async_trait]
impl CommandHandler for LeaderboardCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        let statistic: Statistic = event
            .get_string("statistic")
            .ok_or_else(|| Error::InvalidUsage("/leaderboard without a statistic".into()))?
            .parse()?;

        let top = ctx.services.stats.top_by(statistic, LEADERBOARD_SIZE).await?;

        let mut lines = Vec::with_capacity(top.len());
        for (rank, player) in top.iter().enumerate() {
            let name = ctx
                .services
                .identity
                .resolve_name(&player.uuid)
                .await
                .unwrap_or_else(|| "Unknown".to_string());
            let value = player.statistic(statistic);
            let shown = if statistic == Statistic::Playtime {
                format_duration(Duration::from_millis(value.max(0) as u64))
            } else {
                value.to_string()
            };
            lines.push(format!("**{}.** {} - {}", rank + 1, shown, name));
        }
        if lines.is_empty() {
            lines.push("Nobody is on this leaderboard yet".to_string());
        }

        let embed = ctx
            .responder
            .base_embed()
            .title(format!("{} leaderboard", statistic.label()))
            .description(lines.join("\n"))
            .build();

        ctx.responder
            .reply(event, embeds(vec![embed]), ReplyOptions::default())
            .await
    }
}
