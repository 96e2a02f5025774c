use std::time::Duration;

use async_trait::async_trait;
use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::InteractionResponseData;
use twilight_util::builder::command::{BooleanBuilder, StringBuilder, UserBuilder};
use twilight_util::builder::embed::{EmbedAuthorBuilder, EmbedFieldBuilder, ImageSource};

use feroxbot_common::models::{
    BotSettings, CommandDefinition, CommandStatus, InteractionEvent, MessageStyle, PlayerStats,
    ReplyOptions,
};

use crate::Error;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};
use crate::services::responder::ephemeral;
use crate::utils::time::{format_duration, format_utc};

pub fn create(_settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let definition = CommandDefinition::new(
        "userstats",
        "View user statistics from the ferox minecraft server",
        CommandStatus::Enabled,
    )
    .option(StringBuilder::new("username", "View a specific user by their user name").build())
    .option(UserBuilder::new("user", "View a specific user by their discord").build())
    .option(BooleanBuilder::new("hidden", "View the statistics in a hidden message").build())
    .cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, UserStatsCommand))
}

pub struct UserStatsCommand;

#[async_trait]
impl CommandHandler for UserStatsCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        let invalid = || ReplyOptions::styled(MessageStyle::Invalid);
        let username = event.get_string("username");
        let user = event.get_user("user");

        if username.is_some() && user.is_some() {
            return ctx
                .responder
                .reply(event, ephemeral("`username` and `user` cant be used together"), invalid())
                .await;
        }

        let (player, name) = if let Some(username) = username {
            let Some(uuid) = ctx.services.identity.resolve_id(username).await else {
                return ctx
                    .responder
                    .reply(event, ephemeral(format!("The username {username} doesn't exist")), invalid())
                    .await;
            };
            let Some(player) = ctx.services.stats.get_by_uuid(&uuid).await? else {
                return ctx
                    .responder
                    .reply(event, ephemeral(format!("{username} never joined the server")), invalid())
                    .await;
            };
            (player, username.to_string())
        } else {
            let discord_id = user.unwrap_or(event.invoker_id);
            let Some(player) = ctx.services.stats.get_by_discord_id(&discord_id.to_string()).await? else {
                let message = match user {
                    Some(id) => format!("<@{id}> doesn't have their discord linked"),
                    None => "Please link your discord first, to learn more use `/link info`".to_string(),
                };
                return ctx.responder.reply(event, ephemeral(message), invalid()).await;
            };
            let name = ctx
                .services
                .identity
                .resolve_name(&player.uuid)
                .await
                .ok_or_else(|| Error::NotFound(format!("No player name for {}", player.uuid)))?;
            (player, name)
        };

        let games_played = ctx.services.stats.count_games_played(&player.uuid).await?;
        let embed = stats_embed(ctx, &player, &name, games_played)?;
        let hidden = event.get_bool("hidden") == Some(true);

        ctx.responder
            .reply(
                event,
                InteractionResponseData {
                    embeds: Some(vec![embed]),
                    flags: hidden.then_some(MessageFlags::EPHEMERAL),
                    ..Default::default()
                },
                ReplyOptions::default(),
            )
            .await
    }
}

fn stats_embed(
    ctx: &CommandContext,
    player: &PlayerStats,
    name: &str,
    games_played: i64,
) -> Result<twilight_model::channel::message::Embed, Error> {
    let playtime = match format_duration(Duration::from_millis(player.playtime_ms.max(0) as u64)) {
        p if p.is_empty() => "None on record".to_string(),
        p => p,
    };
    let thumbnail = ImageSource::url(format!("https://crafatar.com/renders/head/{}?overlay", player.uuid))
        .map_err(|e| Error::Parse(format!("thumbnail url: {e}")))?;

    let misc = format!(
        "`>` Games played: `{games_played}`\n`>` Nexuses broken: `{}`\n`>` Playtime: `{playtime}`\n`>` First join: `{}`",
        player.nexuses_broken,
        format_utc(player.created_at)
    );
    let games = format!(
        "`>` Wins: `{}`\n`>` Losses: `{}`\n`>` WLR: `{}`",
        player.wins,
        player.losses,
        player.win_loss_ratio()
    );
    let bow = format!(
        "`>` Shots taken: `{}`\n`>` Shots hit: `{}`\n`>` Accuracy: `{}`",
        player.arrows_shot,
        player.arrows_hit,
        player.bow_accuracy()
    );
    let combat = format!(
        "`>` Kills: `{}`\n`>` Deaths: `{}`\n`>` KDR: `{}`",
        player.kills,
        player.deaths,
        player.kill_death_ratio()
    );

    Ok(ctx
        .responder
        .base_embed()
        .author(EmbedAuthorBuilder::new(ctx.settings().bot_name.clone()))
        .title(name)
        .thumbnail(thumbnail)
        .field(EmbedFieldBuilder::new("Misc", misc))
        .field(EmbedFieldBuilder::new("Games", games).inline())
        .field(EmbedFieldBuilder::new("Bow", bow).inline())
        .field(EmbedFieldBuilder::new("Combat", combat).inline())
        .build())
}
