use std::time::Duration;

use async_trait::async_trait;
use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::InteractionResponseData;
use twilight_util::builder::command::{BooleanBuilder, IntegerBuilder, StringBuilder, UserBuilder};

use feroxbot_common::models::{
    BotSettings, CommandDefinition, CommandStatus, GameStats, InteractionEvent, MessageStyle,
    ReplyMethod, ReplyOptions,
};

use crate::Error;
use crate::services::collector::ComponentCollector;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};
use crate::services::discord::game_summary::game_embed;
use crate::services::discord::slashcommands::{action_row, disable_all, select_menu};
use crate::services::responder::{ephemeral, reply_or_log};

/// How long the game picker stays live.
pub const GAME_SELECT_TIMEOUT: Duration = Duration::from_secs(60);
/// Games offered by one picker, which is also the platform's option limit.
pub const MAX_GAME_CHOICES: i64 = 25;

pub fn create(_settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let definition = CommandDefinition::new(
        "gamestats",
        "View game statistics from the ferox minecraft server",
        CommandStatus::Dev,
    )
    .option(IntegerBuilder::new("id", "View a specific game by its id").build())
    .option(StringBuilder::new("username", "View one of a users 25 latest games by username").build())
    .option(UserBuilder::new("user", "View one of a users 25 latest games by user").build())
    .option(BooleanBuilder::new("hidden", "View the statistics in a hidden message").build())
    .cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, GameStatsCommand))
}

pub struct GameStatsCommand;

#[async_trait]
impl CommandHandler for GameStatsCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        let id = event.get_integer("id");
        let user = event.get_user("user");
        let username = event.get_string("username");
        let hidden = event.get_bool("hidden") == Some(true);
        let games_repo = &ctx.services.games;

        let selectors = [id.is_some(), user.is_some(), username.is_some()]
            .into_iter()
            .filter(|given| *given)
            .count();
        if selectors > 1 {
            return invalid(ctx, event, "You can only provide one of id, username or user at a time").await;
        }

        let games = if let Some(id) = id {
            match games_repo.get_game(id).await? {
                Some(game) => vec![game],
                None => return invalid(ctx, event, format!("A game with the id {id} doesn't exist")).await,
            }
        } else if user.is_some() || username.is_some() {
            let (uuid, who) = if let Some(user) = user {
                match ctx.services.stats.get_by_discord_id(&user.to_string()).await? {
                    Some(player) => (player.uuid, format!("<@{user}>")),
                    None => {
                        return invalid(ctx, event, format!("<@{user}> doesn't have their discord linked")).await;
                    }
                }
            } else {
                let username = username.unwrap_or_default();
                match ctx.services.identity.resolve_id(username).await {
                    Some(uuid) => (uuid, username.to_string()),
                    None => {
                        return invalid(ctx, event, format!("The username {username} doesn't exist")).await;
                    }
                }
            };

            let found = games_repo.games_with_player(&uuid, MAX_GAME_CHOICES).await?;
            if found.is_empty() {
                return invalid(ctx, event, format!("{who} didn't play any games yet")).await;
            }
            found
        } else {
            let recent = games_repo.recent_games(MAX_GAME_CHOICES).await?;
            if recent.is_empty() {
                return invalid(ctx, event, "No games have been played yet").await;
            }
            recent
        };

        match games.as_slice() {
            [game] => {
                let embed = summary(ctx, game).await?;
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
            _ => pick_game(ctx, event, &games, hidden).await,
        }
    }
}

async fn invalid(ctx: &CommandContext, event: &InteractionEvent, message: impl Into<String>) -> Result<(), Error> {
    ctx.responder
        .reply(event, ephemeral(message), ReplyOptions::styled(MessageStyle::Invalid))
        .await
}

async fn summary(ctx: &CommandContext, game: &GameStats) -> Result<twilight_model::channel::message::Embed, Error> {
    game_embed(
        ctx.responder.base_embed(),
        &ctx.services.identity,
        game,
        ctx.settings().server_ip.as_deref(),
    )
    .await
}

/// Lets the invoker choose one of `games` (newest first) from a select menu,
/// then swaps the menu for that game's summary.
async fn pick_game(
    ctx: &CommandContext,
    event: &InteractionEvent,
    games: &[GameStats],
    hidden: bool,
) -> Result<(), Error> {
    let options = games
        .iter()
        .map(|game| {
            (
                format!("Game #{}", game.id),
                format!("View the statistics of game #{}", game.id),
                game.id.to_string(),
            )
        })
        .collect();
    let rows = vec![action_row(vec![select_menu(
        ComponentCollector::custom_id(event, "game"),
        "Pick a game to view",
        options,
    )])];
    let disabled = disable_all(&rows);

    ctx.responder
        .reply(
            event,
            InteractionResponseData {
                content: Some("Please select a game".into()),
                components: Some(rows),
                flags: hidden.then_some(MessageFlags::EPHEMERAL),
                ..Default::default()
            },
            ReplyOptions::styled(MessageStyle::Time),
        )
        .await?;

    let Some(picked) = ctx.collector.await_component(event, GAME_SELECT_TIMEOUT).await else {
        return ctx
            .responder
            .reply(
                event,
                InteractionResponseData {
                    content: Some("The selection timed out".into()),
                    components: Some(disabled),
                    ..Default::default()
                },
                ReplyOptions::styled(MessageStyle::Time).method(ReplyMethod::EditReply),
            )
            .await;
    };

    let chosen = picked
        .selected_values()
        .first()
        .and_then(|value| value.parse::<i64>().ok())
        .and_then(|id| games.iter().find(|game| game.id == id));
    let embed = match chosen {
        Some(game) => summary(ctx, game).await,
        None => Err(Error::InvalidUsage(format!(
            "unexpected game selection {:?}",
            picked.selected_values()
        ))),
    };

    match embed {
        Ok(embed) => {
            ctx.responder
                .reply(
                    &picked,
                    InteractionResponseData {
                        embeds: Some(vec![embed]),
                        components: Some(Vec::new()),
                        ..Default::default()
                    },
                    ReplyOptions::default().method(ReplyMethod::Update),
                )
                .await
        }
        Err(e) => {
            // Answer the pick so the menu does not stay live; the router
            // reports the error on the original reply.
            reply_or_log(
                &ctx.responder,
                &picked,
                InteractionResponseData {
                    components: Some(disabled),
                    ..Default::default()
                },
                ReplyOptions::default().method(ReplyMethod::Update),
            )
            .await;
            Err(e)
        }
    }
}
