// File: feroxbot-core/src/services/discord/slashcommands/link.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;
use tracing::info;
use twilight_model::channel::message::component::ButtonStyle;
use twilight_model::http::interaction::InteractionResponseData;
use twilight_util::builder::command::{StringBuilder, SubCommandBuilder};

use feroxbot_common::models::{
    BotSettings, CommandDefinition, CommandStatus, DEFAULT_COLOR, InteractionEvent, MessageStyle,
    ReplyMethod, ReplyOptions,
};
use feroxbot_common::models::interaction::find_string;

use crate::Error;
use crate::services::collector::ComponentCollector;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};
use crate::services::discord::slashcommands::{action_row, button, disable_all};
use crate::services::responder::{ephemeral, reply_or_log, text};

/// Minutes a registration code stays valid after the game server issued it.
pub const CODE_LIFETIME_MINUTES: i64 = 10;
/// How long the reset confirmation buttons stay live.
pub const RESET_CONFIRM_TIMEOUT: Duration = Duration::from_secs(15);

pub fn create(_settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let definition = CommandDefinition::new(
        "link",
        "Link your discord with the minecraft server",
        CommandStatus::Enabled,
    )
    .option(SubCommandBuilder::new("info", "View a example on how to link your account").build())
    .option(
        SubCommandBuilder::new("confirm", "Link your discord account with your minecraft account")
            .option(
                StringBuilder::new("token", "The server provided token for linking accounts")
                    .required(true)
                    .build(),
            )
            .build(),
    )
    .option(SubCommandBuilder::new("status", "View the status of your account").build())
    .option(SubCommandBuilder::new("reset", "Reset your account thus removing the link").build())
    .cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, LinkCommand))
}

pub struct LinkCommand;

#[async_trait]
impl CommandHandler for LinkCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        let Some((sub, options)) = event.subcommand() else {
            return Err(Error::InvalidUsage("/link invoked without a subcommand".into()));
        };

        match sub {
            "info" => run_info(ctx, event).await,
            "confirm" => {
                let token = find_string(options, "token")
                    .ok_or_else(|| Error::InvalidUsage("/link confirm without a token".into()))?;
                run_confirm(ctx, event, token).await
            }
            "status" => run_status(ctx, event).await,
            "reset" => run_reset(ctx, event).await,
            other => Err(Error::InvalidUsage(format!("unknown /link subcommand '{other}'"))),
        }
    }
}

fn invalid() -> ReplyOptions {
    ReplyOptions::styled(MessageStyle::Invalid)
}

async fn display_name(ctx: &CommandContext, uuid: &str) -> String {
    ctx.services
        .identity
        .resolve_name(uuid)
        .await
        .unwrap_or_else(|| uuid.to_string())
}

async fn run_info(ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
    let settings = ctx.settings();
    let server_ip = settings.server_ip.as_deref().unwrap_or("the server");
    let embed = ctx
        .responder
        .base_embed()
        .title("Account linking")
        .description(format!(
            "**1.** Login to the minecraft server `{server_ip}`\n\
             **2.** Run the `/verify` command in game to get a token\n\
             **3.** Go into any server with the `{}` bot\n\
             **4.** Run the bot command `/link confirm` providing the received token\n\
             **5.** You're all set and ready to go!",
            settings.bot_name
        ))
        .build();

    ctx.responder
        .reply(
            event,
            InteractionResponseData {
                embeds: Some(vec![embed]),
                ..Default::default()
            },
            ReplyOptions::default(),
        )
        .await
}

async fn run_confirm(ctx: &CommandContext, event: &InteractionEvent, token: &str) -> Result<(), Error> {
    let stats = &ctx.services.stats;
    let codes = &ctx.services.codes;
    let discord_id = event.invoker_id.to_string();

    if stats.get_by_discord_id(&discord_id).await?.is_some() {
        return ctx
            .responder
            .reply(
                event,
                text("You are already linked, see `/link status` for more and `/link reset` to reset"),
                invalid(),
            )
            .await;
    }

    let Some(code) = codes.get_code(token).await? else {
        return ctx
            .responder
            .reply(
                event,
                ephemeral("The token provided is invalid, please closely follow `/link info`"),
                invalid(),
            )
            .await;
    };

    let now = codes.database_now().await?;
    if code.created_at + TimeDelta::minutes(CODE_LIFETIME_MINUTES) < now {
        codes.delete_code(token).await?;
        return ctx
            .responder
            .reply(event, ephemeral("This is a expired code, please obtain a new one"), invalid())
            .await;
    }

    codes.delete_code(token).await?;
    stats.set_discord_id(&code.uuid, Some(&discord_id)).await?;
    info!("Linked discord user {} to player {}", discord_id, code.uuid);

    let name = display_name(ctx, &code.uuid).await;
    ctx.responder
        .reply(
            event,
            text(format!("Your account is now linked to `{name}`")),
            ReplyOptions::styled(MessageStyle::Success),
        )
        .await
}

async fn run_status(ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
    let linked = ctx
        .services
        .stats
        .get_by_discord_id(&event.invoker_id.to_string())
        .await?;

    let Some(player) = linked else {
        return ctx
            .responder
            .reply(
                event,
                ephemeral("Your account is currently not linked, for info about linking use `/link info`"),
                invalid(),
            )
            .await;
    };

    let name = display_name(ctx, &player.uuid).await;
    ctx.responder
        .reply(
            event,
            text(format!("Your account is currently linked to `{name}`")),
            ReplyOptions::styled(MessageStyle::Success),
        )
        .await
}

async fn run_reset(ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
    let linked = ctx
        .services
        .stats
        .get_by_discord_id(&event.invoker_id.to_string())
        .await?;

    let Some(player) = linked else {
        return ctx
            .responder
            .reply(
                event,
                ephemeral("Your account is currently not linked, for info about linking use `/link info`"),
                invalid(),
            )
            .await;
    };

    let name = display_name(ctx, &player.uuid).await;
    let embed = ctx
        .responder
        .base_embed()
        .color(DEFAULT_COLOR)
        .title("Confirmation")
        .description(format!(
            "Are you sure you want to remove the link with the account `{name}`?"
        ))
        .build();
    let rows = vec![action_row(vec![
        button(
            "Confirm",
            ButtonStyle::Success,
            Some(ComponentCollector::custom_id(event, "confirm")),
            None,
        ),
        button(
            "Cancel",
            ButtonStyle::Danger,
            Some(ComponentCollector::custom_id(event, "cancel")),
            None,
        ),
    ])];
    let disabled = disable_all(&rows);

    ctx.responder
        .reply(
            event,
            InteractionResponseData {
                embeds: Some(vec![embed]),
                components: Some(rows),
                ..Default::default()
            },
            ReplyOptions::default(),
        )
        .await?;

    let pressed = ctx
        .collector
        .await_component(event, RESET_CONFIRM_TIMEOUT)
        .await;

    let Some(pressed) = pressed else {
        return ctx
            .responder
            .reply(
                event,
                InteractionResponseData {
                    content: Some("The confirmation timed out".into()),
                    components: Some(disabled),
                    ..Default::default()
                },
                ReplyOptions::default().method(ReplyMethod::EditReply),
            )
            .await;
    };

    let action = pressed.custom_id().and_then(ComponentCollector::action);
    let message = if action == Some("confirm") {
        if let Err(e) = ctx.services.stats.set_discord_id(&player.uuid, None).await {
            // Answer the press with dead buttons; the router reports the
            // error on the original reply.
            reply_or_log(
                &ctx.responder,
                &pressed,
                InteractionResponseData {
                    components: Some(disabled),
                    ..Default::default()
                },
                ReplyOptions::default().method(ReplyMethod::Update),
            )
            .await;
            return Err(e);
        }
        info!("Unlinked discord user {} from player {}", event.invoker_id, player.uuid);
        "The accounts have been unlinked"
    } else {
        "The confirmation has been cancelled"
    };

    ctx.responder
        .reply(
            &pressed,
            InteractionResponseData {
                content: Some(message.into()),
                components: Some(disabled),
                ..Default::default()
            },
            ReplyOptions::styled(MessageStyle::Success).method(ReplyMethod::Update),
        )
        .await
}
