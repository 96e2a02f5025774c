use async_trait::async_trait;
use twilight_model::channel::message::MessageFlags;
use twilight_model::http::interaction::InteractionResponseData;
use twilight_util::builder::command::{BooleanBuilder, StringBuilder, SubCommandBuilder};

use feroxbot_common::models::interaction::find_string;
use feroxbot_common::models::{
    BotSettings, CommandDefinition, CommandOption, CommandStatus, InteractionEvent, MessageStyle,
    OptionValue, ReplyOptions,
};

use crate::Error;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::{CommandHandler, RegisteredCommand};
use crate::services::responder::ephemeral;

pub fn create(_settings: &BotSettings) -> Result<RegisteredCommand, Error> {
    let definition = CommandDefinition::new(
        "settings",
        "Manage your account settings",
        CommandStatus::Enabled,
    )
    .option(
        SubCommandBuilder::new("dmstats", "Manage statistics being sent to you after each game")
            .option(
                StringBuilder::new("action", "The action you wish to take")
                    .choices([("Set", "set"), ("View", "view"), ("Reset", "reset")])
                    .required(true)
                    .build(),
            )
            .option(BooleanBuilder::new("value", "The new status of the feature dm stats").build())
            .build(),
    )
    .cooldown_ms(3000);
    Ok(RegisteredCommand::new(definition, SettingsCommand))
}

pub struct SettingsCommand;

#[async_trait]
impl CommandHandler for SettingsCommand {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error> {
        match event.subcommand() {
            Some(("dmstats", options)) => run_dm_stats(ctx, event, options).await,
            Some((other, _)) => Err(Error::InvalidUsage(format!("unknown /settings subcommand '{other}'"))),
            None => Err(Error::InvalidUsage("/settings invoked without a subcommand".into())),
        }
    }
}

fn success() -> ReplyOptions {
    ReplyOptions::styled(MessageStyle::Success)
}

async fn run_dm_stats(
    ctx: &CommandContext,
    event: &InteractionEvent,
    options: &[CommandOption],
) -> Result<(), Error> {
    let repo = &ctx.services.user_settings;
    let discord_id = event.invoker_id.to_string();

    match find_string(options, "action") {
        Some("set") => {
            let Some(value) = find_bool(options, "value") else {
                return ctx
                    .responder
                    .reply(
                        event,
                        ephemeral("Please provide a value to set the feature dm stats to"),
                        ReplyOptions::styled(MessageStyle::Invalid),
                    )
                    .await;
            };
            repo.set_dm_stats(&discord_id, value).await?;
            if value {
                dm_stats_enabled_reply(ctx, event, "The feature dm stats has been set to `enabled`").await
            } else {
                ctx.responder
                    .reply(event, ephemeral("The feature dm stats has been set to `disabled`"), success())
                    .await
            }
        }
        Some("view") => {
            let enabled = repo.get(&discord_id).await?.is_some_and(|s| s.dm_stats);
            ctx.responder
                .reply(
                    event,
                    ephemeral(format!(
                        "The feature dm stats is currently `{}`",
                        if enabled { "enabled" } else { "disabled" }
                    )),
                    success(),
                )
                .await
        }
        Some("reset") => {
            repo.set_dm_stats(&discord_id, false).await?;
            ctx.responder
                .reply(event, ephemeral("The feature dm stats has been reset to its default"), success())
                .await
        }
        other => Err(Error::InvalidUsage(format!("unknown /settings dmstats action {other:?}"))),
    }
}

/// Ephemeral embed explaining what turning dm stats on means.
pub(crate) async fn dm_stats_enabled_reply(
    ctx: &CommandContext,
    event: &InteractionEvent,
    title: &str,
) -> Result<(), Error> {
    let embed = ctx
        .responder
        .base_embed()
        .title(title)
        .description("You will now receive a dm at the end of each of your games with its statistics")
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

fn find_bool(options: &[CommandOption], name: &str) -> Option<bool> {
    options.iter().find_map(|opt| match &opt.value {
        OptionValue::Boolean(b) if opt.name == name => Some(*b),
        _ => None,
    })
}
