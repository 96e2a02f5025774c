use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tracing::{debug, error, info, warn};
use twilight_model::guild::Permissions;

use feroxbot_common::models::{InteractionEvent, MessageStyle, ReplyMethod, ReplyOptions};

use crate::Error;
use crate::services::command_context::CommandContext;
use crate::services::command_registry::RegisteredCommand;
use crate::services::cooldown::{CooldownCheck, CooldownTracker};
use crate::services::responder::{ephemeral, reply_or_log, text};
use crate::utils::time::format_duration;

/// What the bot needs in a channel to tell users anything at all.
pub const BASELINE_PERMISSIONS: Permissions = Permissions::VIEW_CHANNEL
    .union(Permissions::SEND_MESSAGES)
    .union(Permissions::EMBED_LINKS);

/// How long context-gate replies stay visible.
const GATE_REPLY_LIFETIME: Duration = Duration::from_secs(5);

const HANDLER_FAILED_MESSAGE: &str =
    "Something went wrong while running the command, the command might have not worked fully!";
const ROUTING_FAILED_MESSAGE: &str = "Something went wrong, please try again";

/// Where a dispatch pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command.
    Ignored,
    /// Handed to a waiting component collector.
    ComponentDelivered,
    MissingPermission,
    NsfwOnly,
    DmDisabled,
    Throttled(Duration),
    Completed,
    HandlerFailed,
    RoutingFailed,
}

/// Entry point for every inbound interaction.
pub struct InteractionRouter {
    context: CommandContext,
    cooldowns: CooldownTracker,
}

impl InteractionRouter {
    pub fn new(context: CommandContext) -> Self {
        Self {
            context,
            cooldowns: CooldownTracker::new(),
        }
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Runs one dispatch pass. Never fails: errors and panics anywhere in
    /// routing or in the handler end in a generic reply to the invoker.
    pub async fn dispatch(&self, event: InteractionEvent) -> DispatchOutcome {
        let routed = AssertUnwindSafe(self.route(&event)).catch_unwind().await;

        let failure = match routed {
            Ok(Ok(outcome)) => return outcome,
            Ok(Err(e)) => format!("{e}"),
            Err(panic) => panic_message(panic.as_ref()),
        };

        error!(
            "Error dispatching interaction {} (command={:?}, guild={:?}): {}",
            event.id,
            event.command_name(),
            event.guild_id,
            failure
        );
        self.report_failure(&event, ROUTING_FAILED_MESSAGE).await;
        DispatchOutcome::RoutingFailed
    }

    async fn route(&self, event: &InteractionEvent) -> Result<DispatchOutcome, Error> {
        if event.is_component() {
            let delivered = self.context.collector.deliver(event.clone());
            return Ok(if delivered {
                DispatchOutcome::ComponentDelivered
            } else {
                DispatchOutcome::Ignored
            });
        }

        let Some(name) = event.command_name() else {
            return Ok(DispatchOutcome::Ignored);
        };

        let command = self
            .context
            .registry
            .lookup(name)
            .ok_or_else(|| Error::NotFound(format!("No command registered as '/{name}'")))?;

        // Must stay ahead of the first await below.
        if let Some(outcome) = self.gate(event, command) {
            return self.reject(event, command, outcome).await.map(|_| outcome);
        }

        Ok(self.invoke(event, command).await)
    }

    /// Synchronous checks: permissions, context, cooldown. `None` means the
    /// handler may run; the cooldown window has been started in that case.
    fn gate(&self, event: &InteractionEvent, command: &RegisteredCommand) -> Option<DispatchOutcome> {
        let def = &command.definition;

        if event.is_guild() {
            if let Some(granted) = event.app_permissions {
                if !granted.contains(def.bot_permissions) {
                    return Some(DispatchOutcome::MissingPermission);
                }
            }
            if def.nsfw && !event.channel_nsfw {
                return Some(DispatchOutcome::NsfwOnly);
            }
        } else if def.disable_dm {
            return Some(DispatchOutcome::DmDisabled);
        }

        match self.cooldowns.check(&event.invoker_id.to_string(), def) {
            CooldownCheck::Ready => None,
            CooldownCheck::Throttled { remaining } => Some(DispatchOutcome::Throttled(remaining)),
        }
    }

    async fn reject(
        &self,
        event: &InteractionEvent,
        command: &RegisteredCommand,
        outcome: DispatchOutcome,
    ) -> Result<(), Error> {
        let def = &command.definition;
        let can_talk = event
            .app_permissions
            .is_some_and(|p| p.contains(BASELINE_PERMISSIONS));
        let responder = &self.context.responder;

        match outcome {
            DispatchOutcome::MissingPermission => {
                let granted = event.app_permissions.unwrap_or_else(Permissions::empty);
                let missing = def.bot_permissions.difference(granted);
                let Some((perm_name, _)) = missing.iter_names().next() else {
                    return Ok(());
                };
                warn!(
                    "Missing {} permission for /{} in channel {:?} of guild {:?}",
                    perm_name, def.name, event.channel_id, event.guild_id
                );
                if !can_talk {
                    return Ok(());
                }
                let channel = event
                    .channel_id
                    .map(|c| format!("<#{c}>"))
                    .unwrap_or_else(|| "this channel".to_string());
                responder
                    .reply(
                        event,
                        text(format!(
                            "The bot doesn't have the `{perm_name}` permission in {channel}, Please contact a server admin!"
                        )),
                        ReplyOptions::styled(MessageStyle::Invalid),
                    )
                    .await
            }
            DispatchOutcome::NsfwOnly => {
                if !can_talk {
                    return Ok(());
                }
                responder
                    .reply(
                        event,
                        text("This command can only be used in **nsfw** channels!"),
                        ReplyOptions::styled(MessageStyle::Invalid).delete_after(GATE_REPLY_LIFETIME),
                    )
                    .await
            }
            DispatchOutcome::DmDisabled => {
                responder
                    .reply(
                        event,
                        text("This command is disabled outside of servers!"),
                        ReplyOptions::styled(MessageStyle::Invalid).delete_after(GATE_REPLY_LIFETIME),
                    )
                    .await
            }
            DispatchOutcome::Throttled(remaining) => {
                debug!("/{} throttled for {}", def.name, event.invoker_id);
                responder
                    .reply(
                        event,
                        ephemeral(format!(
                            "Please wait `{}` and try again",
                            format_duration(remaining)
                        )),
                        ReplyOptions::styled(MessageStyle::Time),
                    )
                    .await
            }
            _ => Ok(()),
        }
    }

    async fn invoke(&self, event: &InteractionEvent, command: &RegisteredCommand) -> DispatchOutcome {
        let name = &command.definition.name;
        debug!("Running /{} for {}", name, event.invoker_name);

        let run = AssertUnwindSafe(command.handler.run(&self.context, event))
            .catch_unwind()
            .await;

        let failure = match run {
            Ok(Ok(())) => {
                info!("/{} completed for {} ({})", name, event.invoker_name, event.invoker_id);
                return DispatchOutcome::Completed;
            }
            Ok(Err(e)) => format!("{e}"),
            Err(panic) => panic_message(panic.as_ref()),
        };

        error!(
            "Error running /{} (guild={:?}, channel={:?}): {}",
            name, event.guild_id, event.channel_id, failure
        );
        self.report_failure(event, HANDLER_FAILED_MESSAGE).await;
        DispatchOutcome::HandlerFailed
    }

    /// Generic error reply, as an edit if the event was already answered.
    async fn report_failure(&self, event: &InteractionEvent, message: &str) {
        let method = if event.is_acknowledged() {
            ReplyMethod::EditReply
        } else {
            ReplyMethod::Reply
        };
        reply_or_log(
            &self.context.responder,
            event,
            text(message),
            ReplyOptions::styled(MessageStyle::Error).method(method),
        )
        .await;
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
