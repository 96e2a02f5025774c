use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use twilight_model::application::command::Command;
use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

use feroxbot_common::models::{BotSettings, CommandDefinition, CommandStatus, InteractionEvent};
use feroxbot_common::traits::api::InteractionApi;

use crate::Error;
use crate::services::command_context::CommandContext;

/// Behavior behind one slash command.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: &CommandContext, event: &InteractionEvent) -> Result<(), Error>;
}

/// A definition together with its handler.
#[derive(Clone)]
pub struct RegisteredCommand {
    pub definition: CommandDefinition,
    pub handler: Arc<dyn CommandHandler>,
}

impl RegisteredCommand {
    pub fn new(definition: CommandDefinition, handler: impl CommandHandler + 'static) -> Self {
        Self {
            definition,
            handler: Arc::new(handler),
        }
    }
}

/// Builds one command from settings. May fail, e.g. when a command depends
/// on a setting that is not configured.
pub type CommandFactory = fn(&BotSettings) -> Result<RegisteredCommand, Error>;

/// Every loaded command, indexed by name. Read-only once loaded.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, RegisteredCommand>,
}

impl CommandRegistry {
    /// Runs every factory. One that fails, produces an invalid definition or
    /// reuses a name is logged and skipped; loading carries on.
    pub fn load_all(factories: &[CommandFactory], settings: &BotSettings) -> Self {
        let mut commands = HashMap::new();

        for factory in factories {
            let command = match factory(settings) {
                Ok(cmd) => cmd,
                Err(e) => {
                    error!("Failed to load command: {}", e);
                    continue;
                }
            };
            if let Err(e) = command.definition.validate() {
                error!("Failed to load command: {}", e);
                continue;
            }
            let name = command.definition.name.clone();
            if commands.contains_key(&name) {
                warn!("Command '/{}' is defined more than once, keeping the first", name);
                continue;
            }
            debug!(
                "Loaded command '/{}' (status={}, cooldown={}ms)",
                name,
                command.definition.status,
                command.definition.cooldown.as_millis()
            );
            commands.insert(name, command);
        }

        info!("Loaded {} of {} commands", commands.len(), factories.len());
        Self { commands }
    }

    pub fn lookup(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All definitions, sorted by name.
    pub fn definitions(&self) -> Vec<&CommandDefinition> {
        let mut defs: Vec<_> = self.commands.values().map(|c| &c.definition).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Platform payloads for every command `filter` selects.
    pub fn select(&self, filter: CommandStatus) -> Vec<Command> {
        self.definitions()
            .into_iter()
            .filter(|def| def.status.selected_by(filter))
            .map(CommandDefinition::to_platform_command)
            .collect()
    }

    /// Replaces the platform's command catalog with the commands `filter`
    /// selects, globally or for one guild. Makes exactly one registration
    /// call. Never fails; the outcome is logged and the registered count
    /// returned on success.
    pub async fn export_for_registration(
        &self,
        api: &dyn InteractionApi,
        filter: CommandStatus,
        scope: Option<Id<GuildMarker>>,
    ) -> Option<usize> {
        if filter == CommandStatus::Disabled {
            warn!("Refusing to register commands with status DISABLED");
            return None;
        }

        let commands = self.select(filter);
        let scope_label = scope
            .map(|g| format!("guild {g}"))
            .unwrap_or_else(|| "global".to_string());

        match api.set_commands(&commands, scope).await {
            Ok(count) => {
                info!(
                    "Successfully registered {} {} commands ({})",
                    count, filter, scope_label
                );
                Some(count)
            }
            Err(e) => {
                error!(
                    "Failed to register {} {} commands ({}): {:?}",
                    commands.len(),
                    filter,
                    scope_label,
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use twilight_model::http::interaction::{InteractionResponse, InteractionResponseData};
    use twilight_model::id::marker::InteractionMarker;

    struct Noop;

    #[async_trait]
    impl CommandHandler for Noop {
        async fn run(&self, _ctx: &CommandContext, _event: &InteractionEvent) -> Result<(), Error> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CatalogApi {
        calls: Mutex<Vec<(Vec<String>, Option<Id<GuildMarker>>)>>,
        fail: bool,
    }

    #[async_trait]
    impl InteractionApi for CatalogApi {
        async fn create_response(
            &self,
            _interaction_id: Id<InteractionMarker>,
            _token: &str,
            _response: &InteractionResponse,
        ) -> Result<(), Error> {
            Ok(())
        }

        async fn update_response(&self, _token: &str, _data: &InteractionResponseData) -> Result<(), Error> {
            Ok(())
        }

        async fn delete_response(&self, _token: &str) -> Result<(), Error> {
            Ok(())
        }

        async fn set_commands(
            &self,
            commands: &[Command],
            guild_id: Option<Id<GuildMarker>>,
        ) -> Result<usize, Error> {
            let names = commands.iter().map(|c| c.name.clone()).collect();
            self.calls.lock().unwrap().push((names, guild_id));
            if self.fail {
                return Err(Error::Platform("401 Unauthorized".into()));
            }
            Ok(commands.len())
        }
    }

    fn enabled(_: &BotSettings) -> Result<RegisteredCommand, Error> {
        Ok(RegisteredCommand::new(
            CommandDefinition::new("ping", "View the bots response time", CommandStatus::Enabled),
            Noop,
        ))
    }

    fn dev(_: &BotSettings) -> Result<RegisteredCommand, Error> {
        Ok(RegisteredCommand::new(
            CommandDefinition::new("invite", "Invite the bot", CommandStatus::Dev),
            Noop,
        ))
    }

    fn disabled(_: &BotSettings) -> Result<RegisteredCommand, Error> {
        Ok(RegisteredCommand::new(
            CommandDefinition::new("old", "Retired command", CommandStatus::Disabled),
            Noop,
        ))
    }

    fn broken(_: &BotSettings) -> Result<RegisteredCommand, Error> {
        Err(Error::CommandLoad("missing SERVER_IP".into()))
    }

    fn badly_named(_: &BotSettings) -> Result<RegisteredCommand, Error> {
        Ok(RegisteredCommand::new(
            CommandDefinition::new("Bad Name", "Nope", CommandStatus::Enabled),
            Noop,
        ))
    }

    fn registry() -> CommandRegistry {
        CommandRegistry::load_all(
            &[enabled, broken, dev, disabled, badly_named, enabled],
            &BotSettings::default(),
        )
    }

    #[test]
    fn failing_definitions_are_skipped() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.lookup("ping").is_some());
        assert!(registry.lookup("invite").is_some());
        assert!(registry.lookup("Bad Name").is_none());
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn selection_follows_status_filter() {
        let registry = registry();
        let names = |cmds: Vec<Command>| cmds.into_iter().map(|c| c.name).collect::<Vec<_>>();

        assert_eq!(names(registry.select(CommandStatus::All)), vec!["invite", "ping"]);
        assert_eq!(names(registry.select(CommandStatus::Enabled)), vec!["ping"]);
        assert_eq!(names(registry.select(CommandStatus::Dev)), vec!["invite"]);
    }

    #[tokio::test]
    async fn export_makes_one_call_with_scope() {
        let registry = registry();
        let api = CatalogApi::default();
        let guild = Id::new(1234);

        let count = registry
            .export_for_registration(&api, CommandStatus::Dev, Some(guild))
            .await;

        assert_eq!(count, Some(1));
        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (vec!["invite".to_string()], Some(guild)));
    }

    #[tokio::test]
    async fn export_failure_is_not_propagated() {
        let registry = registry();
        let api = CatalogApi { fail: true, ..Default::default() };

        assert_eq!(registry.export_for_registration(&api, CommandStatus::All, None).await, None);
        assert_eq!(api.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn disabled_filter_registers_nothing() {
        let registry = registry();
        let api = CatalogApi::default();

        assert_eq!(registry.export_for_registration(&api, CommandStatus::Disabled, None).await, None);
        assert!(api.calls.lock().unwrap().is_empty());
    }
}
