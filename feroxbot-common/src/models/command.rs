use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use twilight_model::application::command::{Command, CommandOption, CommandType};
use twilight_model::guild::Permissions;
use twilight_util::builder::command::CommandBuilder;

use crate::error::Error;

/// Deployment state of a slash command. Controls whether (and where) the
/// command gets pushed to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandStatus {
    Enabled,
    Disabled,
    Dev,
    All,
}

impl CommandStatus {
    /// Whether a command with status `self` is part of a registration
    /// filtered by `filter`. `Disabled` commands never are.
    pub fn selected_by(self, filter: CommandStatus) -> bool {
        if self == CommandStatus::Disabled {
            return false;
        }
        filter == CommandStatus::All || self == filter
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommandStatus::Enabled => "ENABLED",
            CommandStatus::Disabled => "DISABLED",
            CommandStatus::Dev => "DEV",
            CommandStatus::All => "ALL",
        };
        f.write_str(s)
    }
}

impl FromStr for CommandStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ENABLED" => Ok(CommandStatus::Enabled),
            "DISABLED" => Ok(CommandStatus::Disabled),
            "DEV" => Ok(CommandStatus::Dev),
            "ALL" => Ok(CommandStatus::All),
            other => Err(Error::Parse(format!("Unknown command status '{other}'"))),
        }
    }
}

/// Static description of one slash command. Immutable once loaded into the
/// registry; the behavior lives in a separately registered handler.
#[derive(Debug, Clone)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOption>,
    /// Permissions the bot itself needs in the invoking channel.
    pub bot_permissions: Permissions,
    /// Only usable in age-restricted channels.
    pub nsfw: bool,
    /// Not usable outside of guilds.
    pub disable_dm: bool,
    /// Zero disables the cooldown.
    pub cooldown: Duration,
    pub status: CommandStatus,
}

impl CommandDefinition {
    pub fn new(name: &str, description: &str, status: CommandStatus) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            options: Vec::new(),
            bot_permissions: Permissions::empty(),
            nsfw: false,
            disable_dm: false,
            cooldown: Duration::ZERO,
            status,
        }
    }

    pub fn option(mut self, option: impl Into<CommandOption>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn bot_permissions(mut self, permissions: Permissions) -> Self {
        self.bot_permissions = permissions;
        self
    }

    pub fn nsfw(mut self, nsfw: bool) -> Self {
        self.nsfw = nsfw;
        self
    }

    pub fn disable_dm(mut self, disable_dm: bool) -> Self {
        self.disable_dm = disable_dm;
        self
    }

    pub fn cooldown_ms(mut self, millis: u64) -> Self {
        self.cooldown = Duration::from_millis(millis);
        self
    }

    /// Checks the naming rules the platform enforces for chat-input commands.
    pub fn validate(&self) -> Result<(), Error> {
        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > 32 {
            return Err(Error::CommandLoad(format!(
                "command name '{}' must be 1-32 characters",
                self.name
            )));
        }
        let valid_chars = self
            .name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid_chars {
            return Err(Error::CommandLoad(format!(
                "command name '{}' may only contain lowercase letters, digits, '-' and '_'",
                self.name
            )));
        }
        let desc_len = self.description.chars().count();
        if desc_len == 0 || desc_len > 100 {
            return Err(Error::CommandLoad(format!(
                "description of '{}' must be 1-100 characters",
                self.name
            )));
        }
        Ok(())
    }

    /// Builds the payload used for bulk registration with the platform.
    pub fn to_platform_command(&self) -> Command {
        let mut builder = CommandBuilder::new(
            self.name.clone(),
            self.description.clone(),
            CommandType::ChatInput,
        )
            .dm_permission(!self.disable_dm)
            .nsfw(self.nsfw);

        for option in &self.options {
            builder = builder.option(option.clone());
        }
        builder.build()
    }
}
