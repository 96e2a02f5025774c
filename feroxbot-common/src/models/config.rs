use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;

use crate::models::command::CommandStatus;

/// Values command and feature factories read at load time.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub bot_name: String,
    pub server_ip: Option<String>,
    pub invite_link: Option<String>,
    /// Shown as the creator by `/info`.
    pub creator: Option<String>,
    pub presence_name: Option<String>,
    pub presence_url: Option<String>,
    pub command_load_level: CommandStatus,
    pub dev_guild: Option<Id<GuildMarker>>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            bot_name: "FeroxBot".to_string(),
            server_ip: None,
            invite_link: None,
            creator: None,
            presence_name: None,
            presence_url: None,
            command_load_level: CommandStatus::Enabled,
            dev_guild: None,
        }
    }
}
