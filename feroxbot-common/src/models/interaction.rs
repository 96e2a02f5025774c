use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::{
    ChannelMarker, GuildMarker, InteractionMarker, MessageMarker, UserMarker,
};

/// Discord epoch (2015-01-01) in unix milliseconds.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// One option value passed to a slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(Id<UserMarker>),
    SubCommand(Vec<CommandOption>),
    SubCommandGroup(Vec<CommandOption>),
    Unsupported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandOption {
    pub name: String,
    pub value: OptionValue,
}

/// What the interaction carries.
#[derive(Debug, Clone)]
pub enum InteractionPayload {
    Command {
        name: String,
        options: Vec<CommandOption>,
    },
    Component {
        custom_id: String,
        message_id: Option<Id<MessageMarker>>,
        values: Vec<String>,
    },
    /// Autocomplete, modal submits, pings...
    Other,
}

/// Platform-independent view of one inbound interaction. Lives for exactly
/// one dispatch pass.
#[derive(Debug, Clone)]
pub struct InteractionEvent {
    pub id: Id<InteractionMarker>,
    pub token: String,
    pub invoker_id: Id<UserMarker>,
    pub invoker_name: String,
    pub guild_id: Option<Id<GuildMarker>>,
    pub channel_id: Option<Id<ChannelMarker>>,
    /// Whether the channel allows age-restricted content.
    pub channel_nsfw: bool,
    /// Permissions the platform grants the bot in the invoking channel.
    pub app_permissions: Option<Permissions>,
    pub payload: InteractionPayload,
    acknowledged: Arc<AtomicBool>,
}

impl InteractionEvent {
    pub fn new(
        id: Id<InteractionMarker>,
        token: impl Into<String>,
        invoker_id: Id<UserMarker>,
        invoker_name: impl Into<String>,
        payload: InteractionPayload,
    ) -> Self {
        Self {
            id,
            token: token.into(),
            invoker_id,
            invoker_name: invoker_name.into(),
            guild_id: None,
            channel_id: None,
            channel_nsfw: false,
            app_permissions: None,
            payload,
            acknowledged: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn in_guild(
        mut self,
        guild_id: Id<GuildMarker>,
        channel_id: Id<ChannelMarker>,
        app_permissions: Permissions,
    ) -> Self {
        self.guild_id = Some(guild_id);
        self.channel_id = Some(channel_id);
        self.app_permissions = Some(app_permissions);
        self
    }

    pub fn with_nsfw_channel(mut self, nsfw: bool) -> Self {
        self.channel_nsfw = nsfw;
        self
    }

    pub fn is_guild(&self) -> bool {
        self.guild_id.is_some()
    }

    pub fn is_command(&self) -> bool {
        matches!(self.payload, InteractionPayload::Command { .. })
    }

    pub fn is_component(&self) -> bool {
        matches!(self.payload, InteractionPayload::Component { .. })
    }

    pub fn command_name(&self) -> Option<&str> {
        match &self.payload {
            InteractionPayload::Command { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn custom_id(&self) -> Option<&str> {
        match &self.payload {
            InteractionPayload::Component { custom_id, .. } => Some(custom_id),
            _ => None,
        }
    }

    /// Values picked in a select menu; empty for everything else.
    pub fn selected_values(&self) -> &[String] {
        match &self.payload {
            InteractionPayload::Component { values, .. } => values,
            _ => &[],
        }
    }

    pub fn options(&self) -> &[CommandOption] {
        match &self.payload {
            InteractionPayload::Command { options, .. } => options,
            _ => &[],
        }
    }

    /// Unix milliseconds at which the platform created this interaction,
    /// taken from the snowflake.
    pub fn created_at_ms(&self) -> u64 {
        (self.id.get() >> 22) + DISCORD_EPOCH_MS
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::Acquire)
    }

    /// Claims the initial response slot. Returns `false` if something else
    /// already responded.
    pub fn try_acknowledge(&self) -> bool {
        self.acknowledged
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Gives the slot back after a failed initial response.
    pub fn release_acknowledgement(&self) {
        self.acknowledged.store(false, Ordering::Release);
    }

    /// The invoked subcommand and its options, if any.
    pub fn subcommand(&self) -> Option<(&str, &[CommandOption])> {
        self.options().iter().find_map(|opt| match &opt.value {
            OptionValue::SubCommand(inner) => Some((opt.name.as_str(), inner.as_slice())),
            _ => None,
        })
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        find_string(self.options(), name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.options().iter().find_map(|opt| match &opt.value {
            OptionValue::Boolean(b) if opt.name == name => Some(*b),
            _ => None,
        })
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.options().iter().find_map(|opt| match &opt.value {
            OptionValue::Integer(i) if opt.name == name => Some(*i),
            _ => None,
        })
    }

    pub fn get_user(&self, name: &str) -> Option<Id<UserMarker>> {
        self.options().iter().find_map(|opt| match &opt.value {
            OptionValue::User(id) if opt.name == name => Some(*id),
            _ => None,
        })
    }
}

/// Looks up a string option in an option list (top level or subcommand).
pub fn find_string<'a>(options: &'a [CommandOption], name: &str) -> Option<&'a str> {
    options.iter().find_map(|opt| match &opt.value {
        OptionValue::String(s) if opt.name == name => Some(s.as_str()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(options: Vec<CommandOption>) -> InteractionEvent {
        InteractionEvent::new(
            Id::new(175_928_847_299_117_063),
            "token",
            Id::new(42),
            "tester",
            InteractionPayload::Command { name: "link".into(), options },
        )
    }

    #[test]
    fn snowflake_timestamp_is_decoded() {
        let event = command(Vec::new());
        // Example snowflake from the platform documentation.
        assert_eq!(event.created_at_ms(), 1_462_015_105_796);
    }

    #[test]
    fn subcommand_options_are_reachable() {
        let event = command(vec![CommandOption {
            name: "confirm".into(),
            value: OptionValue::SubCommand(vec![CommandOption {
                name: "token".into(),
                value: OptionValue::String("abc".into()),
            }]),
        }]);

        let (name, inner) = event.subcommand().unwrap();
        assert_eq!(name, "confirm");
        assert_eq!(find_string(inner, "token"), Some("abc"));
        assert_eq!(event.get_string("token"), None);
    }

    #[test]
    fn acknowledgement_is_claimed_once_and_shared_by_clones() {
        let event = command(Vec::new());
        let copy = event.clone();
        assert!(event.try_acknowledge());
        assert!(!copy.try_acknowledge());
        assert!(copy.is_acknowledged());
        copy.release_acknowledgement();
        assert!(!event.is_acknowledged());
    }
}
