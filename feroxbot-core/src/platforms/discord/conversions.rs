//! Twilight gateway models to the platform-independent interaction view.

use twilight_model::application::interaction::application_command::{
    CommandDataOption, CommandOptionValue,
};
use twilight_model::application::interaction::{Interaction, InteractionData};

use feroxbot_common::models::{CommandOption, InteractionEvent, InteractionPayload, OptionValue};

/// `None` for interactions without an author (platform pings).
pub fn to_interaction_event(interaction: &Interaction) -> Option<InteractionEvent> {
    let author = interaction.author()?;

    let payload = match &interaction.data {
        Some(InteractionData::ApplicationCommand(data)) => InteractionPayload::Command {
            name: data.name.clone(),
            options: convert_options(&data.options),
        },
        Some(InteractionData::MessageComponent(data)) => InteractionPayload::Component {
            custom_id: data.custom_id.clone(),
            message_id: interaction.message.as_ref().map(|m| m.id),
            values: data.values.clone(),
        },
        _ => InteractionPayload::Other,
    };

    let mut event = InteractionEvent::new(
        interaction.id,
        interaction.token.clone(),
        author.id,
        author.name.clone(),
        payload,
    );

    if let Some(guild_id) = interaction.guild_id {
        event.guild_id = Some(guild_id);
    }
    if let Some(channel) = &interaction.channel {
        event.channel_id = Some(channel.id);
        event.channel_nsfw = channel.nsfw.unwrap_or(false);
    }
    event.app_permissions = interaction.app_permissions;

    Some(event)
}

pub fn convert_options(options: &[CommandDataOption]) -> Vec<CommandOption> {
    options
        .iter()
        .map(|opt| CommandOption {
            name: opt.name.clone(),
            value: convert_value(&opt.value),
        })
        .collect()
}

fn convert_value(value: &CommandOptionValue) -> OptionValue {
    match value {
        CommandOptionValue::String(s) => OptionValue::String(s.clone()),
        CommandOptionValue::Integer(i) => OptionValue::Integer(*i),
        CommandOptionValue::Number(n) => OptionValue::Number(*n),
        CommandOptionValue::Boolean(b) => OptionValue::Boolean(*b),
        CommandOptionValue::User(id) => OptionValue::User(*id),
        CommandOptionValue::SubCommand(inner) => OptionValue::SubCommand(convert_options(inner)),
        CommandOptionValue::SubCommandGroup(inner) => {
            OptionValue::SubCommandGroup(convert_options(inner))
        }
        _ => OptionValue::Unsupported,
    }
}
