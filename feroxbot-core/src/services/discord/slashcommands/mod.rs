// File: feroxbot-core/src/services/discord/slashcommands/mod.rs

pub mod dmstats;
pub mod gamestats;
pub mod help;
pub mod info;
pub mod invite;
pub mod ip;
pub mod leaderboard;
pub mod link;
pub mod ping;
pub mod settings;
pub mod userstats;

use twilight_model::channel::message::Component;
use twilight_model::channel::message::component::{
    ActionRow, Button, ButtonStyle, SelectMenu, SelectMenuOption, SelectMenuType,
};

use crate::services::command_registry::CommandFactory;

/// Every command the bot ships with. The registry decides which ones load.
pub fn builtin_commands() -> Vec<CommandFactory> {
    vec![
        dmstats::create,
        gamestats::create,
        help::create,
        info::create,
        invite::create,
        ip::create,
        leaderboard::create,
        link::create,
        ping::create,
        settings::create,
        userstats::create,
    ]
}

pub(crate) fn button(label: &str, style: ButtonStyle, custom_id: Option<String>, url: Option<String>) -> Component {
    Component::Button(Button {
        custom_id,
        disabled: false,
        emoji: None,
        label: Some(label.to_string()),
        style,
        url,
        sku_id: None,
    })
}

/// Single-choice text select menu; options are `(label, description, value)`.
pub(crate) fn select_menu(
    custom_id: String,
    placeholder: &str,
    options: Vec<(String, String, String)>,
) -> Component {
    Component::SelectMenu(SelectMenu {
        channel_types: None,
        custom_id,
        default_values: None,
        disabled: false,
        kind: SelectMenuType::Text,
        max_values: None,
        min_values: None,
        options: Some(
            options
                .into_iter()
                .map(|(label, description, value)| SelectMenuOption {
                    default: false,
                    description: Some(description),
                    emoji: None,
                    label,
                    value,
                })
                .collect(),
        ),
        placeholder: Some(placeholder.to_string()),
    })
}

pub(crate) fn action_row(components: Vec<Component>) -> Component {
    Component::ActionRow(ActionRow { components })
}

/// Copy of `rows` with every button and select menu disabled.
pub(crate) fn disable_all(rows: &[Component]) -> Vec<Component> {
    rows.iter()
        .map(|row| match row {
            Component::ActionRow(ActionRow { components }) => action_row(
                components
                    .iter()
                    .map(|c| match c {
                        Component::Button(b) => Component::Button(Button {
                            disabled: true,
                            ..b.clone()
                        }),
                        Component::SelectMenu(m) => Component::SelectMenu(SelectMenu {
                            disabled: true,
                            ..m.clone()
                        }),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        })
        .collect()
}
