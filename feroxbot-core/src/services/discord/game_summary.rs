//! Game summary embed shared by `/gamestats` and the stats DMs.

use std::time::Duration;

use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{
    EmbedAuthorBuilder, EmbedBuilder, EmbedFieldBuilder, ImageSource,
};

use feroxbot_common::models::GameStats;

use crate::Error;
use crate::services::identity::IdentityResolver;
use crate::utils::time::{format_duration, format_utc};

const SERVER_NAME: &str = "FeroxCore";

/// Current names of `members`, skipping the ones the identity service
/// does not know.
pub async fn resolve_names(identity: &IdentityResolver, members: &[String]) -> Vec<String> {
    let mut names = Vec::with_capacity(members.len());
    for uuid in members {
        if let Some(name) = identity.resolve_name(uuid).await {
            names.push(name);
        }
    }
    names
}

pub async fn game_embed(
    base: EmbedBuilder,
    identity: &IdentityResolver,
    game: &GameStats,
    server_ip: Option<&str>,
) -> Result<Embed, Error> {
    let red = resolve_names(identity, &game.team_red).await;
    let blue = resolve_names(identity, &game.team_blue).await;

    let mut author = EmbedAuthorBuilder::new(SERVER_NAME);
    if let Some(ip) = server_ip {
        let icon = ImageSource::url(format!("https://api.mcsrvstat.us/icon/{ip}"))
            .map_err(|e| Error::Parse(format!("server icon url: {e}")))?;
        author = author.icon_url(icon);
    }

    let duration = match format_duration(Duration::from_millis(game.duration_ms.max(0) as u64)) {
        d if d.is_empty() => "0s".to_string(),
        d => d,
    };
    let misc = format!(
        "`>` Winner: `{}`\n`>` Map: `{}`\n`>` Duration: `{duration}`\n`>` Date: `{}`",
        game.winner,
        game.map,
        format_utc(game.created_at)
    );
    let bow = format!(
        "`>` Shots taken: `{}`\n`>` Shots hit: `{}`\n`>` Accuracy: `{}`",
        game.total_arrows_shot,
        game.total_arrows_hit,
        game.bow_accuracy()
    );
    let combat = format!(
        "`>` Kills: `{}`\n`>` Deaths: `{}`\n`>` KDR: `{}`",
        game.total_kills,
        game.total_deaths,
        game.kill_death_ratio()
    );
    let blocks = format!(
        "`>` Placed: `{}`\n`>` Broken: `{}`",
        game.blocks_placed, game.blocks_broken
    );

    Ok(base
        .author(author)
        .title(format!("Game #{}", game.id))
        .field(EmbedFieldBuilder::new("Misc", misc))
        .field(EmbedFieldBuilder::new("Bow", bow).inline())
        .field(EmbedFieldBuilder::new("Combat", combat).inline())
        .field(EmbedFieldBuilder::new("Blocks", blocks).inline())
        .field(EmbedFieldBuilder::new(format!("Team red ({})", red.len()), team_line(&red)).inline())
        .field(EmbedFieldBuilder::new(format!("Team blue ({})", blue.len()), team_line(&blue)).inline())
        .build())
}

fn team_line(names: &[String]) -> String {
    if names.is_empty() {
        "No usernames found".to_string()
    } else {
        names.join(", ")
    }
}
