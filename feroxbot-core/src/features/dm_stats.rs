use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

use feroxbot_common::models::{BotSettings, GameStats};

use crate::Error;
use crate::features::{Feature, FeatureContext};
use crate::services::discord::game_summary::game_embed;
use crate::services::responder::base_embed;

/// How often the game table is checked for new rows.
pub const POLL_INTERVAL: Duration = Duration::from_secs(15);

pub fn create(_settings: &BotSettings) -> Result<Arc<dyn Feature>, Error> {
    Ok(Arc::new(DmStatsFeature))
}

/// Sends the summary of every finished game to the participants who turned
/// on dm stats.
pub struct DmStatsFeature;

#[async_trait]
impl Feature for DmStatsFeature {
    fn name(&self) -> &str {
        "dmStats"
    }

    async fn start(&self, ctx: &FeatureContext) -> Result<(), Error> {
        let mut watcher = GameWatcher::new(ctx.clone()).await?;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = watcher.poll().await {
                    error!("Game stats poll failed: {:?}", e);
                }
            }
        });
        Ok(())
    }
}

/// Remembers how many games it has seen and reports each new one.
pub struct GameWatcher {
    ctx: FeatureContext,
    seen: i64,
}

impl GameWatcher {
    /// Games already stored at construction are never reported.
    pub async fn new(ctx: FeatureContext) -> Result<Self, Error> {
        let seen = ctx.services.games.count_games().await?;
        debug!("Watching for games after the first {seen}");
        Ok(Self { ctx, seen })
    }

    /// Checks for a new game and DMs its summary. Returns how many
    /// messages were delivered.
    pub async fn poll(&mut self) -> Result<usize, Error> {
        let services = &self.ctx.services;

        let count = services.games.count_games().await?;
        if count <= self.seen {
            return Ok(0);
        }
        self.seen = count;

        let Some(game) = services.games.latest_game().await? else {
            return Ok(0);
        };
        let recipients = self.recipients(&game).await?;
        if recipients.is_empty() {
            return Ok(0);
        }

        let settings = &services.settings;
        let embed = game_embed(
            base_embed(&settings.bot_name),
            &services.identity,
            &game,
            settings.server_ip.as_deref(),
        )
        .await?;

        let mut sent = 0;
        for user in recipients {
            match self
                .ctx
                .messenger
                .send_direct_embeds(user, std::slice::from_ref(&embed))
                .await
            {
                Ok(()) => sent += 1,
                // Closed DMs are common and not worth more than a debug line.
                Err(e) => debug!("Could not send game #{} stats to {}: {}", game.id, user, e),
            }
        }
        info!("Sent stats of game #{} to {} players", game.id, sent);
        Ok(sent)
    }

    /// Linked participants of `game` who opted in, each once.
    async fn recipients(&self, game: &GameStats) -> Result<Vec<Id<UserMarker>>, Error> {
        let services = &self.ctx.services;
        let mut users = Vec::new();

        for uuid in game.players() {
            let Some(discord_id) = services
                .stats
                .get_by_uuid(uuid)
                .await?
                .and_then(|player| player.discord_id)
            else {
                continue;
            };
            let opted_in = services
                .user_settings
                .get(&discord_id)
                .await?
                .is_some_and(|s| s.dm_stats);
            if !opted_in {
                continue;
            }

            match discord_id.parse::<u64>().ok().and_then(Id::new_checked) {
                Some(id) if !users.contains(&id) => users.push(id),
                Some(_) => {}
                None => warn!("Player {} has an unusable discord id '{}'", uuid, discord_id),
            }
        }
        Ok(users)
    }
}
