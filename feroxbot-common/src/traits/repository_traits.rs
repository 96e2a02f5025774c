use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::models::{GameStats, PlayerStats, RegistrationCode, Statistic, UserSettings};

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn get_by_uuid(&self, uuid: &str) -> Result<Option<PlayerStats>, Error>;
    async fn get_by_discord_id(&self, discord_id: &str) -> Result<Option<PlayerStats>, Error>;
    /// Sets or clears (`None`) the linked discord account of a player.
    async fn set_discord_id(&self, uuid: &str, discord_id: Option<&str>) -> Result<(), Error>;
    async fn count_games_played(&self, uuid: &str) -> Result<i64, Error>;
    /// Highest values of `statistic` first; ties go to the older row.
    async fn top_by(&self, statistic: Statistic, limit: i64) -> Result<Vec<PlayerStats>, Error>;
}

#[async_trait]
pub trait RegistrationCodeRepository: Send + Sync {
    async fn get_code(&self, code: &str) -> Result<Option<RegistrationCode>, Error>;
    async fn delete_code(&self, code: &str) -> Result<(), Error>;
    /// Current time according to the database, which is what issued the codes.
    async fn database_now(&self) -> Result<DateTime<Utc>, Error>;
}

#[async_trait]
pub trait GameStatsRepository: Send + Sync {
    async fn get_game(&self, id: i64) -> Result<Option<GameStats>, Error>;
    /// Newest first.
    async fn recent_games(&self, limit: i64) -> Result<Vec<GameStats>, Error>;
    /// Newest first, only games `uuid` took part in.
    async fn games_with_player(&self, uuid: &str, limit: i64) -> Result<Vec<GameStats>, Error>;
    /// Most recently finished game.
    async fn latest_game(&self) -> Result<Option<GameStats>, Error>;
    async fn count_games(&self) -> Result<i64, Error>;
}

#[async_trait]
pub trait UserSettingsRepository: Send + Sync {
    /// `None` when the user never changed a setting.
    async fn get(&self, discord_id: &str) -> Result<Option<UserSettings>, Error>;
    /// Creates the row on first use.
    async fn set_dm_stats(&self, discord_id: &str, enabled: bool) -> Result<(), Error>;
}
