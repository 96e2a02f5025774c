use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use feroxbot_common::models::UserSettings;
use feroxbot_common::traits::repository_traits::UserSettingsRepository;

use crate::Error;

#[derive(Clone)]
pub struct PostgresUserSettingsRepository {
    pool: Pool<Postgres>,
}

impl PostgresUserSettingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserSettingsRepository for PostgresUserSettingsRepository {
    async fn get(&self, discord_id: &str) -> Result<Option<UserSettings>, Error> {
        let row = sqlx::query("SELECT id, dmstats FROM user_settings WHERE id = $1")
            .bind(discord_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            Ok(Some(UserSettings {
                discord_id: r.try_get("id")?,
                dm_stats: r.try_get::<Option<bool>, _>("dmstats")?.unwrap_or(false),
            }))
        } else {
            Ok(None)
        }
    }

    async fn set_dm_stats(&self, discord_id: &str, enabled: bool) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (id, dmstats)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
                SET dmstats = EXCLUDED.dmstats
            "#,
        )
            .bind(discord_id)
            .bind(enabled)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
