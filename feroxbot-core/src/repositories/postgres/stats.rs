use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use feroxbot_common::models::{PlayerStats, Statistic};
use feroxbot_common::traits::repository_traits::StatsRepository;

use crate::Error;

const STATS_COLUMNS: &str = r#"
    uuid,
    discordid,
    kills::BIGINT          AS kills,
    deaths::BIGINT         AS deaths,
    wins::BIGINT           AS wins,
    loses::BIGINT          AS loses,
    arrowsshot::BIGINT     AS arrowsshot,
    arrowshit::BIGINT      AS arrowshit,
    nexusesbroken::BIGINT  AS nexusesbroken,
    playtime::BIGINT       AS playtime,
    createdat::TIMESTAMPTZ AS createdat
"#;

#[derive(Clone)]
pub struct PostgresStatsRepository {
    pool: Pool<Postgres>,
}

impl PostgresStatsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_stats(row: &PgRow) -> Result<PlayerStats, Error> {
    Ok(PlayerStats {
        uuid: row.try_get("uuid")?,
        discord_id: row.try_get("discordid")?,
        kills: row.try_get::<Option<i64>, _>("kills")?.unwrap_or(0),
        deaths: row.try_get::<Option<i64>, _>("deaths")?.unwrap_or(0),
        wins: row.try_get::<Option<i64>, _>("wins")?.unwrap_or(0),
        losses: row.try_get::<Option<i64>, _>("loses")?.unwrap_or(0),
        arrows_shot: row.try_get::<Option<i64>, _>("arrowsshot")?.unwrap_or(0),
        arrows_hit: row.try_get::<Option<i64>, _>("arrowshit")?.unwrap_or(0),
        nexuses_broken: row.try_get::<Option<i64>, _>("nexusesbroken")?.unwrap_or(0),
        playtime_ms: row.try_get::<Option<i64>, _>("playtime")?.unwrap_or(0),
        created_at: row.try_get("createdat")?,
    })
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    async fn get_by_uuid(&self, uuid: &str) -> Result<Option<PlayerStats>, Error> {
        let query = format!("SELECT {STATS_COLUMNS} FROM stats WHERE uuid = $1");
        let row = sqlx::query(&query)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_stats).transpose()
    }

    async fn get_by_discord_id(&self, discord_id: &str) -> Result<Option<PlayerStats>, Error> {
        let query = format!("SELECT {STATS_COLUMNS} FROM stats WHERE discordid = $1 LIMIT 1");
        let row = sqlx::query(&query)
            .bind(discord_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_stats).transpose()
    }

    async fn set_discord_id(&self, uuid: &str, discord_id: Option<&str>) -> Result<(), Error> {
        let result = sqlx::query(
            r#"
            UPDATE stats
            SET discordid = $2
            WHERE uuid = $1
            "#,
        )
            .bind(uuid)
            .bind(discord_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("No stats row for player {uuid}")));
        }
        Ok(())
    }

    async fn top_by(&self, statistic: Statistic, limit: i64) -> Result<Vec<PlayerStats>, Error> {
        // Column names come from the closed `Statistic` set, never from input.
        let query = format!(
            "SELECT {STATS_COLUMNS} FROM stats ORDER BY {} DESC NULLS LAST, updatedat ASC LIMIT $1",
            statistic.key()
        );
        let rows = sqlx::query(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_stats).collect()
    }

    async fn count_games_played(&self, uuid: &str) -> Result<i64, Error> {
        let pattern = format!("%{uuid}%");
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS games
            FROM game_stats
            WHERE teamredmembers LIKE $1
               OR teambluemembers LIKE $1
            "#,
        )
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?;

        let games: i64 = row.try_get("games")?;
        Ok(games)
    }
}
