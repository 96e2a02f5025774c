use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use feroxbot_common::models::GameStats;
use feroxbot_common::traits::repository_traits::GameStatsRepository;

use crate::Error;

const GAME_COLUMNS: &str = r#"
    id::BIGINT              AS id,
    winner,
    gamemap,
    matchduration::BIGINT   AS matchduration,
    totalkills::BIGINT      AS totalkills,
    totaldeaths::BIGINT     AS totaldeaths,
    totalarrowsshot::BIGINT AS totalarrowsshot,
    totalarrowshit::BIGINT  AS totalarrowshit,
    blocksplaced::BIGINT    AS blocksplaced,
    blocksbroken::BIGINT    AS blocksbroken,
    teamredmembers,
    teambluemembers,
    createdat::TIMESTAMPTZ  AS createdat
"#;

/// Finished games, written by the game server.
#[derive(Clone)]
pub struct PostgresGameStatsRepository {
    pool: Pool<Postgres>,
}

impl PostgresGameStatsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Team columns hold a JSON array of player ids.
fn parse_members(raw: Option<String>) -> Result<Vec<String>, Error> {
    match raw {
        Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(&json)?),
        _ => Ok(Vec::new()),
    }
}

fn row_to_game(row: &PgRow) -> Result<GameStats, Error> {
    let count = |col: &str| -> Result<i64, Error> {
        Ok(row.try_get::<Option<i64>, _>(col)?.unwrap_or(0))
    };

    Ok(GameStats {
        id: row.try_get("id")?,
        winner: row.try_get::<Option<String>, _>("winner")?.unwrap_or_default(),
        map: row.try_get::<Option<String>, _>("gamemap")?.unwrap_or_default(),
        duration_ms: count("matchduration")?,
        total_kills: count("totalkills")?,
        total_deaths: count("totaldeaths")?,
        total_arrows_shot: count("totalarrowsshot")?,
        total_arrows_hit: count("totalarrowshit")?,
        blocks_placed: count("blocksplaced")?,
        blocks_broken: count("blocksbroken")?,
        team_red: parse_members(row.try_get("teamredmembers")?)?,
        team_blue: parse_members(row.try_get("teambluemembers")?)?,
        created_at: row.try_get("createdat")?,
    })
}

#[async_trait]
impl GameStatsRepository for PostgresGameStatsRepository {
    async fn get_game(&self, id: i64) -> Result<Option<GameStats>, Error> {
        let query = format!("SELECT {GAME_COLUMNS} FROM game_stats WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_game).transpose()
    }

    async fn recent_games(&self, limit: i64) -> Result<Vec<GameStats>, Error> {
        let query = format!("SELECT {GAME_COLUMNS} FROM game_stats ORDER BY id DESC LIMIT $1");
        let rows = sqlx::query(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_game).collect()
    }

    async fn games_with_player(&self, uuid: &str, limit: i64) -> Result<Vec<GameStats>, Error> {
        let query = format!(
            r#"
            SELECT {GAME_COLUMNS}
            FROM game_stats
            WHERE teamredmembers LIKE $1
               OR teambluemembers LIKE $1
            ORDER BY id DESC
            LIMIT $2
            "#
        );
        let rows = sqlx::query(&query)
            .bind(format!("%{uuid}%"))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_game).collect()
    }

    async fn latest_game(&self) -> Result<Option<GameStats>, Error> {
        let query = format!("SELECT {GAME_COLUMNS} FROM game_stats ORDER BY createdat DESC LIMIT 1");
        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;

        row.as_ref().map(row_to_game).transpose()
    }

    async fn count_games(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS games FROM game_stats")
            .fetch_one(&self.pool)
            .await?;
        let games: i64 = row.try_get("games")?;
        Ok(games)
    }
}
