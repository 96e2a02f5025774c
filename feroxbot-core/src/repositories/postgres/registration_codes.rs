use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use feroxbot_common::models::RegistrationCode;
use feroxbot_common::traits::repository_traits::RegistrationCodeRepository;

use crate::Error;

/// Codes the game server hands out for `/link confirm`.
#[derive(Clone)]
pub struct PostgresRegistrationCodeRepository {
    pool: Pool<Postgres>,
}

impl PostgresRegistrationCodeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationCodeRepository for PostgresRegistrationCodeRepository {
    async fn get_code(&self, code: &str) -> Result<Option<RegistrationCode>, Error> {
        let row = sqlx::query(
            r#"
            SELECT code, uuid, createdat::TIMESTAMPTZ AS createdat
            FROM registration_codes
            WHERE code = $1
            "#,
        )
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row {
            Ok(Some(RegistrationCode {
                code: r.try_get("code")?,
                uuid: r.try_get("uuid")?,
                created_at: r.try_get("createdat")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn delete_code(&self, code: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM registration_codes WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn database_now(&self) -> Result<DateTime<Utc>, Error> {
        let row = sqlx::query("SELECT NOW() AS now")
            .fetch_one(&self.pool)
            .await?;
        let now: DateTime<Utc> = row.try_get("now")?;
        Ok(now)
    }
}
