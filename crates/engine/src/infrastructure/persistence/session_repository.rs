//! SQLite-backed session lookup.
//!
//! Rows are written by the identity provider; the engine only reads them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;

use dicetally_domain::UserId;

use super::connection::{parse_uuid, SqliteConnection};
use crate::infrastructure::ports::{ClockPort, RepoError, Session, SessionRepo};

pub struct SqliteSessionRepository {
    connection: SqliteConnection,
    clock: Arc<dyn ClockPort>,
}

impl SqliteSessionRepository {
    pub fn new(connection: SqliteConnection, clock: Arc<dyn ClockPort>) -> Self {
        Self { connection, clock }
    }

    /// Insert or replace a session row.
    #[cfg(test)]
    pub async fn save_session(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (token, user_id, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(token) DO UPDATE SET
                user_id = excluded.user_id,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(token)
        .bind(user_id.to_string())
        .bind(expires_at.to_rfc3339())
        .execute(self.connection.pool())
        .await
        .map_err(|e| RepoError::database("save_session", e))?;
        Ok(())
    }
}

#[async_trait]
impl SessionRepo for SqliteSessionRepository {
    async fn get_session(&self, token: &str) -> Result<Option<Session>, RepoError> {
        let row = sqlx::query("SELECT user_id, expires_at FROM auth_sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(self.connection.pool())
            .await
            .map_err(|e| RepoError::database("get_session", e))?;
        let Some(row) = row else {
            return Ok(None);
        };

        let user_id: String = row.get("user_id");
        let expires_at: String = row.get("expires_at");
        let session = Session {
            user_id: UserId::from_uuid(parse_uuid(&user_id, "auth_sessions.user_id")?),
            expires_at: DateTime::parse_from_rfc3339(&expires_at)
                .map_err(|e| RepoError::serialization(format!("Invalid expires_at: {}", e)))?
                .with_timezone(&Utc),
        };

        if session.is_expired(self.clock.now()) {
            tracing::debug!(user_id = %session.user_id, "Session expired");
            return Ok(None);
        }
        Ok(Some(session))
    }
}
