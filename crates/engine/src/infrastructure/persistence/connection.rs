//! SQLite connection management

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use dicetally_domain::DieKind;

use crate::infrastructure::ports::RepoError;

const SCHEMA: [&str; 5] = [
    r#"
    CREATE TABLE IF NOT EXISTS dice_sets (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_dice_sets_user ON dice_sets (user_id, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS dice (
        id TEXT PRIMARY KEY,
        dice_set_id TEXT NOT NULL REFERENCES dice_sets (id) ON DELETE CASCADE,
        kind TEXT NOT NULL,
        position INTEGER NOT NULL,
        UNIQUE (dice_set_id, kind)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS die_sides (
        die_id TEXT NOT NULL REFERENCES dice (id) ON DELETE CASCADE,
        side INTEGER NOT NULL,
        rolled_count INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (die_id, side)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS auth_sessions (
        token TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        expires_at TEXT NOT NULL
    )
    "#,
];

/// Shared SQLite pool with the tracker schema applied.
#[derive(Clone)]
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    /// Open (creating if needed) the database file, apply the schema, and
    /// rewrite any legacy percentile side values.
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        let connection = Self { pool };
        connection.initialize_schema().await?;
        connection.normalize_legacy_percentile_sides().await?;
        tracing::info!(db_path, "Opened SQLite database");
        Ok(connection)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn initialize_schema(&self) -> Result<(), RepoError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::database("initialize_schema", e))?;
        }
        Ok(())
    }

    /// Move percentile rows stored as `100` / `tens * 10` onto the tens-digit
    /// encoding. Returns the number of rows rewritten.
    ///
    /// Rows whose canonical side is already taken are left in place and
    /// logged; values that match neither encoding are left for the loader
    /// to reject.
    pub async fn normalize_legacy_percentile_sides(&self) -> Result<u64, RepoError> {
        const OP: &str = "normalize_legacy_percentile_sides";

        let rows = sqlx::query(
            r#"
            SELECT s.die_id, s.side
            FROM die_sides s
            JOIN dice d ON d.id = s.die_id
            WHERE d.kind = ? AND s.side > 9
            "#,
        )
        .bind(DieKind::Percentile.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database(OP, e))?;

        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database(OP, e))?;
        let mut migrated = 0;

        for row in rows {
            let die_id: String = row.get("die_id");
            let side: i64 = row.get("side");
            let canonical = u32::try_from(side)
                .ok()
                .and_then(|side| DieKind::Percentile.normalize_legacy_side(side).ok());
            let Some(canonical) = canonical else {
                tracing::warn!(%die_id, side, "Unrecognized percentile side left untouched");
                continue;
            };

            let result = sqlx::query(
                "UPDATE OR IGNORE die_sides SET side = ? WHERE die_id = ? AND side = ?",
            )
            .bind(i64::from(canonical))
            .bind(&die_id)
            .bind(side)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database(OP, e))?;

            if result.rows_affected() == 1 {
                migrated += 1;
            } else {
                tracing::warn!(
                    %die_id,
                    side,
                    canonical,
                    "Legacy percentile side conflicts with an existing row"
                );
            }
        }

        tx.commit().await.map_err(|e| RepoError::database(OP, e))?;
        tracing::info!(migrated, "Normalized legacy percentile sides");
        Ok(migrated)
    }
}

/// Parse a TEXT uuid column.
pub(super) fn parse_uuid(value: &str, column: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(value)
        .map_err(|e| RepoError::serialization(format!("Invalid {} '{}': {}", column, value, e)))
}

/// Convert an INTEGER column into an unsigned count or side.
pub(super) fn to_u32(value: i64, column: &str) -> Result<u32, RepoError> {
    u32::try_from(value)
        .map_err(|_| RepoError::serialization(format!("{} out of range: {}", column, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open() -> (tempfile::TempDir, SqliteConnection) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tally.db");
        let connection = SqliteConnection::new(path.to_str().unwrap()).await.unwrap();
        (dir, connection)
    }

    async fn insert_percentile_die(connection: &SqliteConnection, sides: &[(i64, i64)]) -> String {
        let set_id = Uuid::new_v4().to_string();
        let die_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO dice_sets (id, user_id, name, created_at) VALUES (?, ?, 'x', '2024-01-01T00:00:00+00:00')")
            .bind(&set_id)
            .bind(Uuid::new_v4().to_string())
            .execute(connection.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO dice (id, dice_set_id, kind, position) VALUES (?, ?, 'PERCENTILE', 6)")
            .bind(&die_id)
            .bind(&set_id)
            .execute(connection.pool())
            .await
            .unwrap();
        for (side, count) in sides {
            sqlx::query("INSERT INTO die_sides (die_id, side, rolled_count) VALUES (?, ?, ?)")
                .bind(&die_id)
                .bind(side)
                .bind(count)
                .execute(connection.pool())
                .await
                .unwrap();
        }
        die_id
    }

    async fn sides_of(connection: &SqliteConnection, die_id: &str) -> Vec<(i64, i64)> {
        sqlx::query("SELECT side, rolled_count FROM die_sides WHERE die_id = ? ORDER BY side")
            .bind(die_id)
            .fetch_all(connection.pool())
            .await
            .unwrap()
            .into_iter()
            .map(|row| (row.get("side"), row.get("rolled_count")))
            .collect()
    }

    #[tokio::test]
    async fn schema_is_idempotent() {
        let (dir, _first) = open().await;
        let path = dir.path().join("tally.db");
        let second = SqliteConnection::new(path.to_str().unwrap()).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn legacy_percentile_sides_are_rewritten() {
        let (_dir, connection) = open().await;
        let legacy: Vec<(i64, i64)> = std::iter::once((100, 5))
            .chain((1..=9).map(|tens| (tens * 10, tens)))
            .collect();
        let die_id = insert_percentile_die(&connection, &legacy).await;

        let migrated = connection.normalize_legacy_percentile_sides().await.unwrap();
        assert_eq!(migrated, 10);

        let expected: Vec<(i64, i64)> = std::iter::once((0, 5))
            .chain((1..=9).map(|tens| (tens, tens)))
            .collect();
        assert_eq!(sides_of(&connection, &die_id).await, expected);

        // Second pass finds nothing left to do
        assert_eq!(
            connection.normalize_legacy_percentile_sides().await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn conflicting_and_unknown_sides_are_left_alone() {
        let (_dir, connection) = open().await;
        let die_id = insert_percentile_die(&connection, &[(3, 1), (30, 2), (55, 4)]).await;

        let migrated = connection.normalize_legacy_percentile_sides().await.unwrap();
        assert_eq!(migrated, 0);
        assert_eq!(
            sides_of(&connection, &die_id).await,
            vec![(3, 1), (30, 2), (55, 4)]
        );
    }
}
