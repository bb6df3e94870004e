//! SQLite-backed dice set and tally storage.

use async_trait::async_trait;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

use dicetally_domain::{
    standard_dice, DiceSet, DiceSetDetail, DiceSetId, DiceSetName, DiceSetSummary, DieId,
    DieKind, SideTally, StoredDie, UserId,
};

use super::connection::{parse_uuid, to_u32, SqliteConnection};
use crate::infrastructure::ports::{ClockPort, DiceRepo, RepoError};

pub struct SqliteDiceRepository {
    connection: SqliteConnection,
    clock: Arc<dyn ClockPort>,
}

impl SqliteDiceRepository {
    pub fn new(connection: SqliteConnection, clock: Arc<dyn ClockPort>) -> Self {
        Self { connection, clock }
    }

    fn summary_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<DiceSetSummary, RepoError> {
        let id: String = row.get("id");
        let name: String = row.get("name");
        Ok(DiceSetSummary {
            id: DiceSetId::from_uuid(parse_uuid(&id, "dice_sets.id")?),
            name: DiceSetName::new(name).map_err(RepoError::serialization)?,
        })
    }
}

#[async_trait]
impl DiceRepo for SqliteDiceRepository {
    async fn list_dice_sets(&self, user_id: UserId) -> Result<Vec<DiceSetSummary>, RepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name FROM dice_sets
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(self.connection.pool())
        .await
        .map_err(|e| RepoError::database("list_dice_sets", e))?;

        rows.iter().map(Self::summary_from_row).collect()
    }

    async fn create_dice_set_with_standard_dice(
        &self,
        user_id: UserId,
        name: &DiceSetName,
    ) -> Result<DiceSetSummary, RepoError> {
        const OP: &str = "create_dice_set";

        let dice_set = DiceSet::new(user_id, name.clone(), self.clock.now());
        let mut tx = self
            .connection
            .pool()
            .begin()
            .await
            .map_err(|e| RepoError::database(OP, e))?;

        sqlx::query("INSERT INTO dice_sets (id, user_id, name, created_at) VALUES (?, ?, ?, ?)")
            .bind(dice_set.id.to_string())
            .bind(dice_set.user_id.to_string())
            .bind(dice_set.name.as_str())
            .bind(dice_set.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database(OP, e))?;

        for (position, die) in standard_dice().into_iter().enumerate() {
            sqlx::query("INSERT INTO dice (id, dice_set_id, kind, position) VALUES (?, ?, ?, ?)")
                .bind(die.id.to_string())
                .bind(dice_set.id.to_string())
                .bind(die.kind().as_str())
                .bind(position as i64)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepoError::database(OP, e))?;

            let rows = die
                .faces
                .to_side_tallies()
                .map_err(RepoError::constraint)?;
            for row in rows {
                sqlx::query("INSERT INTO die_sides (die_id, side, rolled_count) VALUES (?, ?, ?)")
                    .bind(die.id.to_string())
                    .bind(i64::from(row.side))
                    .bind(i64::from(row.rolled_count))
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| RepoError::database(OP, e))?;
            }
        }

        tx.commit().await.map_err(|e| RepoError::database(OP, e))?;
        tracing::info!(dice_set_id = %dice_set.id, %user_id, "Created dice set");
        Ok(dice_set.summary())
    }

    async fn get_dice_set_detail(
        &self,
        dice_set_id: DiceSetId,
        user_id: UserId,
    ) -> Result<Option<DiceSetDetail>, RepoError> {
        const OP: &str = "get_dice_set_detail";

        let set_row = sqlx::query("SELECT id, name FROM dice_sets WHERE id = ? AND user_id = ?")
            .bind(dice_set_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(self.connection.pool())
            .await
            .map_err(|e| RepoError::database(OP, e))?;
        let Some(set_row) = set_row else {
            return Ok(None);
        };
        let dice_set = Self::summary_from_row(&set_row)?;

        let rows = sqlx::query(
            r#"
            SELECT d.id AS die_id, d.kind, s.side, s.rolled_count
            FROM dice d
            LEFT JOIN die_sides s ON s.die_id = d.id
            WHERE d.dice_set_id = ?
            ORDER BY d.position, s.side
            "#,
        )
        .bind(dice_set_id.to_string())
        .fetch_all(self.connection.pool())
        .await
        .map_err(|e| RepoError::database(OP, e))?;

        let mut dice: Vec<StoredDie> = Vec::new();
        for row in rows {
            let die_id: String = row.get("die_id");
            let die_id = DieId::from_uuid(parse_uuid(&die_id, "dice.id")?);

            if dice.last().map(|d| d.id) != Some(die_id) {
                let kind: String = row.get("kind");
                let kind = DieKind::from_str(&kind).map_err(RepoError::serialization)?;
                dice.push(StoredDie {
                    id: die_id,
                    kind,
                    sides: Vec::new(),
                });
            }

            let side: Option<i64> = row.get("side");
            let rolled_count: Option<i64> = row.get("rolled_count");
            if let (Some(side), Some(rolled_count), Some(die)) = (side, rolled_count, dice.last_mut())
            {
                die.sides.push(SideTally::new(
                    to_u32(side, "die_sides.side")?,
                    to_u32(rolled_count, "die_sides.rolled_count")?,
                ));
            }
        }

        Ok(Some(DiceSetDetail { dice_set, dice }))
    }

    async fn update_face_tally(
        &self,
        die_id: DieId,
        side: u32,
        rolled_count: u32,
    ) -> Result<(), RepoError> {
        let result =
            sqlx::query("UPDATE die_sides SET rolled_count = ? WHERE die_id = ? AND side = ?")
                .bind(i64::from(rolled_count))
                .bind(die_id.to_string())
                .bind(i64::from(side))
                .execute(self.connection.pool())
                .await
                .map_err(|e| RepoError::database("update_face_tally", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("DieSide", format!("{}/{}", die_id, side)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use chrono::{Duration, TimeZone, Utc};

    async fn open(dir: &tempfile::TempDir) -> SqliteConnection {
        let path = dir.path().join("tally.db");
        SqliteConnection::new(path.to_str().unwrap()).await.unwrap()
    }

    fn repo_at(connection: SqliteConnection, minutes: i64) -> SqliteDiceRepository {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        SqliteDiceRepository::new(
            connection,
            Arc::new(FixedClock(base + Duration::minutes(minutes))),
        )
    }

    fn name(value: &str) -> DiceSetName {
        DiceSetName::new(value).unwrap()
    }

    #[tokio::test]
    async fn create_stores_one_zeroed_die_of_each_kind() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_at(open(&dir).await, 0);
        let user = UserId::new();

        let created = repo
            .create_dice_set_with_standard_dice(user, &name("Purple"))
            .await
            .unwrap();
        assert_eq!(created.name.as_str(), "Purple");

        let detail = repo
            .get_dice_set_detail(created.id, user)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.dice_set, created);
        let kinds: Vec<DieKind> = detail.dice.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, DieKind::ALL.to_vec());
        for die in &detail.dice {
            assert_eq!(die.sides.len(), die.kind.face_count());
            assert!(die.sides.iter().all(|s| s.rolled_count == 0));
        }
    }

    #[tokio::test]
    async fn list_is_newest_first_and_scoped_to_user() {
        let dir = tempfile::tempdir().unwrap();
        let connection = open(&dir).await;
        let user = UserId::new();
        let other = UserId::new();

        repo_at(connection.clone(), 0)
            .create_dice_set_with_standard_dice(user, &name("Old"))
            .await
            .unwrap();
        repo_at(connection.clone(), 10)
            .create_dice_set_with_standard_dice(user, &name("New"))
            .await
            .unwrap();
        repo_at(connection.clone(), 5)
            .create_dice_set_with_standard_dice(other, &name("Theirs"))
            .await
            .unwrap();

        let repo = repo_at(connection, 20);
        let names: Vec<String> = repo
            .list_dice_sets(user)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name.to_string())
            .collect();
        assert_eq!(names, vec!["New", "Old"]);
        assert!(repo.list_dice_sets(UserId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn detail_is_hidden_from_other_users() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_at(open(&dir).await, 0);
        let owner = UserId::new();
        let created = repo
            .create_dice_set_with_standard_dice(owner, &name("Mine"))
            .await
            .unwrap();

        assert!(repo
            .get_dice_set_detail(created.id, UserId::new())
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .get_dice_set_detail(DiceSetId::new(), owner)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_face_tally_overwrites_one_side() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_at(open(&dir).await, 0);
        let user = UserId::new();
        let created = repo
            .create_dice_set_with_standard_dice(user, &name("Set"))
            .await
            .unwrap();
        let detail = repo.get_dice_set_detail(created.id, user).await.unwrap().unwrap();
        let percentile = detail
            .dice
            .iter()
            .find(|d| d.kind == DieKind::Percentile)
            .unwrap()
            .clone();

        // "00" is side 0, "30" is side 3
        repo.update_face_tally(percentile.id, 0, 4).await.unwrap();
        repo.update_face_tally(percentile.id, 3, 2).await.unwrap();

        let reloaded = repo.get_dice_set_detail(created.id, user).await.unwrap().unwrap();
        let die = reloaded
            .dice
            .into_iter()
            .find(|d| d.kind == DieKind::Percentile)
            .unwrap()
            .into_die()
            .unwrap();
        assert_eq!(die.faces.counts(), &[4, 0, 0, 2, 0, 0, 0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn update_face_tally_unknown_row_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_at(open(&dir).await, 0);
        let err = repo
            .update_face_tally(DieId::new(), 1, 1)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn legacy_rows_load_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let connection = open(&dir).await;
        let repo = repo_at(connection.clone(), 0);
        let user = UserId::new();
        let created = repo
            .create_dice_set_with_standard_dice(user, &name("Legacy"))
            .await
            .unwrap();
        let detail = repo.get_dice_set_detail(created.id, user).await.unwrap().unwrap();
        let percentile_id = detail
            .dice
            .iter()
            .find(|d| d.kind == DieKind::Percentile)
            .unwrap()
            .id;

        // Rewrite the percentile die into the old 100 / tens*10 layout
        sqlx::query(
            "UPDATE die_sides SET side = CASE side WHEN 0 THEN 100 ELSE side * 10 END WHERE die_id = ?",
        )
        .bind(percentile_id.to_string())
        .execute(connection.pool())
        .await
        .unwrap();
        sqlx::query("UPDATE die_sides SET rolled_count = 7 WHERE die_id = ? AND side = 100")
            .bind(percentile_id.to_string())
            .execute(connection.pool())
            .await
            .unwrap();

        let reopened = repo_at(open(&dir).await, 0);
        let die = reopened
            .get_dice_set_detail(created.id, user)
            .await
            .unwrap()
            .unwrap()
            .dice
            .into_iter()
            .find(|d| d.kind == DieKind::Percentile)
            .unwrap()
            .into_die()
            .unwrap();
        assert_eq!(die.faces.get(0).unwrap(), 7);
        assert_eq!(die.faces.total(), 7);
    }
}
