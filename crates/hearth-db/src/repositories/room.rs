//! PostgreSQL implementation of RoomRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::traits::{RepoResult, RoomRepository};
use hearth_core::{DomainError, Room, RoomType, Snowflake};

use crate::models::RoomModel;

use super::error::{map_db_error, map_unique_violation, room_not_found};

const ROOM_COLUMNS: &str = "id, room_type, title, description, avatar, family_id, created_by, \
                            pair_lo, pair_hi, is_archived, is_active, created_at, updated_at";

/// PostgreSQL implementation of RoomRepository
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Create a new PgRoomRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Canonical ordering of a private pair for the uniqueness key
    fn pair_key(a: Snowflake, b: Snowflake) -> (i64, i64) {
        let (a, b) = (a.into_inner(), b.into_inner());
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Room>> {
        let result = sqlx::query_as::<_, RoomModel>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1 AND is_active = TRUE",
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Room::from))
    }

    #[instrument(skip(self))]
    async fn find_private_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Room>> {
        let (lo, hi) = Self::pair_key(a, b);

        let result = sqlx::query_as::<_, RoomModel>(&format!(
            r#"
            SELECT {ROOM_COLUMNS}
            FROM rooms
            WHERE room_type = 'private' AND pair_lo = $1 AND pair_hi = $2
              AND is_active = TRUE
            "#,
        ))
        .bind(lo)
        .bind(hi)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Room::from))
    }

    #[instrument(skip(self))]
    async fn find_by_family(&self, family_id: Snowflake) -> RepoResult<Option<Room>> {
        let result = sqlx::query_as::<_, RoomModel>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE family_id = $1 AND is_active = TRUE",
        ))
        .bind(family_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Room::from))
    }

    #[instrument(skip(self))]
    async fn rooms_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Room>> {
        let results = sqlx::query_as::<_, RoomModel>(&format!(
            r#"
            SELECT {ROOM_COLUMNS}
            FROM rooms r
            JOIN room_participants rp ON rp.room_id = r.id
            WHERE rp.user_id = $1 AND r.is_active = TRUE
            ORDER BY r.updated_at DESC
            "#,
        ))
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Room::from).collect())
    }

    #[instrument(skip(self, room, participants))]
    async fn create(&self, room: &Room, participants: &[Snowflake]) -> RepoResult<()> {
        let pair = if room.room_type == RoomType::Private {
            match participants {
                [a, b] => Some(Self::pair_key(*a, *b)),
                _ => {
                    return Err(DomainError::ValidationError(
                        "private room requires exactly two participants".to_string(),
                    ))
                }
            }
        } else {
            None
        };

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO rooms (id, room_type, title, description, avatar, family_id,
                               created_by, pair_lo, pair_hi, is_archived, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(room.id.into_inner())
        .bind(room.room_type.as_str())
        .bind(&room.title)
        .bind(&room.description)
        .bind(&room.avatar)
        .bind(room.family_id.map(Snowflake::into_inner))
        .bind(room.created_by.map(Snowflake::into_inner))
        .bind(pair.map(|(lo, _)| lo))
        .bind(pair.map(|(_, hi)| hi))
        .bind(room.is_archived)
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::PrivateRoomExists))?;

        for user_id in participants {
            sqlx::query(
                r#"
                INSERT INTO room_participants (room_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(room.id.into_inner())
            .bind(user_id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)
    }

    #[instrument(skip(self, room))]
    async fn update(&self, room: &Room) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE rooms
            SET title = $2, description = $3, avatar = $4, created_by = $5,
                is_archived = $6, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(room.id.into_inner())
        .bind(&room.title)
        .bind(&room.description)
        .bind(&room.avatar)
        .bind(room.created_by.map(Snowflake::into_inner))
        .bind(room.is_archived)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(room_not_found(room.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        // Hard delete: messages and media go via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(room_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn participants(&self, room_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM room_participants WHERE room_id = $1 ORDER BY user_id",
        )
        .bind(room_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|(id,)| Snowflake::new(id)).collect())
    }

    #[instrument(skip(self))]
    async fn is_participant(&self, room_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM room_participants WHERE room_id = $1 AND user_id = $2)",
        )
        .bind(room_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self, user_ids))]
    async fn add_participants(&self, room_id: Snowflake, user_ids: &[Snowflake]) -> RepoResult<()> {
        for user_id in user_ids {
            sqlx::query(
                r#"
                INSERT INTO room_participants (room_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(room_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        }

        Ok(())
    }

    #[instrument(skip(self, user_ids))]
    async fn remove_participants(
        &self,
        room_id: Snowflake,
        user_ids: &[Snowflake],
    ) -> RepoResult<()> {
        let ids: Vec<i64> = user_ids.iter().map(|s| s.into_inner()).collect();

        sqlx::query("DELETE FROM room_participants WHERE room_id = $1 AND user_id = ANY($2)")
            .bind(room_id.into_inner())
            .bind(&ids)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, user_ids))]
    async fn set_participants(&self, room_id: Snowflake, user_ids: &[Snowflake]) -> RepoResult<()> {
        let ids: Vec<i64> = user_ids.iter().map(|s| s.into_inner()).collect();

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("DELETE FROM room_participants WHERE room_id = $1 AND NOT (user_id = ANY($2))")
            .bind(room_id.into_inner())
            .bind(&ids)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        for id in &ids {
            sqlx::query(
                r#"
                INSERT INTO room_participants (room_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(room_id.into_inner())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        let a = Snowflake::new(42);
        let b = Snowflake::new(7);
        assert_eq!(
            PgRoomRepository::pair_key(a, b),
            PgRoomRepository::pair_key(b, a)
        );
        assert_eq!(PgRoomRepository::pair_key(a, b), (7, 42));
    }

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgRoomRepository>();
    }
}
