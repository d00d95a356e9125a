//! PostgreSQL implementation of VideoCallRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::traits::{RepoResult, VideoCallRepository};
use hearth_core::{DomainError, IceServer, Snowflake, VideoCall};

use crate::models::{IceServerModel, VideoCallModel};

use super::error::map_db_error;

/// PostgreSQL implementation of VideoCallRepository
#[derive(Clone)]
pub struct PgVideoCallRepository {
    pool: PgPool,
}

impl PgVideoCallRepository {
    /// Create a new PgVideoCallRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoCallRepository for PgVideoCallRepository {
    #[instrument(skip(self))]
    async fn find_by_room(&self, room_id: Snowflake) -> RepoResult<Option<VideoCall>> {
        let result = sqlx::query_as::<_, VideoCallModel>(
            r#"
            SELECT id, room_id, status, created_by, started_at, ended_at
            FROM video_calls
            WHERE room_id = $1
            "#,
        )
        .bind(room_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(VideoCall::from))
    }

    #[instrument(skip(self, call))]
    async fn create(&self, call: &VideoCall) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO video_calls (id, room_id, status, created_by, started_at, ended_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(call.id.into_inner())
        .bind(call.room_id.into_inner())
        .bind(call.status.as_str())
        .bind(call.created_by.into_inner())
        .bind(call.started_at)
        .bind(call.ended_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, call))]
    async fn update(&self, call: &VideoCall) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE video_calls
            SET status = $2, ended_at = $3
            WHERE id = $1
            "#,
        )
        .bind(call.id.into_inner())
        .bind(call.status.as_str())
        .bind(call.ended_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::CallNotFound(call.room_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_participant(&self, call_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO video_call_participants (call_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(call_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn participants(&self, call_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM video_call_participants WHERE call_id = $1 ORDER BY user_id",
        )
        .bind(call_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|(id,)| Snowflake::new(id)).collect())
    }

    #[instrument(skip(self))]
    async fn ice_servers(&self) -> RepoResult<Vec<IceServer>> {
        let results = sqlx::query_as::<_, IceServerModel>(
            r#"
            SELECT id, urls, username, credential, priority, is_active
            FROM ice_servers
            WHERE is_active = TRUE
            ORDER BY priority
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(IceServer::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgVideoCallRepository>();
    }
}
