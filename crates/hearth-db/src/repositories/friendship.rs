//! PostgreSQL implementation of FriendshipRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::traits::{FriendshipRepository, RepoResult};
use hearth_core::{DomainError, Friendship, FriendshipStatus, Snowflake};

use crate::models::FriendshipModel;

use super::error::{map_db_error, map_unique_violation};

const FRIENDSHIP_COLUMNS: &str =
    "id, from_user, to_user, status, is_active, created_at, updated_at";

/// PostgreSQL implementation of FriendshipRepository
#[derive(Clone)]
pub struct PgFriendshipRepository {
    pool: PgPool,
}

impl PgFriendshipRepository {
    /// Create a new PgFriendshipRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendshipRepository for PgFriendshipRepository {
    #[instrument(skip(self))]
    async fn find_request(&self, from: Snowflake, to: Snowflake) -> RepoResult<Option<Friendship>> {
        let result = sqlx::query_as::<_, FriendshipModel>(&format!(
            r#"
            SELECT {FRIENDSHIP_COLUMNS}
            FROM friendships
            WHERE from_user = $1 AND to_user = $2
              AND status = 'requested' AND is_active = TRUE
            "#,
        ))
        .bind(from.into_inner())
        .bind(to.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Friendship::from))
    }

    #[instrument(skip(self))]
    async fn find_between(
        &self,
        a: Snowflake,
        b: Snowflake,
        status: FriendshipStatus,
    ) -> RepoResult<Option<Friendship>> {
        let result = sqlx::query_as::<_, FriendshipModel>(&format!(
            r#"
            SELECT {FRIENDSHIP_COLUMNS}
            FROM friendships
            WHERE ((from_user = $1 AND to_user = $2) OR (from_user = $2 AND to_user = $1))
              AND status = $3 AND is_active = TRUE
            "#,
        ))
        .bind(a.into_inner())
        .bind(b.into_inner())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Friendship::from))
    }

    #[instrument(skip(self, friendship))]
    async fn create(&self, friendship: &Friendship) -> RepoResult<()> {
        // A partial unique index on (from_user, to_user) WHERE status =
        // 'requested' AND is_active backs the at-most-one-request invariant
        sqlx::query(
            r#"
            INSERT INTO friendships (id, from_user, to_user, status, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(friendship.id.into_inner())
        .bind(friendship.from_user.into_inner())
        .bind(friendship.to_user.into_inner())
        .bind(friendship.status.as_str())
        .bind(friendship.is_active)
        .bind(friendship.created_at)
        .bind(friendship.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::FriendRequestExists))?;

        Ok(())
    }

    #[instrument(skip(self, friendship))]
    async fn update(&self, friendship: &Friendship) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE friendships
            SET status = $2, is_active = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(friendship.id.into_inner())
        .bind(friendship.status.as_str())
        .bind(friendship.is_active)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::FriendRequestNotFound);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_accepted(&self, a: Snowflake, b: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE ((from_user = $1 AND to_user = $2) OR (from_user = $2 AND to_user = $1))
              AND status = 'accepted'
            "#,
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn friends_of(&self, user: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT CASE WHEN from_user = $1 THEN to_user ELSE from_user END
            FROM friendships
            WHERE (from_user = $1 OR to_user = $1)
              AND status = 'accepted' AND is_active = TRUE
            "#,
        )
        .bind(user.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|(id,)| Snowflake::new(id)).collect())
    }

    #[instrument(skip(self))]
    async fn incoming_requests(&self, user: Snowflake) -> RepoResult<Vec<Friendship>> {
        let results = sqlx::query_as::<_, FriendshipModel>(&format!(
            r#"
            SELECT {FRIENDSHIP_COLUMNS}
            FROM friendships
            WHERE to_user = $1 AND status = 'requested' AND is_active = TRUE
            ORDER BY created_at DESC
            "#,
        ))
        .bind(user.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Friendship::from).collect())
    }
}
