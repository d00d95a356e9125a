//! PostgreSQL implementation of FamilyRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::traits::{FamilyRepository, RepoResult};
use hearth_core::{DomainError, Family, FamilyMember, Snowflake};

use crate::models::{FamilyMemberModel, FamilyModel};

use super::error::{family_not_found, map_db_error, map_unique_violation};

const FAMILY_COLUMNS: &str =
    "id, creator_id, name, avatar, invite_code, is_active, created_at, updated_at";

/// PostgreSQL implementation of FamilyRepository
#[derive(Clone)]
pub struct PgFamilyRepository {
    pool: PgPool,
}

impl PgFamilyRepository {
    /// Create a new PgFamilyRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FamilyRepository for PgFamilyRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Family>> {
        let result = sqlx::query_as::<_, FamilyModel>(&format!(
            "SELECT {FAMILY_COLUMNS} FROM families WHERE id = $1 AND is_active = TRUE",
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Family::from))
    }

    #[instrument(skip(self))]
    async fn find_by_invite_code(&self, code: &str) -> RepoResult<Option<Family>> {
        let result = sqlx::query_as::<_, FamilyModel>(&format!(
            "SELECT {FAMILY_COLUMNS} FROM families WHERE invite_code = $1 AND is_active = TRUE",
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Family::from))
    }

    #[instrument(skip(self, family))]
    async fn create(&self, family: &Family) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO families (id, creator_id, name, avatar, invite_code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(family.id.into_inner())
        .bind(family.creator_id.into_inner())
        .bind(&family.name)
        .bind(&family.avatar)
        .bind(&family.invite_code)
        .bind(family.created_at)
        .bind(family.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, family))]
    async fn update(&self, family: &Family) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE families
            SET name = $2, avatar = $3, invite_code = $4, updated_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(family.id.into_inner())
        .bind(&family.name)
        .bind(&family.avatar)
        .bind(&family.invite_code)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(family_not_found(family.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM families WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(family_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn members(&self, family_id: Snowflake) -> RepoResult<Vec<FamilyMember>> {
        let results = sqlx::query_as::<_, FamilyMemberModel>(
            r#"
            SELECT family_id, user_id, relation, created_at
            FROM family_members
            WHERE family_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(family_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(FamilyMember::from).collect())
    }

    #[instrument(skip(self))]
    async fn member_ids(&self, family_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM family_members WHERE family_id = $1 ORDER BY user_id",
        )
        .bind(family_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|(id,)| Snowflake::new(id)).collect())
    }

    #[instrument(skip(self))]
    async fn is_member(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM family_members WHERE family_id = $1 AND user_id = $2)",
        )
        .bind(family_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self, member))]
    async fn add_member(&self, member: &FamilyMember) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO family_members (family_id, user_id, relation, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(member.family_id.into_inner())
        .bind(member.user_id.into_inner())
        .bind(&member.relation)
        .bind(member.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyFamilyMember))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_member(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        sqlx::query("DELETE FROM family_members WHERE family_id = $1 AND user_id = $2")
            .bind(family_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        // Admin status does not survive leaving the family
        sqlx::query("DELETE FROM family_admins WHERE family_id = $1 AND user_id = $2")
            .bind(family_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn admin_ids(&self, family_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM family_admins WHERE family_id = $1 ORDER BY user_id",
        )
        .bind(family_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|(id,)| Snowflake::new(id)).collect())
    }

    #[instrument(skip(self))]
    async fn is_admin(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM family_admins WHERE family_id = $1 AND user_id = $2)",
        )
        .bind(family_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn add_admin(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO family_admins (family_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(family_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_admin(&self, family_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        sqlx::query("DELETE FROM family_admins WHERE family_id = $1 AND user_id = $2")
            .bind(family_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgFamilyRepository>();
    }
}
