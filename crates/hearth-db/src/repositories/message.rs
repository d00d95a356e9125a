//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use hearth_core::traits::{MessageRepository, RepoResult};
use hearth_core::{Message, MessageMedia, Snowflake};

use crate::models::{MessageMediaModel, MessageModel};

use super::error::{map_db_error, message_not_found};

const MESSAGE_COLUMNS: &str =
    "id, room_id, author_id, content, reply_to, edited_at, is_active, created_at";

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1 AND is_active = TRUE",
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn recent_in_room(&self, room_id: Snowflake, limit: i64) -> RepoResult<Vec<Message>> {
        let limit = limit.clamp(1, 100);

        let results = sqlx::query_as::<_, MessageModel>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE room_id = $1 AND is_active = TRUE
            ORDER BY id DESC
            LIMIT $2
            "#,
        ))
        .bind(room_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self, message, media))]
    async fn create_with_media(
        &self,
        message: &Message,
        media: &[MessageMedia],
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, room_id, author_id, content, reply_to, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id.into_inner())
        .bind(message.room_id.into_inner())
        .bind(message.author_id.map(Snowflake::into_inner))
        .bind(&message.content)
        .bind(message.reply_to.map(Snowflake::into_inner))
        .bind(message.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        for item in media {
            sqlx::query(
                r#"
                INSERT INTO message_media (id, message_id, file_path, size_bytes, extension, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.id.into_inner())
            .bind(item.message_id.into_inner())
            .bind(&item.file_path)
            .bind(item.size_bytes)
            .bind(&item.extension)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        // One commit for message + media: a failed media row rolls back everything
        tx.commit().await.map_err(map_db_error)
    }

    #[instrument(skip(self, message))]
    async fn update(&self, message: &Message) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET content = $2, edited_at = NOW()
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(message.id.into_inner())
        .bind(&message.content)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(message.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        // Hard delete; message_media and message_reads cascade
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn media_for(&self, message_id: Snowflake) -> RepoResult<Vec<MessageMedia>> {
        let results = sqlx::query_as::<_, MessageMediaModel>(
            r#"
            SELECT id, message_id, file_path, size_bytes, extension, created_at
            FROM message_media
            WHERE message_id = $1
            ORDER BY id
            "#,
        )
        .bind(message_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(MessageMedia::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, message_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        // ON CONFLICT DO NOTHING makes the read receipt idempotent
        sqlx::query(
            r#"
            INSERT INTO message_reads (message_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(message_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn readers(&self, message_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT user_id FROM message_reads WHERE message_id = $1 ORDER BY user_id",
        )
        .bind(message_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|(id,)| Snowflake::new(id)).collect())
    }
}
