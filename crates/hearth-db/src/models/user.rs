//! User database model

use chrono::{DateTime, Utc};
use hearth_core::{Snowflake, User};
use sqlx::FromRow;

/// Database model for the users table
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub is_online: bool,
    pub email_verified: bool,
    pub last_ip: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserModel> for User {
    fn from(m: UserModel) -> Self {
        User {
            id: Snowflake::new(m.id),
            email: m.email,
            username: m.username,
            first_name: m.first_name,
            last_name: m.last_name,
            avatar: m.avatar,
            is_online: m.is_online,
            email_verified: m.email_verified,
            last_ip: m.last_ip,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
