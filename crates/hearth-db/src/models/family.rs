//! Family database models

use chrono::{DateTime, Utc};
use hearth_core::{Family, FamilyMember, Snowflake};
use sqlx::FromRow;

/// Database model for the families table
#[derive(Debug, Clone, FromRow)]
pub struct FamilyModel {
    pub id: i64,
    pub creator_id: i64,
    pub name: String,
    pub avatar: Option<String>,
    pub invite_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FamilyModel> for Family {
    fn from(m: FamilyModel) -> Self {
        Family {
            id: Snowflake::new(m.id),
            creator_id: Snowflake::new(m.creator_id),
            name: m.name,
            avatar: m.avatar,
            invite_code: m.invite_code,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Database model for the family_members table
#[derive(Debug, Clone, FromRow)]
pub struct FamilyMemberModel {
    pub family_id: i64,
    pub user_id: i64,
    pub relation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<FamilyMemberModel> for FamilyMember {
    fn from(m: FamilyMemberModel) -> Self {
        FamilyMember {
            family_id: Snowflake::new(m.family_id),
            user_id: Snowflake::new(m.user_id),
            relation: m.relation,
            created_at: m.created_at,
        }
    }
}
