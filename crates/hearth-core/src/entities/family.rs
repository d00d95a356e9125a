//! Family entity - a named group of users with admins and an invite code

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::value_objects::Snowflake;

/// Alphabet for invite codes; ambiguous characters (O/0, I/1) excluded
const INVITE_CODE_ALPHABET: &[u8] = b"QWERTYUIOPASDFGHJKLZXCVBNM123456789";

/// Length of generated invite codes
const INVITE_CODE_LEN: usize = 10;

/// Generate a random family invite code
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..INVITE_CODE_ALPHABET.len());
            INVITE_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Family entity
///
/// Membership and the admin set are associations resolved through the
/// repository. Every family has exactly one system-managed chat room which
/// the room service keeps in sync with the membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Family {
    pub id: Snowflake,
    pub creator_id: Snowflake,
    pub name: String,
    pub avatar: Option<String>,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Family {
    /// Create a new Family with a fresh invite code
    pub fn new(id: Snowflake, creator_id: Snowflake, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            creator_id,
            name,
            avatar: None,
            invite_code: generate_invite_code(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given user created this family
    #[inline]
    pub fn is_creator(&self, user_id: Snowflake) -> bool {
        self.creator_id == user_id
    }

    /// Replace the invite code, invalidating the old one
    pub fn rotate_invite_code(&mut self) {
        self.invite_code = generate_invite_code();
        self.updated_at = Utc::now();
    }
}

/// Membership record linking a user to a family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyMember {
    pub family_id: Snowflake,
    pub user_id: Snowflake,
    /// Free-form kinship label ("mother", "cousin", ...)
    pub relation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FamilyMember {
    /// Create a new membership record
    pub fn new(family_id: Snowflake, user_id: Snowflake, relation: Option<String>) -> Self {
        Self {
            family_id,
            user_id,
            relation,
            created_at: Utc::now(),
        }
    }
}
