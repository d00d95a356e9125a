//! Friendship entity - a directed friend-request edge between two users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Lifecycle state of a friendship edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Requested,
    Accepted,
    Declined,
}

impl FriendshipStatus {
    /// Storage representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
        }
    }

    /// Parse the storage representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "requested" => Some(Self::Requested),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }
}

/// Friendship entity
///
/// Directed edge `from_user -> to_user`. At most one REQUESTED edge may
/// exist per unordered pair. Declined edges are deactivated, never
/// physically removed; removal of an accepted friendship is a hard delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Friendship {
    pub id: Snowflake,
    pub from_user: Snowflake,
    pub to_user: Snowflake,
    pub status: FriendshipStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Create a new pending request
    pub fn new_request(id: Snowflake, from_user: Snowflake, to_user: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            from_user,
            to_user,
            status: FriendshipStatus::Requested,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition to ACCEPTED
    pub fn accept(&mut self) {
        self.status = FriendshipStatus::Accepted;
        self.updated_at = Utc::now();
    }

    /// Transition to DECLINED and deactivate the edge
    pub fn decline(&mut self) {
        self.status = FriendshipStatus::Declined;
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Whether the given user is one of the endpoints
    #[inline]
    pub fn involves(&self, user_id: Snowflake) -> bool {
        self.from_user == user_id || self.to_user == user_id
    }

    /// The endpoint that is not `user_id`.
    ///
    /// Returns `None` when `user_id` is not an endpoint of this edge.
    pub fn other_end(&self, user_id: Snowflake) -> Option<Snowflake> {
        if self.from_user == user_id {
            Some(self.to_user)
        } else if self.to_user == user_id {
            Some(self.from_user)
        } else {
            None
        }
    }

    /// Whether this edge counts as an active friendship
    #[inline]
    pub fn is_friends(&self) -> bool {
        self.status == FriendshipStatus::Accepted && self.is_active
    }
}
