//! User entity - an account on the network

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// User entity
///
/// The email address is the login key and is unique across the network.
/// The online flag is flipped by the presence service when the user's
/// presence connection is admitted or dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub is_online: bool,
    pub email_verified: bool,
    pub last_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given identity fields
    pub fn new(id: Snowflake, email: String, username: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            username,
            first_name: String::new(),
            last_name: String::new(),
            avatar: None,
            is_online: false,
            email_verified: false,
            last_ip: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display name: "First Last", falling back to the username when
    /// neither name part is set.
    pub fn full_name(&self) -> String {
        if self.first_name.is_empty() && self.last_name.is_empty() {
            self.username.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    /// Two-letter initials for avatar placeholders.
    pub fn initials(&self) -> String {
        if self.first_name.is_empty() || self.last_name.is_empty() {
            self.username.chars().take(2).collect()
        } else {
            let mut s = String::with_capacity(2);
            s.extend(self.first_name.chars().take(1));
            s.extend(self.last_name.chars().take(1));
            s
        }
    }

    /// Mark the user online or offline
    pub fn set_online(&mut self, online: bool) {
        self.is_online = online;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            Snowflake::new(1),
            "ada@example.com".to_string(),
            "ada".to_string(),
        )
    }

    #[test]
    fn test_full_name_falls_back_to_username() {
        let u = user();
        assert_eq!(u.full_name(), "ada");

        let mut named = user();
        named.first_name = "Ada".to_string();
        named.last_name = "Lovelace".to_string();
        assert_eq!(named.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_initials() {
        let u = user();
        assert_eq!(u.initials(), "ad");

        let mut named = user();
        named.first_name = "Ada".to_string();
        named.last_name = "Lovelace".to_string();
        assert_eq!(named.initials(), "AL");
    }

    #[test]
    fn test_set_online() {
        let mut u = user();
        assert!(!u.is_online);
        u.set_online(true);
        assert!(u.is_online);
        u.set_online(false);
        assert!(!u.is_online);
    }
}
