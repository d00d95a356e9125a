//! Deletion authorizer
//!
//! Layered permission rule for message deletion, evaluated in order:
//! 1. the actor authored the message
//! 2. the actor created the room
//! 3. the room belongs to a family and the actor created that family
//! 4. the room belongs to a family and the actor is both an admin and a
//!    member of it
//!
//! A message whose author was deleted can only go through rules 2-4.

use hearth_core::{Message, Room, Snowflake};

/// Family state needed by the family-scoped rules
#[derive(Debug, Clone, Default)]
pub struct FamilyContext {
    pub creator_id: Snowflake,
    pub admin_ids: Vec<Snowflake>,
    pub member_ids: Vec<Snowflake>,
}

impl FamilyContext {
    fn is_admin(&self, user_id: Snowflake) -> bool {
        self.admin_ids.contains(&user_id)
    }

    fn is_member(&self, user_id: Snowflake) -> bool {
        self.member_ids.contains(&user_id)
    }
}

/// Whether `actor` may delete `message` in `room`.
///
/// `family` must be the room's linked family when there is one; passing
/// `None` for a family room simply skips rules 3 and 4.
pub fn can_delete(
    actor: Snowflake,
    message: &Message,
    room: &Room,
    family: Option<&FamilyContext>,
) -> bool {
    if message.author_id == Some(actor) {
        return true;
    }

    if room.created_by == Some(actor) {
        return true;
    }

    if let Some(family) = family {
        if family.creator_id == actor {
            return true;
        }

        if family.is_admin(actor) && family.is_member(actor) {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::Message;

    const AUTHOR: Snowflake = Snowflake::new(1);
    const ROOM_OWNER: Snowflake = Snowflake::new(2);
    const FAMILY_CREATOR: Snowflake = Snowflake::new(3);
    const ADMIN_MEMBER: Snowflake = Snowflake::new(4);
    const ADMIN_ONLY: Snowflake = Snowflake::new(5);
    const BYSTANDER: Snowflake = Snowflake::new(9);

    fn message() -> Message {
        Message::new(Snowflake::new(100), Snowflake::new(200), AUTHOR, "hi".to_string())
    }

    fn room() -> Room {
        let mut room = Room::new_group(
            Snowflake::new(200),
            ROOM_OWNER,
            "kitchen".to_string(),
            None,
        );
        room.family_id = Some(Snowflake::new(300));
        room
    }

    fn family() -> FamilyContext {
        FamilyContext {
            creator_id: FAMILY_CREATOR,
            admin_ids: vec![ADMIN_MEMBER, ADMIN_ONLY],
            member_ids: vec![AUTHOR, ADMIN_MEMBER, BYSTANDER],
        }
    }

    #[test]
    fn test_author_can_delete() {
        assert!(can_delete(AUTHOR, &message(), &room(), None));
    }

    #[test]
    fn test_room_creator_can_delete() {
        assert!(can_delete(ROOM_OWNER, &message(), &room(), None));
    }

    #[test]
    fn test_family_creator_can_delete() {
        assert!(can_delete(FAMILY_CREATOR, &message(), &room(), Some(&family())));
    }

    #[test]
    fn test_family_admin_member_can_delete() {
        assert!(can_delete(ADMIN_MEMBER, &message(), &room(), Some(&family())));
    }

    #[test]
    fn test_admin_without_membership_cannot_delete() {
        // Rule 4 requires both admin status and membership
        assert!(!can_delete(ADMIN_ONLY, &message(), &room(), Some(&family())));
    }

    #[test]
    fn test_bystander_cannot_delete() {
        assert!(!can_delete(BYSTANDER, &message(), &room(), Some(&family())));
    }

    #[test]
    fn test_authorless_message_needs_rules_two_to_four() {
        let mut msg = message();
        msg.author_id = None;

        assert!(!can_delete(AUTHOR, &msg, &room(), None));
        assert!(can_delete(ROOM_OWNER, &msg, &room(), None));
        assert!(can_delete(FAMILY_CREATOR, &msg, &room(), Some(&family())));
    }
}
