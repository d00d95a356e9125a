//! Service-level behavior tests over in-memory repositories

use hearth_core::{DomainError, Snowflake};
use hearth_service::services::{
    FamilyService, FriendshipService, MessageService, PresenceService, ReadStateService,
    RoomService, ServiceError, VideoService,
};
use hearth_service::{MediaUpload, SendMessageRequest};
use integration_tests::fixtures::TestHarness;

fn send_request(room_id: Snowflake, content: &str) -> SendMessageRequest {
    SendMessageRequest {
        room_id: room_id.to_string(),
        content: content.to_string(),
        reply_to: None,
        media: vec![],
    }
}

fn assert_domain_err<T: std::fmt::Debug>(
    result: Result<T, ServiceError>,
    expected: &DomainError,
) {
    match result {
        Err(ServiceError::Domain(e)) => {
            assert_eq!(e.code(), expected.code(), "unexpected domain error: {e}");
        }
        other => panic!("expected domain error {expected:?}, got {other:?}"),
    }
}

// ============================================================================
// Friendship state machine
// ============================================================================

#[tokio::test]
async fn duplicate_friend_request_leaves_one_edge() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);
    let svc = FriendshipService::new(&h.ctx);

    svc.send_request(a, b).await.expect("first request succeeds");

    // Same direction
    assert_domain_err(
        svc.send_request(a, b).await,
        &DomainError::FriendRequestExists,
    );
    // Opposite direction counts as a duplicate too
    assert_domain_err(
        svc.send_request(b, a).await,
        &DomainError::FriendRequestExists,
    );

    assert_eq!(h.friendships.pending_between(a, b), 1);
}

#[tokio::test]
async fn self_friend_request_is_rejected() {
    let h = TestHarness::new();
    let a = h.user("ada").await;

    assert_domain_err(
        FriendshipService::new(&h.ctx).send_request(a, a).await,
        &DomainError::SelfFriendRequest,
    );
}

#[tokio::test]
async fn accepted_friendship_is_symmetric() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);
    let svc = FriendshipService::new(&h.ctx);

    svc.send_request(a, b).await.unwrap();
    svc.accept(b, a).await.unwrap();

    let friends_of_a = svc.list_friends(a).await.unwrap();
    let friends_of_b = svc.list_friends(b).await.unwrap();

    assert!(friends_of_a.iter().any(|u| u.id == b));
    assert!(friends_of_b.iter().any(|u| u.id == a));
}

#[tokio::test]
async fn accept_without_request_is_not_found() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);

    assert_domain_err(
        FriendshipService::new(&h.ctx).accept(b, a).await,
        &DomainError::FriendRequestNotFound,
    );
}

#[tokio::test]
async fn declined_request_can_not_be_accepted() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);
    let svc = FriendshipService::new(&h.ctx);

    svc.send_request(a, b).await.unwrap();
    svc.decline(b, a).await.unwrap();

    assert_domain_err(svc.accept(b, a).await, &DomainError::FriendRequestNotFound);
    assert!(svc.list_friends(a).await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_friend_always_succeeds() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);
    let svc = FriendshipService::new(&h.ctx);

    // No friendship exists: still a no-op success
    svc.remove(a, b).await.unwrap();

    svc.send_request(a, b).await.unwrap();
    svc.accept(b, a).await.unwrap();
    svc.remove(b, a).await.unwrap();

    assert!(svc.list_friends(a).await.unwrap().is_empty());
    assert!(svc.list_friends(b).await.unwrap().is_empty());
}

// ============================================================================
// Room resolver
// ============================================================================

#[tokio::test]
async fn private_room_is_idempotent_across_orderings() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);
    let svc = RoomService::new(&h.ctx);

    let first = svc.get_or_create_private(a, b).await.unwrap();
    let second = svc.get_or_create_private(a, b).await.unwrap();
    let swapped = svc.get_or_create_private(b, a).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.id, swapped.id);

    let mut ids: Vec<Snowflake> = first.participants.iter().map(|p| p.id).collect();
    ids.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn private_room_with_self_is_rejected() {
    let h = TestHarness::new();
    let a = h.user("ada").await;

    assert_domain_err(
        RoomService::new(&h.ctx).get_or_create_private(a, a).await,
        &DomainError::SelfPrivateRoom,
    );
}

#[tokio::test]
async fn group_creator_is_always_a_participant() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);

    let room = RoomService::new(&h.ctx)
        .create_group(
            a,
            hearth_service::CreateGroupRequest {
                title: "Weekend plans".to_string(),
                description: None,
                member_ids: vec![b.to_string()],
            },
        )
        .await
        .unwrap();

    assert!(room.participants.iter().any(|p| p.id == a));
    assert!(room.participants.iter().any(|p| p.id == b));
    assert_eq!(room.created_by, Some(a));
}

#[tokio::test]
async fn creator_cannot_be_removed_or_leave_without_transfer() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);
    let svc = RoomService::new(&h.ctx);

    let room = svc
        .create_group(
            a,
            hearth_service::CreateGroupRequest {
                title: "Kitchen".to_string(),
                description: None,
                member_ids: vec![b.to_string()],
            },
        )
        .await
        .unwrap();

    assert_domain_err(
        svc.remove_participants(a, room.id, &[a.to_string()]).await,
        &DomainError::CannotRemoveCreator,
    );
    assert_domain_err(
        svc.leave(a, room.id).await,
        &DomainError::CannotLeaveOwnedRoom,
    );

    // After transferring to a participant, leaving works
    svc.transfer_ownership(a, room.id, b).await.unwrap();
    svc.leave(a, room.id).await.unwrap();

    let remaining = h.ctx.room_repo().participants(room.id).await.unwrap();
    assert_eq!(remaining, vec![b]);
}

#[tokio::test]
async fn ownership_transfer_requires_participant() {
    let h = TestHarness::new();
    let (a, b, outsider) = (
        h.user("ada").await,
        h.user("brian").await,
        h.user("carol").await,
    );
    let svc = RoomService::new(&h.ctx);

    let room = svc
        .create_group(
            a,
            hearth_service::CreateGroupRequest {
                title: "Kitchen".to_string(),
                description: None,
                member_ids: vec![b.to_string()],
            },
        )
        .await
        .unwrap();

    assert_domain_err(
        svc.transfer_ownership(a, room.id, outsider).await,
        &DomainError::OwnerNotParticipant,
    );
}

// ============================================================================
// Family room sync
// ============================================================================

#[tokio::test]
async fn family_room_follows_membership() {
    let h = TestHarness::new();
    let (a, b, c) = (
        h.user("ada").await,
        h.user("brian").await,
        h.user("carol").await,
    );

    let family_svc = FamilyService::new(&h.ctx);
    let family = family_svc.create(a, "The Lovelaces".to_string()).await.unwrap();

    family_svc.add_member(a, family.id, b, None).await.unwrap();

    let room = h
        .ctx
        .room_repo()
        .find_by_family(family.id)
        .await
        .unwrap()
        .expect("family room exists");
    let mut participants = h.ctx.room_repo().participants(room.id).await.unwrap();
    participants.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(participants, expected);

    // Growing the family grows the same room, never a second one
    family_svc.add_member(a, family.id, c, None).await.unwrap();

    let room_again = h
        .ctx
        .room_repo()
        .find_by_family(family.id)
        .await
        .unwrap()
        .expect("family room still exists");
    assert_eq!(room.id, room_again.id);
    assert_eq!(
        h.ctx.room_repo().participants(room.id).await.unwrap().len(),
        3
    );

    // Removing a member shrinks it
    family_svc.remove_member(a, family.id, b).await.unwrap();
    assert_eq!(
        h.ctx.room_repo().participants(room.id).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn deleting_family_deletes_its_room() {
    let h = TestHarness::new();
    let a = h.user("ada").await;

    let family_svc = FamilyService::new(&h.ctx);
    let family = family_svc.create(a, "The Lovelaces".to_string()).await.unwrap();

    let room = h
        .ctx
        .room_repo()
        .find_by_family(family.id)
        .await
        .unwrap()
        .expect("family room exists");

    family_svc.delete(a, family.id).await.unwrap();

    assert!(h.ctx.room_repo().find_by_id(room.id).await.unwrap().is_none());
    assert!(h.ctx.family_repo().find_by_id(family.id).await.unwrap().is_none());
}

#[tokio::test]
async fn invite_code_join_adds_member() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);

    let family_svc = FamilyService::new(&h.ctx);
    let family = family_svc.create(a, "The Lovelaces".to_string()).await.unwrap();

    let joined = family_svc
        .join_by_invite(b, &family.invite_code)
        .await
        .unwrap();
    assert!(joined.members.iter().any(|m| m.id == b));

    assert_domain_err(
        family_svc.join_by_invite(b, "WRONGCODE1").await,
        &DomainError::InviteCodeInvalid,
    );
}

// ============================================================================
// Message pipeline
// ============================================================================

#[tokio::test]
async fn non_participant_cannot_send() {
    let h = TestHarness::new();
    let (a, b, outsider) = (
        h.user("ada").await,
        h.user("brian").await,
        h.user("carol").await,
    );

    let room = RoomService::new(&h.ctx)
        .get_or_create_private(a, b)
        .await
        .unwrap();

    assert_domain_err(
        MessageService::new(&h.ctx)
            .send_message(outsider, send_request(room.id, "let me in"))
            .await,
        &DomainError::NotParticipant,
    );
    assert_eq!(h.messages.message_count(), 0);
}

#[tokio::test]
async fn dangling_reply_persists_nothing() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);

    let room = RoomService::new(&h.ctx)
        .get_or_create_private(a, b)
        .await
        .unwrap();

    let mut request = send_request(room.id, "re: nothing");
    request.reply_to = Some("999999".to_string());

    assert_domain_err(
        MessageService::new(&h.ctx).send_message(a, request).await,
        &DomainError::MessageNotFound(Snowflake::new(999_999)),
    );
    assert_eq!(h.messages.message_count(), 0);
}

#[tokio::test]
async fn invalid_media_rolls_back_the_send() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);

    let room = RoomService::new(&h.ctx)
        .get_or_create_private(a, b)
        .await
        .unwrap();

    let mut request = send_request(room.id, "photos attached");
    request.media = vec![
        MediaUpload {
            file_path: "pictures/one.png".to_string(),
            size_bytes: 1024,
            extension: "png".to_string(),
        },
        MediaUpload {
            file_path: String::new(),
            size_bytes: 0,
            extension: String::new(),
        },
    ];

    assert!(MessageService::new(&h.ctx)
        .send_message(a, request)
        .await
        .is_err());
    assert_eq!(h.messages.message_count(), 0, "all-or-nothing send");
}

#[tokio::test]
async fn send_reply_and_history_roundtrip() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);
    let svc = MessageService::new(&h.ctx);

    let room = RoomService::new(&h.ctx)
        .get_or_create_private(a, b)
        .await
        .unwrap();

    let first = svc
        .send_message(a, send_request(room.id, "dinner at seven?"))
        .await
        .unwrap();

    let mut reply = send_request(room.id, "make it eight");
    reply.reply_to = Some(first.id.to_string());
    let second = svc.send_message(b, reply).await.unwrap();

    assert_eq!(second.reply_to, Some(first.id));

    let history = svc.room_history(a, room.id, 25).await.unwrap();
    assert_eq!(history.len(), 2);
    // Newest first
    assert_eq!(history[0].id, second.id);
    assert_eq!(history[1].id, first.id);
}

#[tokio::test]
async fn edit_is_author_only_and_stamps_edited_at() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);
    let svc = MessageService::new(&h.ctx);

    let room = RoomService::new(&h.ctx)
        .get_or_create_private(a, b)
        .await
        .unwrap();
    let message = svc
        .send_message(a, send_request(room.id, "dinner at sevn"))
        .await
        .unwrap();

    assert_domain_err(
        svc.edit_message(b, message.id, "hijacked".to_string()).await,
        &DomainError::NotMessageAuthor,
    );

    let edited = svc
        .edit_message(a, message.id, "dinner at seven".to_string())
        .await
        .unwrap();
    assert!(edited.is_edited);
    assert_eq!(edited.content, "dinner at seven");
}

// ============================================================================
// Deletion authorization
// ============================================================================

#[tokio::test]
async fn deletion_respects_the_layered_rule() {
    let h = TestHarness::new();
    let (a, b, c) = (
        h.user("ada").await,
        h.user("brian").await,
        h.user("carol").await,
    );

    // c creates the room with participants {a, b, c}
    let room = RoomService::new(&h.ctx)
        .create_group(
            c,
            hearth_service::CreateGroupRequest {
                title: "Kitchen".to_string(),
                description: None,
                member_ids: vec![a.to_string(), b.to_string()],
            },
        )
        .await
        .unwrap();

    let svc = MessageService::new(&h.ctx);
    let message = svc
        .send_message(a, send_request(room.id, "hello all"))
        .await
        .unwrap();

    // b is a participant but neither author nor creator
    assert_domain_err(
        svc.delete_message(b, message.id).await,
        &DomainError::DeleteForbidden,
    );
    assert!(h
        .ctx
        .message_repo()
        .find_by_id(message.id)
        .await
        .unwrap()
        .is_some());

    // The room creator may delete
    svc.delete_message(c, message.id).await.unwrap();
    assert!(h
        .ctx
        .message_repo()
        .find_by_id(message.id)
        .await
        .unwrap()
        .is_none());
    assert!(h
        .ctx
        .message_repo()
        .media_for(message.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn family_admin_member_can_delete_in_family_room() {
    let h = TestHarness::new();
    let (creator, admin, poster) = (
        h.user("ada").await,
        h.user("brian").await,
        h.user("carol").await,
    );

    let family_svc = FamilyService::new(&h.ctx);
    let family = family_svc.create(creator, "Lovelaces".to_string()).await.unwrap();
    family_svc.add_member(creator, family.id, admin, None).await.unwrap();
    family_svc.add_member(creator, family.id, poster, None).await.unwrap();
    family_svc.promote_admin(creator, family.id, admin).await.unwrap();

    let room = h
        .ctx
        .room_repo()
        .find_by_family(family.id)
        .await
        .unwrap()
        .expect("family room exists");

    let svc = MessageService::new(&h.ctx);
    let message = svc
        .send_message(poster, send_request(room.id, "family dinner sunday"))
        .await
        .unwrap();

    // Admin+member passes rule 4
    svc.delete_message(admin, message.id).await.unwrap();
}

// ============================================================================
// Read state
// ============================================================================

#[tokio::test]
async fn mark_read_is_idempotent() {
    let h = TestHarness::new();
    let (a, b) = (h.user("ada").await, h.user("brian").await);

    let room = RoomService::new(&h.ctx)
        .get_or_create_private(a, b)
        .await
        .unwrap();
    let message = MessageService::new(&h.ctx)
        .send_message(a, send_request(room.id, "seen this?"))
        .await
        .unwrap();

    let svc = ReadStateService::new(&h.ctx);
    let ids = vec![message.id.to_string()];

    let once = svc.mark_read(b, &ids).await.unwrap();
    let twice = svc.mark_read(b, &ids).await.unwrap();

    assert_eq!(once[0].have_read, twice[0].have_read);
    assert_eq!(
        h.ctx.message_repo().readers(message.id).await.unwrap(),
        vec![b]
    );
}

#[tokio::test]
async fn mark_read_requires_participation() {
    let h = TestHarness::new();
    let (a, b, outsider) = (
        h.user("ada").await,
        h.user("brian").await,
        h.user("carol").await,
    );

    let room = RoomService::new(&h.ctx)
        .get_or_create_private(a, b)
        .await
        .unwrap();
    let message = MessageService::new(&h.ctx)
        .send_message(a, send_request(room.id, "private"))
        .await
        .unwrap();

    assert_domain_err(
        ReadStateService::new(&h.ctx)
            .mark_read(outsider, &[message.id.to_string()])
            .await,
        &DomainError::NotParticipant,
    );
    assert!(h.ctx.message_repo().readers(message.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn typing_requires_participation() {
    let h = TestHarness::new();
    let (a, b, outsider) = (
        h.user("ada").await,
        h.user("brian").await,
        h.user("carol").await,
    );

    let room = RoomService::new(&h.ctx)
        .get_or_create_private(a, b)
        .await
        .unwrap();

    let svc = ReadStateService::new(&h.ctx);
    svc.typing(a, room.id).await.unwrap();
    svc.stop_typing(a, room.id).await.unwrap();

    assert_domain_err(
        svc.typing(outsider, room.id).await,
        &DomainError::NotParticipant,
    );
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn presence_flag_follows_connect_and_disconnect() {
    let h = TestHarness::new();
    let a = h.user("ada").await;
    let svc = PresenceService::new(&h.ctx);

    assert!(!h.ctx.user_repo().find_by_id(a).await.unwrap().unwrap().is_online);

    svc.connected(a).await.unwrap();
    assert!(h.ctx.user_repo().find_by_id(a).await.unwrap().unwrap().is_online);

    svc.disconnected(a).await.unwrap();
    assert!(!h.ctx.user_repo().find_by_id(a).await.unwrap().unwrap().is_online);
}

// ============================================================================
// Video calls
// ============================================================================

#[tokio::test]
async fn video_join_requires_participation_and_returns_token() {
    let h = TestHarness::new();
    let (a, b, outsider) = (
        h.user("ada").await,
        h.user("brian").await,
        h.user("carol").await,
    );

    let room = RoomService::new(&h.ctx)
        .get_or_create_private(a, b)
        .await
        .unwrap();
    let svc = VideoService::new(&h.ctx);

    assert_domain_err(
        svc.join_call(outsider, room.id).await,
        &DomainError::NotParticipant,
    );

    let join = svc.join_call(a, room.id).await.unwrap();
    assert_eq!(join.token, "test-join-token");
    assert_eq!(join.server_url, "wss://video.test.local");
    assert_eq!(join.room_id, room.id);

    // Second join reuses the same call
    svc.join_call(b, room.id).await.unwrap();
    let call = h
        .ctx
        .video_call_repo()
        .find_by_room(room.id)
        .await
        .unwrap()
        .expect("call exists");
    let participants = h.ctx.video_call_repo().participants(call.id).await.unwrap();
    assert_eq!(participants.len(), 2);

    svc.end_call(a, room.id).await.unwrap();
    let ended = h
        .ctx
        .video_call_repo()
        .find_by_room(room.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!ended.is_ongoing());
}
