// Copyright 2024 Gigi Team.
//
// Tests for conversation record dialects

use gigi_conversation::{
    AccessMode, AccessRole, BackendConversation, ConversationPayload, ConversationRecord,
    ConversationStatus, ConversationType, SelfState,
};
use serde_json::json;

#[test]
fn test_payload_with_members_is_backend() {
    let payload = ConversationPayload::from_value(json!({
        "id": "a",
        "members": {"self": {"status": 0}, "others": []}
    }))
    .unwrap();

    assert!(matches!(payload, ConversationPayload::Backend(_)));
    assert_eq!(payload.id(), "a");
}

#[test]
fn test_payload_without_members_is_local() {
    let payload = ConversationPayload::from_value(json!({
        "id": "a",
        "others": ["bob"],
        "last_event_timestamp": 12
    }))
    .unwrap();

    match payload {
        ConversationPayload::Local(record) => {
            assert_eq!(record.others, Some(vec!["bob".to_string()]));
            assert_eq!(record.self_state.last_event_timestamp, Some(12));
        }
        other => panic!("Expected Local payload, got {:?}", other),
    }
}

#[test]
fn test_null_members_is_local() {
    let payload = ConversationPayload::from_value(json!({
        "id": "a",
        "members": null,
        "others": ["bob"]
    }))
    .unwrap();

    assert!(matches!(payload, ConversationPayload::Local(_)));
}

#[test]
fn test_malformed_members_does_not_fall_back_to_local() {
    let value = json!({
        "id": "a",
        "members": {"self": {}, "others": [{"status": 0}]}
    });

    assert!(ConversationPayload::from_value(value.clone()).is_err());
    assert!(serde_json::from_value::<ConversationPayload>(value).is_err());
}

#[test]
fn test_payload_list_deserializes_per_dialect() {
    let payloads: Vec<ConversationPayload> = serde_json::from_value(json!([
        {"id": "a", "members": {"self": {}, "others": []}},
        {"id": "b", "team_id": "t1", "team": "t2"}
    ]))
    .unwrap();

    assert!(matches!(payloads[0], ConversationPayload::Backend(_)));
    assert_eq!(payloads[1].canonicalize().team_id.as_deref(), Some("t1"));
}

#[test]
fn test_canonical_backend_view() {
    let payload = ConversationPayload::from_value(json!({
        "id": "a",
        "team": "",
        "access": ["link", "something-new"],
        "access_role": "guest",
        "members": {
            "self": {"otr_muted": true},
            "others": [{"id": "bob", "status": 0}, {"id": "carol", "status": 1}]
        }
    }))
    .unwrap();

    let canonical = payload.canonicalize();

    assert_eq!(canonical.participating_user_ids, vec!["bob", "carol"]);
    assert_eq!(canonical.team_id, None);
    assert_eq!(
        canonical.access_modes,
        Some(vec![AccessMode::Link, AccessMode::Unknown])
    );
    assert_eq!(canonical.access_role, Some(AccessRole::Unknown));
    assert_eq!(canonical.self_state.otr_muted, Some(true));
    assert!(!canonical.is_guest);
}

#[test]
fn test_canonical_local_view() {
    let record = ConversationRecord {
        id: "a".to_string(),
        team_id: Some("team".to_string()),
        is_guest: Some(true),
        self_state: SelfState {
            muted_state: Some(true),
            ..Default::default()
        },
        ..Default::default()
    };

    let canonical = ConversationPayload::from(record).canonicalize();

    assert!(canonical.participating_user_ids.is_empty());
    assert_eq!(canonical.team_id.as_deref(), Some("team"));
    assert!(canonical.is_guest);
    assert_eq!(canonical.self_state.muted_state, Some(true));
}

#[test]
fn test_record_serializes_local_keys() {
    let record = ConversationRecord {
        id: "a".to_string(),
        conversation_type: Some(ConversationType::OneToOne),
        access_modes: Some(vec![AccessMode::Invite]),
        access_role: Some(AccessRole::Team),
        self_state: SelfState {
            status: Some(ConversationStatus::PastMember),
            last_event_timestamp: Some(3),
            ..Default::default()
        },
        ..Default::default()
    };

    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(
        value,
        json!({
            "id": "a",
            "type": 2,
            "accessModes": ["invite"],
            "accessRole": "team",
            "status": 1,
            "last_event_timestamp": 3
        })
    );
}

#[test]
fn test_unknown_integers_are_preserved() {
    let backend: BackendConversation = serde_json::from_value(json!({
        "id": "a",
        "type": 9,
        "members": {"self": {"status": 4}, "others": []}
    }))
    .unwrap();

    assert_eq!(backend.conversation_type, Some(ConversationType::Other(9)));
    assert_eq!(
        backend.members.self_member.status,
        Some(ConversationStatus::Other(4))
    );
    assert!(!ConversationStatus::Other(4).is_current_member());
}

#[test]
fn test_current_member_ids() {
    let backend: BackendConversation = serde_json::from_value(json!({
        "id": "a",
        "members": {
            "self": {},
            "others": [{"id": "bob"}, {"id": "carol", "status": 1}]
        }
    }))
    .unwrap();

    assert_eq!(backend.members.current_member_ids(), vec!["bob"]);
}

#[test]
fn test_empty_payloads() {
    assert!(ConversationPayload::Local(ConversationRecord::default()).is_empty());
    assert!(ConversationPayload::Backend(BackendConversation::default()).is_empty());
    assert!(!ConversationPayload::Local(ConversationRecord::with_id("a")).is_empty());
}

#[test]
fn test_legacy_refs_on_self_state() {
    let state = SelfState {
        otr_archived_ref: Some("1970-01-01T00:00:01Z".to_string()),
        otr_muted_ref: Some("garbage".to_string()),
        ..Default::default()
    };

    assert_eq!(state.otr_archived_timestamp(), Some(1000));
    assert_eq!(state.otr_muted_timestamp(), None);
}
