// Copyright 2024 Gigi Team.
//
// Tests for access state classification and access code mapping

use gigi_conversation::access::{is_guest_room_modes, is_invite_mode_only};
use gigi_conversation::{
    classify_access_state, AccessCode, AccessContext, AccessMode, AccessRole, AccessState,
    ConversationMapper, MapperConfig,
};
use serde_json::json;
use url::Url;

fn team_group() -> AccessContext {
    AccessContext {
        has_team: true,
        is_group: true,
        ..Default::default()
    }
}

fn access_code() -> AccessCode {
    AccessCode {
        key: "key-1".to_string(),
        code: "code-1".to_string(),
        uri: "https://example.org/conversation-join?key=key-1&code=code-1".to_string(),
    }
}

#[test]
fn test_team_one2one_wins_over_everything() {
    let context = AccessContext {
        has_team: true,
        is_one2one: true,
        ..Default::default()
    };

    let state = classify_access_state(context, &[AccessMode::Invite], AccessRole::Team);

    assert_eq!(state, AccessState::TeamOne2One);
}

#[test]
fn test_team_only() {
    let state = classify_access_state(team_group(), &[AccessMode::Invite], AccessRole::Team);

    assert_eq!(state, AccessState::TeamOnly);
}

#[test]
fn test_team_role_with_extra_mode_is_legacy() {
    let state = classify_access_state(
        team_group(),
        &[AccessMode::Invite, AccessMode::Code],
        AccessRole::Team,
    );

    assert_eq!(state, AccessState::Legacy);
}

#[test]
fn test_guest_room() {
    let state = classify_access_state(
        team_group(),
        &[AccessMode::Code, AccessMode::Invite],
        AccessRole::NonActivated,
    );

    assert_eq!(state, AccessState::GuestRoom);
}

#[test]
fn test_guest_room_with_unknown_mode_is_legacy() {
    let state = classify_access_state(
        team_group(),
        &[AccessMode::Code, AccessMode::Invite, AccessMode::Unknown],
        AccessRole::NonActivated,
    );

    assert_eq!(state, AccessState::Legacy);
}

#[test]
fn test_other_team_roles_are_legacy() {
    let state = classify_access_state(team_group(), &[AccessMode::Invite], AccessRole::Activated);

    assert_eq!(state, AccessState::Legacy);
}

#[test]
fn test_personal_states() {
    let self_context = AccessContext {
        is_self: true,
        ..Default::default()
    };
    let group_context = AccessContext {
        is_group: true,
        ..Default::default()
    };

    assert_eq!(
        classify_access_state(self_context, &[AccessMode::Private], AccessRole::Private),
        AccessState::SelfConversation
    );
    assert_eq!(
        classify_access_state(group_context, &[AccessMode::Invite], AccessRole::Activated),
        AccessState::PersonalGroup
    );
    assert_eq!(
        classify_access_state(
            AccessContext::default(),
            &[AccessMode::Private],
            AccessRole::Private
        ),
        AccessState::PersonalOne2One
    );
}

#[test]
fn test_exact_mode_sets() {
    assert!(is_invite_mode_only(&[AccessMode::Invite]));
    assert!(!is_invite_mode_only(&[AccessMode::Invite, AccessMode::Link]));
    assert!(is_guest_room_modes(&[AccessMode::Code, AccessMode::Invite]));
    assert!(!is_guest_room_modes(&[AccessMode::Code]));
}

#[test]
fn test_entity_derived_context() {
    let mapper = ConversationMapper::new();
    let conversations = mapper
        .map_json(
            &[
                json!({"id": "t1", "type": 0, "team_id": "team", "others": ["bob"],
                       "accessModes": ["invite"], "accessRole": "team"}),
                json!({"id": "s", "type": 1, "accessModes": ["private"], "accessRole": "private"}),
                json!({"id": "p", "type": 2, "others": ["bob"],
                       "accessModes": ["private"], "accessRole": "private"}),
            ],
            1,
        )
        .unwrap();

    assert_eq!(conversations[0].access_state(), AccessState::TeamOne2One);
    assert_eq!(conversations[1].access_state(), AccessState::SelfConversation);
    assert_eq!(conversations[2].access_state(), AccessState::PersonalOne2One);
}

#[test]
fn test_access_code_public_build_uses_uri() {
    let mapper = ConversationMapper::new();
    let mut conversation = mapper
        .map_json(&[json!({"id": "a", "team_id": "team"})], 1)
        .unwrap()
        .remove(0);

    assert!(mapper.map_access_code(&mut conversation, &access_code()));
    assert_eq!(conversation.access_code(), Some(access_code().uri.as_str()));
}

#[test]
fn test_access_code_internal_build_uses_join_link() {
    let config = MapperConfig {
        internal_build: true,
        webapp_internal_url: Url::parse("https://internal.example.org").unwrap(),
    };
    let mapper = ConversationMapper::with_config(config);
    let mut conversation = mapper
        .map_json(&[json!({"id": "a", "team_id": "team"})], 1)
        .unwrap()
        .remove(0);

    mapper.map_access_code(&mut conversation, &access_code());

    assert_eq!(
        conversation.access_code(),
        Some("https://internal.example.org/join/?key=key-1&code=code-1")
    );
}

#[test]
fn test_access_code_ignored_without_team() {
    let mapper = ConversationMapper::new();
    let mut conversation = mapper
        .map_json(&[json!({"id": "a"})], 1)
        .unwrap()
        .remove(0);

    assert!(!mapper.map_access_code(&mut conversation, &access_code()));
    assert_eq!(conversation.access_code(), None);
}
