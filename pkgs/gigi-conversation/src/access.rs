//! Access state classification and join links

use std::collections::BTreeSet;
use url::Url;

use crate::entity::Conversation;
use crate::types::{AccessCode, AccessMode, AccessRole, AccessState};

/// Facts about a conversation the classifier depends on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessContext {
    pub has_team: bool,
    pub is_one2one: bool,
    pub is_self: bool,
    pub is_group: bool,
}

impl AccessContext {
    pub fn from_conversation(conversation: &Conversation) -> Self {
        Self {
            has_team: conversation.is_team_conversation(),
            is_one2one: conversation.is_one2one(),
            is_self: conversation.is_self(),
            is_group: conversation.is_group(),
        }
    }
}

/// Derive the access state of a conversation
///
/// Predicates overlap, the first match wins:
///
/// ```text
/// team + 1:1                                  -> TeamOne2One
/// team + role team + modes {invite}           -> TeamOnly
/// team + role non_activated + {code, invite}  -> GuestRoom
/// team                                        -> Legacy
/// self                                        -> SelfConversation
/// group                                       -> PersonalGroup
/// otherwise                                   -> PersonalOne2One
/// ```
pub fn classify_access_state(
    context: AccessContext,
    access_modes: &[AccessMode],
    access_role: AccessRole,
) -> AccessState {
    if context.has_team {
        if context.is_one2one {
            return AccessState::TeamOne2One;
        }

        if access_role == AccessRole::Team && is_invite_mode_only(access_modes) {
            return AccessState::TeamOnly;
        }

        if access_role == AccessRole::NonActivated && is_guest_room_modes(access_modes) {
            return AccessState::GuestRoom;
        }

        return AccessState::Legacy;
    }

    if context.is_self {
        return AccessState::SelfConversation;
    }

    if context.is_group {
        AccessState::PersonalGroup
    } else {
        AccessState::PersonalOne2One
    }
}

/// Modes are exactly `{invite}`
pub fn is_invite_mode_only(access_modes: &[AccessMode]) -> bool {
    is_exact_set(access_modes, &[AccessMode::Invite])
}

/// Modes are exactly `{code, invite}`
pub fn is_guest_room_modes(access_modes: &[AccessMode]) -> bool {
    is_exact_set(access_modes, &[AccessMode::Code, AccessMode::Invite])
}

fn is_exact_set(access_modes: &[AccessMode], expected: &[AccessMode]) -> bool {
    let actual: BTreeSet<AccessMode> = access_modes.iter().copied().collect();
    let expected: BTreeSet<AccessMode> = expected.iter().copied().collect();
    actual == expected
}

/// Join link pointing at the internal web app
pub fn build_join_link(base: &Url, access_code: &AccessCode) -> String {
    format!(
        "{}/join/?key={}&code={}",
        base.as_str().trim_end_matches('/'),
        access_code.key,
        access_code.code
    )
}
