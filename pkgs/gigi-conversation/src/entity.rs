//! Conversation entity
//!
//! The entity owns no change-notification machinery. Every setter reports
//! whether it changed the stored value, and mapper operations collect those
//! reports into [`ChangedFields`] so the caller can decide what to re-render
//! or re-emit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{
    AccessState, ConversationStatus, ConversationType, TimestampType, VerificationState,
};

/// Mutable fields of a [`Conversation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationField {
    Creator,
    Name,
    Type,
    ParticipatingUserIds,
    TeamId,
    ArchivedTimestamp,
    ClearedTimestamp,
    LastEventTimestamp,
    LastReadTimestamp,
    LastServerTimestamp,
    MutedTimestamp,
    ArchivedState,
    MutedState,
    EphemeralTimer,
    Status,
    VerificationState,
    IsGuest,
    AccessState,
    AccessCode,
}

impl From<TimestampType> for ConversationField {
    fn from(kind: TimestampType) -> Self {
        match kind {
            TimestampType::Archived => ConversationField::ArchivedTimestamp,
            TimestampType::Cleared => ConversationField::ClearedTimestamp,
            TimestampType::LastEvent => ConversationField::LastEventTimestamp,
            TimestampType::LastRead => ConversationField::LastReadTimestamp,
            TimestampType::LastServer => ConversationField::LastServerTimestamp,
            TimestampType::Muted => ConversationField::MutedTimestamp,
        }
    }
}

/// Set of fields an operation actually changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangedFields(BTreeSet<ConversationField>);

impl ChangedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `field` if `changed` is true
    pub fn record(&mut self, field: ConversationField, changed: bool) {
        if changed {
            self.0.insert(field);
        }
    }

    pub fn contains(&self, field: ConversationField) -> bool {
        self.0.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationField> {
        self.0.iter()
    }

    pub fn merge(&mut self, other: ChangedFields) {
        self.0.extend(other.0);
    }
}

/// Client-side conversation entity
///
/// The id is fixed at construction; everything else goes through setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    id: String,
    creator: Option<String>,
    name: String,
    #[serde(rename = "type")]
    conversation_type: ConversationType,
    participating_user_ids: Vec<String>,
    team_id: Option<String>,

    archived_timestamp: Option<i64>,
    cleared_timestamp: Option<i64>,
    last_event_timestamp: Option<i64>,
    last_read_timestamp: Option<i64>,
    last_server_timestamp: Option<i64>,
    muted_timestamp: Option<i64>,

    archived_state: bool,
    muted_state: bool,
    ephemeral_timer: Option<i64>,
    status: ConversationStatus,
    verification_state: VerificationState,

    is_guest: bool,
    access_state: AccessState,
    access_code: Option<String>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            creator: None,
            name: String::new(),
            conversation_type: ConversationType::default(),
            participating_user_ids: Vec::new(),
            team_id: None,
            archived_timestamp: None,
            cleared_timestamp: None,
            last_event_timestamp: None,
            last_read_timestamp: None,
            last_server_timestamp: None,
            muted_timestamp: None,
            archived_state: false,
            muted_state: false,
            ephemeral_timer: None,
            status: ConversationStatus::default(),
            verification_state: VerificationState::default(),
            is_guest: false,
            access_state: AccessState::default(),
            access_code: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conversation_type(&self) -> ConversationType {
        self.conversation_type
    }

    pub fn participating_user_ids(&self) -> &[String] {
        &self.participating_user_ids
    }

    pub fn team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    pub fn timestamp(&self, kind: TimestampType) -> Option<i64> {
        match kind {
            TimestampType::Archived => self.archived_timestamp,
            TimestampType::Cleared => self.cleared_timestamp,
            TimestampType::LastEvent => self.last_event_timestamp,
            TimestampType::LastRead => self.last_read_timestamp,
            TimestampType::LastServer => self.last_server_timestamp,
            TimestampType::Muted => self.muted_timestamp,
        }
    }

    pub fn last_event_timestamp(&self) -> Option<i64> {
        self.last_event_timestamp
    }

    pub fn last_server_timestamp(&self) -> Option<i64> {
        self.last_server_timestamp
    }

    pub fn archived_state(&self) -> bool {
        self.archived_state
    }

    pub fn muted_state(&self) -> bool {
        self.muted_state
    }

    pub fn ephemeral_timer(&self) -> Option<i64> {
        self.ephemeral_timer
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    pub fn verification_state(&self) -> VerificationState {
        self.verification_state
    }

    pub fn is_guest(&self) -> bool {
        self.is_guest
    }

    pub fn access_state(&self) -> AccessState {
        self.access_state
    }

    pub fn access_code(&self) -> Option<&str> {
        self.access_code.as_deref()
    }

    /// Write a timestamp slot
    ///
    /// `None` and `0` count as absent and leave the slot untouched. Any other
    /// value overwrites, newer or not.
    pub fn set_timestamp(&mut self, timestamp: Option<i64>, kind: TimestampType) -> bool {
        let Some(timestamp) = timestamp.filter(|t| *t != 0) else {
            return false;
        };

        let slot = match kind {
            TimestampType::Archived => &mut self.archived_timestamp,
            TimestampType::Cleared => &mut self.cleared_timestamp,
            TimestampType::LastEvent => &mut self.last_event_timestamp,
            TimestampType::LastRead => &mut self.last_read_timestamp,
            TimestampType::LastServer => &mut self.last_server_timestamp,
            TimestampType::Muted => &mut self.muted_timestamp,
        };
        replace(slot, Some(timestamp))
    }

    pub fn set_creator(&mut self, creator: Option<String>) -> bool {
        replace(&mut self.creator, creator)
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        replace(&mut self.name, name.into())
    }

    pub fn set_conversation_type(&mut self, conversation_type: ConversationType) -> bool {
        replace(&mut self.conversation_type, conversation_type)
    }

    pub fn set_participating_user_ids(&mut self, user_ids: Vec<String>) -> bool {
        replace(&mut self.participating_user_ids, user_ids)
    }

    pub fn set_team_id(&mut self, team_id: Option<String>) -> bool {
        replace(&mut self.team_id, team_id.filter(|id| !id.is_empty()))
    }

    pub fn set_archived_state(&mut self, archived: bool) -> bool {
        replace(&mut self.archived_state, archived)
    }

    pub fn set_muted_state(&mut self, muted: bool) -> bool {
        replace(&mut self.muted_state, muted)
    }

    pub fn set_ephemeral_timer(&mut self, timer: i64) -> bool {
        replace(&mut self.ephemeral_timer, Some(timer))
    }

    pub fn set_status(&mut self, status: ConversationStatus) -> bool {
        replace(&mut self.status, status)
    }

    pub fn set_verification_state(&mut self, state: VerificationState) -> bool {
        replace(&mut self.verification_state, state)
    }

    pub fn set_is_guest(&mut self, is_guest: bool) -> bool {
        replace(&mut self.is_guest, is_guest)
    }

    pub fn set_access_state(&mut self, state: AccessState) -> bool {
        replace(&mut self.access_state, state)
    }

    pub fn set_access_code(&mut self, code: impl Into<String>) -> bool {
        replace(&mut self.access_code, Some(code.into()))
    }

    /// Fields whose value differs from `before`
    ///
    /// Reports the net effect of a sequence of setter calls: a field written
    /// twice and ending up at its old value is not a change.
    pub fn changes_since(&self, before: &Conversation) -> ChangedFields {
        let mut changes = ChangedFields::new();
        changes.record(ConversationField::Creator, self.creator != before.creator);
        changes.record(ConversationField::Name, self.name != before.name);
        changes.record(
            ConversationField::Type,
            self.conversation_type != before.conversation_type,
        );
        changes.record(
            ConversationField::ParticipatingUserIds,
            self.participating_user_ids != before.participating_user_ids,
        );
        changes.record(ConversationField::TeamId, self.team_id != before.team_id);
        changes.record(
            ConversationField::ArchivedTimestamp,
            self.archived_timestamp != before.archived_timestamp,
        );
        changes.record(
            ConversationField::ClearedTimestamp,
            self.cleared_timestamp != before.cleared_timestamp,
        );
        changes.record(
            ConversationField::LastEventTimestamp,
            self.last_event_timestamp != before.last_event_timestamp,
        );
        changes.record(
            ConversationField::LastReadTimestamp,
            self.last_read_timestamp != before.last_read_timestamp,
        );
        changes.record(
            ConversationField::LastServerTimestamp,
            self.last_server_timestamp != before.last_server_timestamp,
        );
        changes.record(
            ConversationField::MutedTimestamp,
            self.muted_timestamp != before.muted_timestamp,
        );
        changes.record(
            ConversationField::ArchivedState,
            self.archived_state != before.archived_state,
        );
        changes.record(
            ConversationField::MutedState,
            self.muted_state != before.muted_state,
        );
        changes.record(
            ConversationField::EphemeralTimer,
            self.ephemeral_timer != before.ephemeral_timer,
        );
        changes.record(ConversationField::Status, self.status != before.status);
        changes.record(
            ConversationField::VerificationState,
            self.verification_state != before.verification_state,
        );
        changes.record(ConversationField::IsGuest, self.is_guest != before.is_guest);
        changes.record(
            ConversationField::AccessState,
            self.access_state != before.access_state,
        );
        changes.record(
            ConversationField::AccessCode,
            self.access_code != before.access_code,
        );
        changes
    }

    pub fn is_self(&self) -> bool {
        self.conversation_type == ConversationType::SelfConversation
    }

    pub fn is_team_conversation(&self) -> bool {
        self.team_id.is_some()
    }

    /// Team 1:1s are regular conversations with a single unnamed peer
    pub fn is_team_one2one(&self) -> bool {
        self.conversation_type == ConversationType::Regular
            && self.is_team_conversation()
            && self.participating_user_ids.len() == 1
            && self.name.is_empty()
    }

    pub fn is_one2one(&self) -> bool {
        self.conversation_type == ConversationType::OneToOne || self.is_team_one2one()
    }

    pub fn is_group(&self) -> bool {
        self.conversation_type == ConversationType::Regular && !self.is_team_one2one()
    }
}

/// Partial update of a conversation
///
/// Absent fields are skipped. An `id` key in the source data is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConversationUpdate {
    pub creator: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub conversation_type: Option<ConversationType>,
    pub participating_user_ids: Option<Vec<String>>,
    pub team_id: Option<String>,
    pub archived_state: Option<bool>,
    pub muted_state: Option<bool>,
    pub ephemeral_timer: Option<i64>,
    pub status: Option<ConversationStatus>,
    pub verification_state: Option<VerificationState>,
    pub is_guest: Option<bool>,
    pub access_state: Option<AccessState>,
    pub access_code: Option<String>,
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_defaults() {
        let conversation = Conversation::new("abc");

        assert_eq!(conversation.id(), "abc");
        assert_eq!(conversation.name(), "");
        assert_eq!(conversation.access_state(), AccessState::Unknown);
        assert!(conversation.last_event_timestamp().is_none());
        assert!(!conversation.archived_state());
    }

    #[test]
    fn test_set_timestamp_ignores_zero_and_none() {
        let mut conversation = Conversation::new("abc");
        assert!(conversation.set_timestamp(Some(10), TimestampType::LastRead));

        assert!(!conversation.set_timestamp(Some(0), TimestampType::LastRead));
        assert!(!conversation.set_timestamp(None, TimestampType::LastRead));
        assert_eq!(conversation.timestamp(TimestampType::LastRead), Some(10));
    }

    #[test]
    fn test_set_timestamp_overwrites_with_older_value() {
        let mut conversation = Conversation::new("abc");
        conversation.set_timestamp(Some(10), TimestampType::Archived);

        assert!(conversation.set_timestamp(Some(5), TimestampType::Archived));
        assert_eq!(conversation.timestamp(TimestampType::Archived), Some(5));
    }

    #[test]
    fn test_setters_report_changes() {
        let mut conversation = Conversation::new("abc");

        assert!(conversation.set_name("Team"));
        assert!(!conversation.set_name("Team"));
        assert!(!conversation.set_team_id(Some(String::new())));
        assert!(conversation.team_id().is_none());
    }

    #[test]
    fn test_team_one2one_detection() {
        let mut conversation = Conversation::new("abc");
        conversation.set_team_id(Some("team".to_string()));
        conversation.set_participating_user_ids(vec!["peer".to_string()]);

        assert!(conversation.is_team_one2one());
        assert!(conversation.is_one2one());
        assert!(!conversation.is_group());

        conversation.set_name("Named");
        assert!(!conversation.is_team_one2one());
        assert!(conversation.is_group());
    }

    #[test]
    fn test_changes_since_reports_net_effect() {
        let before = Conversation::new("abc");
        let mut after = before.clone();
        after.set_muted_state(true);
        after.set_muted_state(false);
        after.set_timestamp(Some(42), TimestampType::Cleared);

        let changes = after.changes_since(&before);

        assert_eq!(changes.len(), 1);
        assert!(changes.contains(ConversationField::ClearedTimestamp));
    }

    #[test]
    fn test_changed_fields_record() {
        let mut changes = ChangedFields::new();
        changes.record(ConversationField::Name, true);
        changes.record(ConversationField::Creator, false);

        assert_eq!(changes.len(), 1);
        assert!(changes.contains(ConversationField::Name));
        assert!(!changes.contains(ConversationField::Creator));
    }
}
