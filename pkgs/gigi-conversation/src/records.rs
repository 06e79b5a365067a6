//! Raw conversation records
//!
//! Conversations reach the mapper in two dialects:
//!
//! - **Backend** ([`BackendConversation`]): the wire payload, with the self
//!   membership nested under `members.self`, participants as objects under
//!   `members.others`, and `team` / `access` / `access_role` keys.
//! - **Local** ([`ConversationRecord`]): what the client persists, with the
//!   self state flattened into the record, participants as plain ids under
//!   `others`, and `team_id` / `accessModes` / `accessRole` keys.
//!
//! [`ConversationPayload`] accepts either one, and
//! [`ConversationPayload::canonicalize`] turns both into a single
//! [`CanonicalConversation`] that the mapping rules run on.

use chrono::{DateTime, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{ConversationError, Result};
use crate::types::{AccessMode, AccessRole, ConversationStatus, ConversationType, VerificationState};

/// Self membership state of a conversation
///
/// Every field is optional: an absent field means "leave the entity alone".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared_timestamp: Option<i64>,
    /// Message timer in milliseconds, `0` switches it off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ephemeral_timer: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_read_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_server_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ConversationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_state: Option<VerificationState>,

    // Legacy backend fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otr_archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otr_archived_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otr_muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otr_muted_ref: Option<String>,
}

impl SelfState {
    /// Archive timestamp carried by the legacy `otr_archived_ref` field
    pub fn otr_archived_timestamp(&self) -> Option<i64> {
        parse_legacy_ref(self.otr_archived_ref.as_deref())
    }

    /// Mute timestamp carried by the legacy `otr_muted_ref` field
    pub fn otr_muted_timestamp(&self) -> Option<i64> {
        parse_legacy_ref(self.otr_muted_ref.as_deref())
    }
}

/// Another participant as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMember {
    pub id: String,
    #[serde(default)]
    pub status: ConversationStatus,
}

/// Membership block of a backend conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Members {
    #[serde(rename = "self", default)]
    pub self_member: SelfState,
    #[serde(default)]
    pub others: Vec<RemoteMember>,
}

impl Members {
    /// Ids of the other participants that are still current members
    pub fn current_member_ids(&self) -> Vec<String> {
        self.others
            .iter()
            .filter(|other| other.status.is_current_member())
            .map(|other| other.id.clone())
            .collect()
    }
}

/// Conversation as served by the backend
///
/// Records carrying the local spellings (`team_id`, `accessModes`,
/// `accessRole`, flat `others`, `is_guest`) next to `members` keep them; they
/// take precedence over the wire spellings when canonicalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConversation {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub conversation_type: Option<ConversationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    pub members: Members,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Vec<AccessMode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_role: Option<AccessRole>,

    // Local spellings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(rename = "accessModes", default, skip_serializing_if = "Option::is_none")]
    pub access_modes: Option<Vec<AccessMode>>,
    #[serde(rename = "accessRole", default, skip_serializing_if = "Option::is_none")]
    pub local_access_role: Option<AccessRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_guest: Option<bool>,
}

/// Conversation as persisted by the client
///
/// Also the output of [`crate::ConversationMapper::merge_conversations`].
/// The wire spellings `team`, `access` and `access_role` are kept as
/// fallbacks for when the local key is missing or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub conversation_type: Option<ConversationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Ids of the other current participants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others: Option<Vec<String>>,
    #[serde(rename = "accessModes", default, skip_serializing_if = "Option::is_none")]
    pub access_modes: Option<Vec<AccessMode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Vec<AccessMode>>,
    #[serde(rename = "accessRole", default, skip_serializing_if = "Option::is_none")]
    pub access_role: Option<AccessRole>,
    #[serde(rename = "access_role", default, skip_serializing_if = "Option::is_none")]
    pub wire_access_role: Option<AccessRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_guest: Option<bool>,
    #[serde(flatten)]
    pub self_state: SelfState,
}

impl ConversationRecord {
    /// Record carrying nothing but an id
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// A conversation in either dialect
///
/// Deserialization picks the dialect by the presence of a non-null
/// `members` key, so errors inside a wire payload are reported instead of
/// falling through to the local dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConversationPayload {
    Backend(BackendConversation),
    Local(ConversationRecord),
}

impl<'de> Deserialize<'de> for ConversationPayload {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_dialect(value).map_err(de::Error::custom)
    }
}

impl ConversationPayload {
    /// Parse a JSON value in either dialect
    ///
    /// `null` and `{}` are rejected as [`ConversationError::InvalidInput`].
    pub fn from_value(value: Value) -> Result<Self> {
        let is_empty = match &value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            warn!("Rejecting empty conversation payload");
            return Err(ConversationError::InvalidInput(
                "Cannot create conversation entity without data".to_string(),
            ));
        }

        Ok(Self::from_dialect(value)?)
    }

    fn from_dialect(value: Value) -> serde_json::Result<Self> {
        let has_members = value.get("members").is_some_and(|members| !members.is_null());
        if has_members {
            Ok(ConversationPayload::Backend(serde_json::from_value(value)?))
        } else {
            Ok(ConversationPayload::Local(serde_json::from_value(value)?))
        }
    }

    /// Whether the payload carries no data at all
    pub fn is_empty(&self) -> bool {
        match self {
            ConversationPayload::Backend(conversation) => {
                *conversation == BackendConversation::default()
            }
            ConversationPayload::Local(record) => *record == ConversationRecord::default(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ConversationPayload::Backend(conversation) => &conversation.id,
            ConversationPayload::Local(record) => &record.id,
        }
    }

    /// Normalize either dialect into a [`CanonicalConversation`]
    ///
    /// Each pair of spellings resolves on its own: the local key wins unless
    /// it is missing or empty.
    pub fn canonicalize(&self) -> CanonicalConversation {
        match self {
            ConversationPayload::Backend(conversation) => CanonicalConversation {
                id: conversation.id.clone(),
                creator: conversation.creator.clone(),
                name: conversation.name.clone(),
                conversation_type: conversation.conversation_type,
                self_state: conversation.members.self_member.clone(),
                participating_user_ids: conversation.others.clone().unwrap_or_else(|| {
                    conversation
                        .members
                        .others
                        .iter()
                        .map(|other| other.id.clone())
                        .collect()
                }),
                team_id: first_non_empty(
                    conversation.team_id.as_deref(),
                    conversation.team.as_deref(),
                ),
                is_guest: conversation.is_guest.unwrap_or(false),
                access_modes: first_non_empty_modes(
                    conversation.access_modes.as_deref(),
                    conversation.access.as_deref(),
                ),
                access_role: conversation.local_access_role.or(conversation.access_role),
            },
            ConversationPayload::Local(record) => CanonicalConversation {
                id: record.id.clone(),
                creator: record.creator.clone(),
                name: record.name.clone(),
                conversation_type: record.conversation_type,
                self_state: record.self_state.clone(),
                participating_user_ids: record.others.clone().unwrap_or_default(),
                team_id: first_non_empty(record.team_id.as_deref(), record.team.as_deref()),
                is_guest: record.is_guest.unwrap_or(false),
                access_modes: first_non_empty_modes(
                    record.access_modes.as_deref(),
                    record.access.as_deref(),
                ),
                access_role: record.access_role.or(record.wire_access_role),
            },
        }
    }
}

impl From<BackendConversation> for ConversationPayload {
    fn from(conversation: BackendConversation) -> Self {
        ConversationPayload::Backend(conversation)
    }
}

impl From<ConversationRecord> for ConversationPayload {
    fn from(record: ConversationRecord) -> Self {
        ConversationPayload::Local(record)
    }
}

/// Dialect-free view of a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalConversation {
    pub id: String,
    pub creator: Option<String>,
    pub name: Option<String>,
    pub conversation_type: Option<ConversationType>,
    pub self_state: SelfState,
    pub participating_user_ids: Vec<String>,
    pub team_id: Option<String>,
    pub is_guest: bool,
    pub access_modes: Option<Vec<AccessMode>>,
    pub access_role: Option<AccessRole>,
}

/// Convert a legacy `otr_*_ref` date string into epoch milliseconds
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
/// Returns `None` for absent or unparseable input.
pub fn parse_legacy_ref(value: Option<&str>) -> Option<i64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Some(date_time.timestamp_millis());
    }

    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Some(midnight.and_utc().timestamp_millis());
    }

    warn!("Ignoring unparseable legacy timestamp reference: {}", raw);
    None
}

fn first_non_empty(primary: Option<&str>, fallback: Option<&str>) -> Option<String> {
    primary
        .filter(|v| !v.is_empty())
        .or(fallback.filter(|v| !v.is_empty()))
        .map(str::to_string)
}

fn first_non_empty_modes(
    primary: Option<&[AccessMode]>,
    fallback: Option<&[AccessMode]>,
) -> Option<Vec<AccessMode>> {
    primary
        .filter(|modes| !modes.is_empty())
        .or(fallback)
        .map(<[AccessMode]>::to_vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_ref_rfc3339() {
        assert_eq!(
            parse_legacy_ref(Some("1970-01-01T00:00:01.500Z")),
            Some(1500)
        );
        assert_eq!(
            parse_legacy_ref(Some("2017-02-03T12:00:00+01:00")),
            Some(1_486_119_600_000)
        );
    }

    #[test]
    fn test_parse_legacy_ref_date_only() {
        assert_eq!(parse_legacy_ref(Some("1970-01-02")), Some(86_400_000));
    }

    #[test]
    fn test_parse_legacy_ref_rejects_garbage() {
        assert_eq!(parse_legacy_ref(None), None);
        assert_eq!(parse_legacy_ref(Some("")), None);
        assert_eq!(parse_legacy_ref(Some("yesterday")), None);
    }

    #[test]
    fn test_first_non_empty_prefers_primary() {
        assert_eq!(first_non_empty(Some("t1"), Some("t2")), Some("t1".to_string()));
        assert_eq!(first_non_empty(Some(""), Some("t2")), Some("t2".to_string()));
        assert_eq!(first_non_empty(None, Some("t2")), Some("t2".to_string()));
        assert_eq!(first_non_empty(Some(""), Some("")), None);
        assert_eq!(first_non_empty(None, None), None);
    }

    #[test]
    fn test_first_non_empty_modes_skips_empty_primary() {
        let invite = [AccessMode::Invite];
        assert_eq!(
            first_non_empty_modes(Some(&[][..]), Some(&invite[..])),
            Some(vec![AccessMode::Invite])
        );
        assert_eq!(
            first_non_empty_modes(Some(&[AccessMode::Code][..]), Some(&invite[..])),
            Some(vec![AccessMode::Code])
        );
        assert_eq!(first_non_empty_modes(None, None), None);
    }
}
