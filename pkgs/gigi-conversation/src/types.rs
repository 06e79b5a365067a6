//! Closed vocabularies shared by records, entities and the mapper

use serde::{Deserialize, Serialize};

/// Conversation type as sent by the backend (integer on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ConversationType {
    /// Group conversation (also used for team 1:1 conversations)
    #[default]
    Regular,
    /// The user's own conversation, used for multi-device sync
    SelfConversation,
    OneToOne,
    /// Pending connection request
    Connect,
    Other(i64),
}

impl From<i64> for ConversationType {
    fn from(value: i64) -> Self {
        match value {
            0 => ConversationType::Regular,
            1 => ConversationType::SelfConversation,
            2 => ConversationType::OneToOne,
            3 => ConversationType::Connect,
            other => ConversationType::Other(other),
        }
    }
}

impl From<ConversationType> for i64 {
    fn from(value: ConversationType) -> Self {
        match value {
            ConversationType::Regular => 0,
            ConversationType::SelfConversation => 1,
            ConversationType::OneToOne => 2,
            ConversationType::Connect => 3,
            ConversationType::Other(other) => other,
        }
    }
}

/// Membership status of a user within a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ConversationStatus {
    #[default]
    CurrentMember,
    PastMember,
    Other(i64),
}

impl ConversationStatus {
    pub fn is_current_member(&self) -> bool {
        matches!(self, ConversationStatus::CurrentMember)
    }
}

impl From<i64> for ConversationStatus {
    fn from(value: i64) -> Self {
        match value {
            0 => ConversationStatus::CurrentMember,
            1 => ConversationStatus::PastMember,
            other => ConversationStatus::Other(other),
        }
    }
}

impl From<ConversationStatus> for i64 {
    fn from(value: ConversationStatus) -> Self {
        match value {
            ConversationStatus::CurrentMember => 0,
            ConversationStatus::PastMember => 1,
            ConversationStatus::Other(other) => other,
        }
    }
}

/// Device verification state of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    #[default]
    Unverified,
    Verified,
    Degraded,
}

/// How participants may join a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    Code,
    Invite,
    Link,
    Private,
    #[serde(other)]
    Unknown,
}

/// Trust tier required to access a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRole {
    Activated,
    NonActivated,
    Private,
    Team,
    #[serde(other)]
    Unknown,
}

/// Coarse classification of who may join a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    /// Not classified yet
    #[default]
    Unknown,
    #[serde(rename = "team_one2one")]
    TeamOne2One,
    TeamOnly,
    GuestRoom,
    Legacy,
    #[serde(rename = "self")]
    SelfConversation,
    PersonalGroup,
    #[serde(rename = "personal_one2one")]
    PersonalOne2One,
}

impl AccessState {
    /// Whether the state belongs to the team family
    pub fn is_team(&self) -> bool {
        matches!(
            self,
            AccessState::TeamOne2One
                | AccessState::TeamOnly
                | AccessState::GuestRoom
                | AccessState::Legacy
        )
    }
}

/// Timestamp slots of a conversation entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampType {
    Archived,
    Cleared,
    LastEvent,
    LastRead,
    LastServer,
    Muted,
}

/// Join code of a conversation as served by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCode {
    pub key: String,
    pub code: String,
    pub uri: String,
}
