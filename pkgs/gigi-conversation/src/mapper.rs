//! Conversation mapper - turns conversation records into entities
//!
//! Besides construction the mapper owns the two reconciliation paths:
//! overlaying self membership state onto an existing entity, and merging
//! locally persisted records with a fresh backend listing.

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::access::{build_join_link, classify_access_state, AccessContext};
use crate::config::MapperConfig;
use crate::entity::{ChangedFields, Conversation, ConversationUpdate};
use crate::error::{ConversationError, Result};
use crate::records::{
    BackendConversation, CanonicalConversation, ConversationPayload, ConversationRecord,
    SelfState,
};
use crate::types::{AccessCode, AccessMode, AccessRole, TimestampType};

/// Base of the fallback ordering timestamps handed out by
/// [`ConversationMapper::map_conversations`]
pub const DEFAULT_INITIAL_TIMESTAMP: i64 = 1;

/// Maps backend and local conversation records onto [`Conversation`] entities
#[derive(Debug, Clone, Default)]
pub struct ConversationMapper {
    config: MapperConfig,
}

impl ConversationMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Map a batch of records
    ///
    /// The record at `index` gets `initial_timestamp + index` as its fallback
    /// last event / last server timestamp, which keeps freshly mapped
    /// conversations in a stable order. The first invalid record aborts the
    /// whole batch. Fallback timestamps saturate at `i64::MAX`.
    pub fn map_conversations(
        &self,
        conversations: &[ConversationPayload],
        initial_timestamp: i64,
    ) -> Result<Vec<Conversation>> {
        debug!(
            "Mapping {} conversations from initial timestamp {}",
            conversations.len(),
            initial_timestamp
        );

        conversations
            .iter()
            .enumerate()
            .map(|(index, conversation)| {
                self.create_conversation(
                    Some(conversation),
                    Some(initial_timestamp.saturating_add(index as i64)),
                )
            })
            .collect()
    }

    /// Map a batch of raw JSON values in either dialect
    pub fn map_json(&self, conversations: &[Value], initial_timestamp: i64) -> Result<Vec<Conversation>> {
        conversations
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let payload = ConversationPayload::from_value(value.clone())?;
                self.create_conversation(
                    Some(&payload),
                    Some(initial_timestamp.saturating_add(index as i64)),
                )
            })
            .collect()
    }

    /// Build a single entity
    ///
    /// Fails with [`ConversationError::InvalidInput`] when `data` is absent or
    /// empty.
    pub fn create_conversation(
        &self,
        data: Option<&ConversationPayload>,
        initial_timestamp: Option<i64>,
    ) -> Result<Conversation> {
        let data = match data {
            Some(data) if !data.is_empty() => data,
            _ => {
                warn!("Refusing to create conversation entity without data");
                return Err(ConversationError::InvalidInput(
                    "Cannot create conversation entity without data".to_string(),
                ));
            }
        };

        let CanonicalConversation {
            id,
            creator,
            name,
            conversation_type,
            self_state,
            participating_user_ids,
            team_id,
            is_guest,
            access_modes,
            access_role,
        } = data.canonicalize();

        let mut conversation = Conversation::new(id);
        conversation.set_creator(creator);
        if let Some(conversation_type) = conversation_type {
            conversation.set_conversation_type(conversation_type);
        }
        conversation.set_name(name.unwrap_or_default());

        self.update_self_status(Some(&mut conversation), &self_state);

        if conversation.last_event_timestamp().is_none() {
            if let Some(timestamp) = initial_timestamp.filter(|t| *t != 0) {
                conversation.set_timestamp(Some(timestamp), TimestampType::LastEvent);
                conversation.set_timestamp(Some(timestamp), TimestampType::LastServer);
            }
        }

        conversation.set_participating_user_ids(participating_user_ids);
        conversation.set_team_id(team_id);

        if is_guest {
            conversation.set_is_guest(true);
        }

        match (access_modes, access_role) {
            (Some(modes), Some(role)) if !modes.is_empty() => {
                self.map_access_state(&mut conversation, &modes, role);
            }
            _ => {}
        }

        trace!("Created conversation entity {}", conversation.id());
        Ok(conversation)
    }

    /// Apply a partial update, never touching the id
    pub fn update_properties(
        &self,
        conversation: &mut Conversation,
        update: ConversationUpdate,
    ) -> ChangedFields {
        let before = conversation.clone();

        if let Some(creator) = update.creator {
            conversation.set_creator(Some(creator));
        }
        if let Some(name) = update.name {
            conversation.set_name(name);
        }
        if let Some(conversation_type) = update.conversation_type {
            conversation.set_conversation_type(conversation_type);
        }
        if let Some(user_ids) = update.participating_user_ids {
            conversation.set_participating_user_ids(user_ids);
        }
        if let Some(team_id) = update.team_id {
            conversation.set_team_id(Some(team_id));
        }
        if let Some(archived) = update.archived_state {
            conversation.set_archived_state(archived);
        }
        if let Some(muted) = update.muted_state {
            conversation.set_muted_state(muted);
        }
        if let Some(timer) = update.ephemeral_timer {
            conversation.set_ephemeral_timer(timer);
        }
        if let Some(status) = update.status {
            conversation.set_status(status);
        }
        if let Some(state) = update.verification_state {
            conversation.set_verification_state(state);
        }
        if let Some(is_guest) = update.is_guest {
            conversation.set_is_guest(is_guest);
        }
        if let Some(state) = update.access_state {
            conversation.set_access_state(state);
        }
        if let Some(code) = update.access_code {
            conversation.set_access_code(code);
        }

        conversation.changes_since(&before)
    }

    /// Overlay self membership state onto an entity
    ///
    /// Each field is applied independently and only when present. Legacy
    /// `otr_*` fields are applied last, so they win over the modern fields of
    /// the same call. Returns `None` when there is no entity to update.
    pub fn update_self_status(
        &self,
        conversation: Option<&mut Conversation>,
        self_state: &SelfState,
    ) -> Option<ChangedFields> {
        let conversation = conversation?;
        let before = conversation.clone();

        // Database states
        if is_set(self_state.archived_timestamp) {
            conversation.set_timestamp(self_state.archived_timestamp, TimestampType::Archived);
            if let Some(archived) = self_state.archived_state {
                conversation.set_archived_state(archived);
            }
        }

        conversation.set_timestamp(self_state.cleared_timestamp, TimestampType::Cleared);

        if let Some(timer) = self_state.ephemeral_timer {
            conversation.set_ephemeral_timer(timer);
        }

        conversation.set_timestamp(self_state.last_event_timestamp, TimestampType::LastEvent);
        conversation.set_timestamp(self_state.last_read_timestamp, TimestampType::LastRead);
        conversation.set_timestamp(self_state.last_server_timestamp, TimestampType::LastServer);

        if is_set(self_state.muted_timestamp) {
            conversation.set_timestamp(self_state.muted_timestamp, TimestampType::Muted);
            if let Some(muted) = self_state.muted_state {
                conversation.set_muted_state(muted);
            }
        }

        if let Some(status) = self_state.status {
            conversation.set_status(status);
        }

        if let Some(state) = self_state.verification_state {
            conversation.set_verification_state(state);
        }

        // Backend states
        if let Some(archived) = self_state.otr_archived {
            conversation.set_timestamp(self_state.otr_archived_timestamp(), TimestampType::Archived);
            conversation.set_archived_state(archived);
        }

        if let Some(muted) = self_state.otr_muted {
            conversation.set_timestamp(self_state.otr_muted_timestamp(), TimestampType::Muted);
            conversation.set_muted_state(muted);
        }

        Some(conversation.changes_since(&before))
    }

    /// Merge locally persisted records with the backend listing
    ///
    /// Produces one record per remote conversation; local-only conversations
    /// are not part of the result. Descriptive fields always come from the
    /// backend, archive and mute state only when the local record has no
    /// timestamp or the backend one is strictly newer.
    pub fn merge_conversations(
        &self,
        local: &[ConversationRecord],
        remote: &[BackendConversation],
    ) -> Vec<ConversationRecord> {
        debug!(
            "Merging {} local with {} remote conversations",
            local.len(),
            remote.len()
        );

        remote
            .iter()
            .enumerate()
            .map(|(index, remote_conversation)| {
                let mut record = local
                    .iter()
                    .find(|record| record.id == remote_conversation.id)
                    .cloned()
                    .unwrap_or_else(|| ConversationRecord::with_id(&remote_conversation.id));

                merge_record(&mut record, remote_conversation, index);
                record
            })
            .collect()
    }

    /// Classify and store the access state of an entity
    pub fn map_access_state(
        &self,
        conversation: &mut Conversation,
        access_modes: &[AccessMode],
        access_role: AccessRole,
    ) -> bool {
        let context = AccessContext::from_conversation(conversation);
        let state = classify_access_state(context, access_modes, access_role);
        trace!("Conversation {} access state: {:?}", conversation.id(), state);
        conversation.set_access_state(state)
    }

    /// Store the join link of a team conversation
    ///
    /// Internal builds link to the internal web app, everything else uses the
    /// URI served by the backend. Non-team conversations are left alone.
    pub fn map_access_code(&self, conversation: &mut Conversation, access_code: &AccessCode) -> bool {
        if !conversation.is_team_conversation() {
            return false;
        }

        if self.config.internal_build {
            let link = build_join_link(&self.config.webapp_internal_url, access_code);
            return conversation.set_access_code(link);
        }

        conversation.set_access_code(access_code.uri.clone())
    }
}

fn merge_record(record: &mut ConversationRecord, remote: &BackendConversation, index: usize) {
    let remote_self = &remote.members.self_member;

    record.access_modes = remote.access.clone();
    record.access = None;
    record.access_role = remote.access_role;
    record.wire_access_role = None;
    record.creator = remote.creator.clone();
    record.name = remote.name.clone();
    record.self_state.status = remote_self.status;
    record.team_id = remote.team.clone();
    record.team = None;
    record.conversation_type = remote.conversation_type;
    record.others = Some(remote.members.current_member_ids());

    let state = &mut record.self_state;

    // Keeps a deterministic order for records without real timestamps
    if !is_set(state.last_event_timestamp) {
        state.last_event_timestamp = Some(index as i64 + 1);
    }

    let last_event = state.last_event_timestamp;
    let wrong_server_timestamp = match (state.last_server_timestamp, last_event) {
        (Some(server), Some(event)) => server < event,
        _ => false,
    };
    if !is_set(state.last_server_timestamp) || wrong_server_timestamp {
        trace!(
            "Correcting last server timestamp of {} to {:?}",
            record.id,
            last_event
        );
        state.last_server_timestamp = last_event;
    }

    // Older records stored unreliable archive and mute timestamps
    let remote_archived = remote_self.otr_archived_timestamp();
    if adopt_remote(state.archived_timestamp, remote_archived) {
        state.archived_state = remote_self.otr_archived;
        state.archived_timestamp = remote_archived;
    }

    let remote_muted = remote_self.otr_muted_timestamp();
    if adopt_remote(state.muted_timestamp, remote_muted) {
        state.muted_state = remote_self.otr_muted;
        state.muted_timestamp = remote_muted;
    }
}

fn adopt_remote(local: Option<i64>, remote: Option<i64>) -> bool {
    match (local, remote) {
        (None, _) => true,
        (Some(local), Some(remote)) => remote > local,
        (Some(_), None) => false,
    }
}

fn is_set(timestamp: Option<i64>) -> bool {
    timestamp.is_some_and(|t| t != 0)
}
