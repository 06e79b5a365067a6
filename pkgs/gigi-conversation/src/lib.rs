//! # Gigi Conversation
//!
//! Maps conversation records onto client-side conversation entities and
//! reconciles the locally persisted copy of a conversation list with the one
//! served by the backend.
//!
//! ## Architecture
//!
//! The crate is a thin, synchronous mapping layer with no I/O:
//!
//! - **records**: the two input dialects (backend wire payload and local
//!   database record) and the adapter that normalizes both
//! - **entity**: the [`Conversation`] entity with explicit setters that
//!   report what they changed
//! - **mapper**: construction, self state overlay, local/remote merge and
//!   access mapping
//! - **access**: the access state classifier and join link builder
//! - **config**: build flavour and web app URL used for join links
//!
//! ## Mapping Flow
//!
//! ```text
//! 1. Backend listing + local records
//!    ↓
//! 2. merge_conversations  (backend wins for descriptive fields,
//!    ↓                     newer-wins for archive/mute state)
//! 3. map_conversations    (one entity per record, fallback ordering
//!    ↓                     timestamps initial + index)
//! 4. update_self_status   (later pushes refresh membership in place)
//! ```
//!
//! ## Timestamps
//!
//! A timestamp of `0` is treated like an absent one everywhere except in
//! the strict newer-than comparisons of the merge step.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gigi_conversation::{ConversationMapper, DEFAULT_INITIAL_TIMESTAMP};
//! use serde_json::json;
//!
//! let mapper = ConversationMapper::new();
//! let conversations = mapper.map_json(
//!     &[json!({"id": "c1", "type": 0, "name": "Friends", "others": ["alice"]})],
//!     DEFAULT_INITIAL_TIMESTAMP,
//! )?;
//! assert_eq!(conversations[0].name(), "Friends");
//! # Ok::<(), gigi_conversation::ConversationError>(())
//! ```
//!
//! ## Thread Safety
//!
//! `ConversationMapper` only holds configuration and can be shared freely.
//! Entities are plain values; callers serialize concurrent updates of the
//! same conversation themselves.

pub mod access;
pub mod config;
pub mod entity;
pub mod error;
pub mod mapper;
pub mod records;
pub mod types;

pub use access::{classify_access_state, AccessContext};
pub use config::{ConfigError, MapperConfig};
pub use entity::{ChangedFields, Conversation, ConversationField, ConversationUpdate};
pub use error::{ConversationError, Result};
pub use mapper::{ConversationMapper, DEFAULT_INITIAL_TIMESTAMP};
pub use records::{
    BackendConversation, CanonicalConversation, ConversationPayload, ConversationRecord, Members,
    RemoteMember, SelfState,
};
pub use types::{
    AccessCode, AccessMode, AccessRole, AccessState, ConversationStatus, ConversationType,
    TimestampType, VerificationState,
};
