use gigi_conversation::{
    BackendConversation, ConversationMapper, ConversationPayload, ConversationRecord,
    MapperConfig, DEFAULT_INITIAL_TIMESTAMP,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let mapper = ConversationMapper::with_config(MapperConfig::from_env()?);

    // What the local database still has
    let local: Vec<ConversationRecord> = serde_json::from_value(json!([
        {
            "id": "team-room",
            "name": "Old name",
            "last_event_timestamp": 1_700_000_000_500i64,
            "last_server_timestamp": 1_700_000_000_000i64,
            "archived_state": false,
            "archived_timestamp": 1_600_000_000_000i64
        }
    ]))?;

    // What the backend just returned
    let remote: Vec<BackendConversation> = serde_json::from_value(json!([
        {
            "id": "team-room",
            "name": "Launch",
            "type": 0,
            "team": "team-1",
            "access": ["code", "invite"],
            "access_role": "non_activated",
            "members": {
                "self": {"status": 0, "otr_archived": true, "otr_archived_ref": "2023-11-20T10:00:00.000Z"},
                "others": [{"id": "alice", "status": 0}, {"id": "bob", "status": 1}]
            }
        },
        {
            "id": "dm",
            "type": 2,
            "members": {"self": {"status": 0}, "others": [{"id": "carol", "status": 0}]}
        }
    ]))?;

    let merged = mapper.merge_conversations(&local, &remote);
    println!("Merged records:\n{}", serde_json::to_string_pretty(&merged)?);

    let payloads: Vec<ConversationPayload> = merged.into_iter().map(Into::into).collect();
    let conversations = mapper.map_conversations(&payloads, DEFAULT_INITIAL_TIMESTAMP)?;

    println!("\nConversations:");
    for conversation in &conversations {
        println!(
            "  - {} '{}' access={:?} archived={} participants={:?}",
            conversation.id(),
            conversation.name(),
            conversation.access_state(),
            conversation.archived_state(),
            conversation.participating_user_ids()
        );
    }

    Ok(())
}
