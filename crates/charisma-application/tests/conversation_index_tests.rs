//! End-to-end behaviour of the conversation index.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use charisma_application::{ConversationIndex, ManualClock};
use charisma_core::config::EngineConfig;
use charisma_core::conversation::ConversationProjection;
use charisma_core::conversation::ConversationRepository;
use charisma_core::message::MessageRepository;
use charisma_core::party::Party;
use charisma_core::storage::KeyValueStore;
use charisma_infrastructure::{
    FileKeyValueStore, InMemoryKeyValueStore, KvConversationRepository, KvMessageRepository,
};
use tempfile::TempDir;

use common::{FlakyStore, open_index};

const MESSAGES_KEY: &str = "@charisma_messages";
const CONVERSATIONS_KEY: &str = "@charisma_conversations";

async fn memory_index() -> (InMemoryKeyValueStore, Arc<ManualClock>, ConversationIndex) {
    let store = InMemoryKeyValueStore::new();
    let clock = Arc::new(ManualClock::new(100));
    let index = open_index(Arc::new(store.clone()), clock.clone()).await;
    (store, clock, index)
}

#[tokio::test]
async fn test_example_scenario() {
    let (_store, clock, index) = memory_index().await;

    clock.set(100);
    index.append("A", "B", "hi").await.unwrap();
    let views = index.list_conversations("A").await;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].counterparty, "B");
    assert_eq!(views[0].unread_count, 0);
    assert_eq!(views[0].last_message.body, "hi");

    clock.set(200);
    index.append("B", "A", "hello").await.unwrap();
    let views = index.list_conversations("A").await;
    assert_eq!(views[0].last_message.body, "hello");
    assert_eq!(views[0].unread_count, 1);

    index.mark_conversation_read("A", "B").await.unwrap();
    let views = index.list_conversations("A").await;
    assert_eq!(views[0].unread_count, 0);
    let history = index.list_between("A", "B").await;
    let from_b = history.iter().find(|m| m.from_party == "B").unwrap();
    assert!(from_b.is_acknowledged);

    index.delete_between("A", "B").await.unwrap();
    assert!(index.list_conversations("A").await.is_empty());
    assert!(index.list_conversations("B").await.is_empty());
    assert!(index.verify_projection().await.unwrap());
}

#[tokio::test]
async fn test_projection_completeness() {
    let (_store, clock, index) = memory_index().await;
    for (i, to) in ["b", "c", "b", "d", "c"].iter().enumerate() {
        clock.advance(10);
        index.append("a", to, &format!("m{}", i)).await.unwrap();
    }
    index.append("e", "a", "incoming").await.unwrap();
    index.append("b", "c", "not about a").await.unwrap();

    let counterparties: HashSet<String> = index
        .list_conversations("a")
        .await
        .into_iter()
        .map(|v| v.counterparty)
        .collect();
    let expected: HashSet<String> = ["b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
    assert_eq!(counterparties, expected);
    assert_eq!(index.list_conversations("a").await.len(), 4);
}

#[tokio::test]
async fn test_ordering_with_ties() {
    let (_store, clock, index) = memory_index().await;
    clock.set(500);
    index.append("z", "self", "one").await.unwrap();
    index.append("m", "self", "two").await.unwrap();
    index.append("self", "a", "three").await.unwrap();
    clock.set(400);
    // Clamped to 500: the log never goes back in time.
    let late = index.append("q", "self", "four").await.unwrap();
    assert_eq!(late.created_at, 500);

    let order: Vec<String> = index
        .list_conversations("self")
        .await
        .into_iter()
        .map(|v| v.counterparty)
        .collect();
    assert_eq!(order, vec!["a", "m", "q", "z"]);
    assert_eq!(
        index.list_conversations("self").await,
        index.list_conversations("self").await
    );
}

#[tokio::test]
async fn test_history_order_and_same_timestamp_tiebreak() {
    let (_store, _clock, index) = memory_index().await;
    let first = index.append("a", "b", "first").await.unwrap();
    let second = index.append("b", "a", "second").await.unwrap();
    assert_eq!(first.created_at, second.created_at);

    let history = index.list_between("b", "a").await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, first.id);
    assert_eq!(history[1].id, second.id);

    let view = index.conversation("a", "b").await.unwrap();
    assert_eq!(view.last_message.id, second.id);
}

#[tokio::test]
async fn test_invalid_messages_are_rejected() {
    let (_store, _clock, index) = memory_index().await;

    let err = index.append("a", "a", "echo").await.unwrap_err();
    assert!(err.is_invalid_message());
    let err = index.append("a", "b", "   ").await.unwrap_err();
    assert!(err.is_invalid_message());

    assert!(index.list_between("a", "b").await.is_empty());
    assert!(index.list_conversations("a").await.is_empty());
}

#[tokio::test]
async fn test_mark_read_ignores_unknown_ids() {
    let (_store, _clock, index) = memory_index().await;
    let message = index.append("b", "a", "hey").await.unwrap();

    let ids: HashSet<String> = [message.id.clone(), "missing".to_string()].into_iter().collect();
    assert_eq!(index.mark_read(&ids).await.unwrap(), 1);
    assert_eq!(index.mark_read(&ids).await.unwrap(), 0);
    assert_eq!(index.total_unread("a").await, 0);

    let history = index.list_between("a", "b").await;
    assert!(history[0].is_acknowledged);
}

#[tokio::test]
async fn test_acknowledgement_is_monotonic() {
    let (_store, clock, index) = memory_index().await;
    let message = index.append("b", "a", "one").await.unwrap();
    index.mark_conversation_read("a", "b").await.unwrap();

    clock.advance(5);
    index.append("b", "a", "two").await.unwrap();
    index.append("a", "b", "three").await.unwrap();
    index.rebuild_projection().await.unwrap();

    let stored = index
        .list_between("a", "b")
        .await
        .into_iter()
        .find(|m| m.id == message.id)
        .unwrap();
    assert!(stored.is_acknowledged);
    assert_eq!(index.total_unread("a").await, 1);
}

#[tokio::test]
async fn test_open_conversation_drains_unread() {
    let (_store, _clock, index) = memory_index().await;
    index.append("b", "a", "one").await.unwrap();
    index.append("b", "a", "two").await.unwrap();
    index.append("c", "a", "three").await.unwrap();
    assert_eq!(index.total_unread("a").await, 3);

    let history = index.open_conversation("a", "b").await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|m| m.is_acknowledged));
    assert_eq!(index.total_unread("a").await, 1);
    assert_eq!(index.conversation("a", "b").await.unwrap().unread_count, 0);
}

#[tokio::test]
async fn test_resolve_self_is_idempotent_and_registered() {
    let (store, clock, index) = memory_index().await;
    let first = index.resolve_self().await.unwrap();
    let second = index.resolve_self().await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.handle, "user_0000001");

    let parties = index.list_known_parties().await.unwrap();
    assert_eq!(parties.len(), 1);
    assert!(parties[0].presence.online);

    drop(index);
    let reopened = open_index(Arc::new(store), clock).await;
    assert_eq!(reopened.resolve_self().await.unwrap().id, first.id);
}

#[tokio::test]
async fn test_send_and_update_profile() {
    let (_store, _clock, index) = memory_index().await;
    index
        .upsert_party(Party::new("friend", "Friend", "user_0000042"))
        .await
        .unwrap();

    let message = index.send("friend", "hello there").await.unwrap();
    let me = index.resolve_self().await.unwrap();
    assert_eq!(message.from_party, me.id);
    assert_eq!(index.list_conversations(&me.id).await.len(), 1);
    assert_eq!(index.total_unread("friend").await, 1);

    let profile = index.update_self_profile("Jane").await.unwrap();
    assert_eq!(profile.id, me.id);
    let entry = index.get_party(&me.id).await.unwrap().unwrap();
    assert_eq!(entry.display_name, "Jane");

    index.hide_party("friend").await.unwrap();
    assert!(index.hide_party("stranger").await.unwrap_err().is_not_found());
    let visible: Vec<String> = index
        .list_known_parties()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(visible, vec![me.id]);
}

#[tokio::test]
async fn test_resolve_self_fails_when_storage_is_unavailable() {
    let store = FlakyStore::new();
    store.fail_writes_to("@charisma_user_counter");
    let index = open_index(Arc::new(store.clone()), Arc::new(ManualClock::new(1))).await;

    let err = index.resolve_self().await.unwrap_err();
    assert!(err.is_storage_unavailable());
    assert!(store.inner.get("@charisma_profile").await.unwrap().is_none());

    store.heal();
    assert_eq!(index.resolve_self().await.unwrap().handle, "user_0000001");
}

#[tokio::test]
async fn test_failed_projection_write_rolls_back() {
    let store = FlakyStore::new();
    let clock = Arc::new(ManualClock::new(10));
    let index = open_index(Arc::new(store.clone()), clock.clone()).await;
    index.append("a", "b", "kept").await.unwrap();

    store.fail_writes_to(CONVERSATIONS_KEY);
    let err = index.append("b", "a", "lost").await.unwrap_err();
    assert!(err.is_storage_unavailable());

    assert_eq!(index.list_between("a", "b").await.len(), 1);
    assert_eq!(index.total_unread("a").await, 0);

    let reopened = open_index(Arc::new(store.inner.clone()), clock).await;
    let history = reopened.list_between("a", "b").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].body, "kept");
    assert!(reopened.verify_projection().await.unwrap());

    store.heal();
    index.append("b", "a", "retried").await.unwrap();
    assert_eq!(index.total_unread("a").await, 1);
}

#[tokio::test]
async fn test_failed_log_write_changes_nothing() {
    let store = FlakyStore::new();
    let index = open_index(Arc::new(store.clone()), Arc::new(ManualClock::new(10))).await;
    let message = index.append("b", "a", "unread").await.unwrap();

    store.fail_writes_to(MESSAGES_KEY);
    let ids: HashSet<String> = [message.id].into_iter().collect();
    assert!(index.mark_read(&ids).await.is_err());
    assert!(index.delete_between("a", "b").await.is_err());

    assert_eq!(index.total_unread("a").await, 1);
    assert_eq!(index.list_between("a", "b").await.len(), 1);
}

#[tokio::test]
async fn test_open_rebuilds_projection_behind_log() {
    let store = InMemoryKeyValueStore::new();
    let clock = Arc::new(ManualClock::new(10));
    let index = open_index(Arc::new(store.clone()), clock.clone()).await;
    index.append("b", "a", "one").await.unwrap();
    drop(index);

    // A log write that landed without its projection update.
    let messages = KvMessageRepository::new(Arc::new(store.clone()), MESSAGES_KEY);
    let mut log = messages.load_log().await.unwrap();
    log.append("c", "a", "two", 20).unwrap();
    messages.save_log(&log).await.unwrap();

    let reopened = open_index(Arc::new(store.clone()), clock).await;
    assert_eq!(reopened.list_conversations("a").await.len(), 2);
    assert_eq!(reopened.total_unread("a").await, 2);
    assert!(reopened.verify_projection().await.unwrap());
}

#[tokio::test]
async fn test_counterparty_is_registered_on_first_message() {
    let (_store, _clock, index) = memory_index().await;
    let me = index.resolve_self().await.unwrap();
    assert!(index.get_party("newcomer").await.unwrap().is_none());

    index.append("newcomer", &me.id, "hey").await.unwrap();

    let newcomer = index.get_party("newcomer").await.unwrap().unwrap();
    assert_eq!(newcomer.display_name, "newcomer");
    assert!(!newcomer.hidden);
    let own = index.get_party(&me.id).await.unwrap().unwrap();
    assert_eq!(own.display_name, me.display_name);

    index.hide_party("newcomer").await.unwrap();
    index.append("newcomer", &me.id, "still there?").await.unwrap();
    assert!(index.get_party("newcomer").await.unwrap().unwrap().hidden);
    assert_eq!(index.list_known_parties().await.unwrap().len(), 1);
}

/// Inflates every stored unread count without touching the revision.
async fn corrupt_unread_counts(store: &InMemoryKeyValueStore) {
    let conversations = KvConversationRepository::new(Arc::new(store.clone()), CONVERSATIONS_KEY);
    let mut snapshot = conversations
        .load_projection()
        .await
        .unwrap()
        .unwrap()
        .to_snapshot();
    for view in snapshot.views.iter_mut() {
        view.unread_count += 5;
    }
    conversations
        .save_projection(&ConversationProjection::from_snapshot(snapshot))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_open_repairs_corrupt_projection() {
    let store = InMemoryKeyValueStore::new();
    let clock = Arc::new(ManualClock::new(10));
    let index = open_index(Arc::new(store.clone()), clock.clone()).await;
    index.append("b", "a", "one").await.unwrap();
    drop(index);

    corrupt_unread_counts(&store).await;
    let repaired = open_index(Arc::new(store.clone()), clock.clone()).await;
    assert_eq!(repaired.total_unread("a").await, 1);
    assert!(repaired.verify_projection().await.unwrap());
    drop(repaired);

    corrupt_unread_counts(&store).await;
    let unchecked = ConversationIndex::open_with_clock(
        Arc::new(store.clone()),
        EngineConfig {
            verify_on_open: false,
            ..EngineConfig::default()
        },
        clock,
    )
    .await
    .unwrap();
    assert_eq!(unchecked.total_unread("a").await, 6);
    assert!(!unchecked.verify_projection().await.unwrap());

    unchecked.rebuild_projection().await.unwrap();
    assert_eq!(unchecked.total_unread("a").await, 1);
    assert!(unchecked.verify_projection().await.unwrap());
}

#[tokio::test]
async fn test_open_rebuilds_unreadable_projection() {
    for unreadable in ["[]", r#"{"version":"9.0.0","views":[]}"#] {
        let store = InMemoryKeyValueStore::new();
        let clock = Arc::new(ManualClock::new(10));
        let index = open_index(Arc::new(store.clone()), clock.clone()).await;
        index.append("b", "a", "one").await.unwrap();
        drop(index);

        store
            .set(CONVERSATIONS_KEY, unreadable.to_string())
            .await
            .unwrap();
        let reopened = open_index(Arc::new(store.clone()), clock).await;
        assert_eq!(reopened.total_unread("a").await, 1);
        assert!(reopened.verify_projection().await.unwrap());
    }
}

#[tokio::test]
async fn test_open_fails_when_projection_cannot_be_read() {
    let store = FlakyStore::new();
    let clock = Arc::new(ManualClock::new(10));
    let index = open_index(Arc::new(store.clone()), clock.clone()).await;
    index.append("b", "a", "one").await.unwrap();
    drop(index);

    store.fail_reads_from(CONVERSATIONS_KEY);
    let result =
        ConversationIndex::open_with_clock(Arc::new(store.clone()), EngineConfig::default(), clock)
            .await;
    assert!(result.err().unwrap().is_storage_unavailable());
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(1_000));

    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileKeyValueStore::open(temp_dir.path()).await.unwrap());
    let index = open_index(store, clock.clone()).await;
    let me = index.resolve_self().await.unwrap();
    index.append("friend", &me.id, "welcome").await.unwrap();
    drop(index);

    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileKeyValueStore::open(temp_dir.path()).await.unwrap());
    let reopened = open_index(store, clock).await;
    assert_eq!(reopened.resolve_self().await.unwrap().id, me.id);
    let views = reopened.list_conversations(&me.id).await;
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].unread_count, 1);
    assert!(reopened.verify_projection().await.unwrap());
}
