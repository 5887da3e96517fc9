use std::sync::Arc;
use youth_compass::storage::{DurableStore, EphemeralStore, KeyValueStore};
use youth_compass::store::guest::{DEFAULT_TITLE, GuestConversationStore};
use youth_compass::types::ChatMessage;

fn memory_store() -> GuestConversationStore {
    GuestConversationStore::new(Arc::new(EphemeralStore::default()))
}

#[test]
fn ids_count_down_from_minus_one() {
    let store = memory_store();
    for expected in [-1, -2, -3] {
        let conversation = store.create(DEFAULT_TITLE).unwrap();
        assert_eq!(conversation.id, expected);
    }
}

#[test]
fn listing_is_most_recently_touched_first() {
    let store = memory_store();
    let first = store.create("first").unwrap();
    let second = store.create("second").unwrap();

    let listing = store.list();
    assert_eq!(listing[0].id, second.id);
    assert_eq!(listing[1].id, first.id);

    store
        .save_messages(first.id, &[ChatMessage::user("hello")])
        .unwrap();
    let listing = store.list();
    assert_eq!(listing[0].id, first.id);
}

#[test]
fn deleted_threads_leave_nothing_behind() {
    let store = memory_store();
    let kept = store.create("kept").unwrap();
    let doomed = store.create("doomed").unwrap();
    store
        .save_messages(doomed.id, &[ChatMessage::user("bye")])
        .unwrap();

    store.delete(doomed.id).unwrap();

    let listing = store.list();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].id, kept.id);
    assert!(store.history(doomed.id).is_empty());

    // An id freed by the delete may be reissued, but it starts with no
    // history left over from its previous life.
    let next = store.create("next").unwrap();
    assert!(next.id < kept.id);
    assert!(store.history(next.id).is_empty());
}

#[test]
fn placeholder_titles_take_the_opening_prompt() {
    let store = memory_store();
    let thread = store.create(DEFAULT_TITLE).unwrap();

    store
        .retitle_from_first_message(thread.id, "what rent support can I get in Seoul this year")
        .unwrap();
    let listing = store.list();
    assert!(listing[0].title.starts_with("what rent support can I get in"));
    assert!(listing[0].title.ends_with("..."));

    // A second exchange must not rename the thread again.
    store
        .retitle_from_first_message(thread.id, "different question")
        .unwrap();
    assert_eq!(store.list()[0].title, listing[0].title);
}

#[test]
fn named_threads_keep_their_title() {
    let store = memory_store();
    let thread = store.create("my housing notes").unwrap();
    store
        .retitle_from_first_message(thread.id, "something else entirely")
        .unwrap();
    assert_eq!(store.list()[0].title, "my housing notes");
}

#[test]
fn history_round_trips_through_durable_storage() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn KeyValueStore> = Arc::new(DurableStore::with_dir(dir.path().to_path_buf()));
    let store = GuestConversationStore::new(storage.clone());

    let thread = store.create(DEFAULT_TITLE).unwrap();
    let messages = vec![ChatMessage::user("persist me")];
    store.save_messages(thread.id, &messages).unwrap();

    // A second store over the same directory sees the same thread.
    let reopened = GuestConversationStore::new(storage);
    assert_eq!(reopened.list()[0].id, thread.id);
    assert_eq!(reopened.history(thread.id)[0].content, "persist me");
}
