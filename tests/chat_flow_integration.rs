//! Chat controller driven over a real relay and a real history file

mod common;

use common::{create_temp_store, spawn_relay, ScriptedRelay};
use ollachat::chat::{ChatController, SaveStatus, SessionPhase, TurnOutcome};
use ollachat::config::{ClientConfig, FailurePolicy};
use ollachat::error::{OllachatError, RelayError};
use ollachat::providers::HttpRelayClient;
use ollachat::storage::{HistoryStore, Role};
use std::sync::Arc;

fn reply(text: &str) -> Result<String, RelayError> {
    Ok(text.to_string())
}

#[tokio::test]
async fn test_conversation_survives_restart() {
    let (store, _dir) = create_temp_store();
    let path = store.path().to_path_buf();
    let relay = Arc::new(ScriptedRelay::new(vec![reply("hello"), reply("sure")]));

    let mut chat =
        ChatController::open(relay.clone(), store, "llama3", FailurePolicy::Record).unwrap();
    chat.send("hi").await;
    chat.send("tell me more").await;
    let id = chat.session().conversation_id().unwrap().to_string();
    drop(chat);

    let reopened = ChatController::open(
        relay,
        HistoryStore::new_with_path(&path).unwrap(),
        "llama3",
        FailurePolicy::Record,
    )
    .unwrap();

    assert_eq!(reopened.history().len(), 1);
    let stored = reopened.history().get(0).unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.title, "hi");
    assert_eq!(stored.messages.len(), 4);
    assert_eq!(stored.messages[3].content, "sure");
    assert_eq!(reopened.session().phase(), SessionPhase::Empty);
}

#[tokio::test]
async fn test_newest_conversation_first_after_restart() {
    let (store, _dir) = create_temp_store();
    let path = store.path().to_path_buf();
    let relay = Arc::new(ScriptedRelay::new(vec![reply("a"), reply("b")]));

    let mut chat =
        ChatController::open(relay.clone(), store, "llama3", FailurePolicy::Record).unwrap();
    chat.send("first").await;
    chat.new_chat();
    chat.send("second").await;
    drop(chat);

    let history = HistoryStore::new_with_path(&path).unwrap().load().unwrap();
    let titles: Vec<_> = history.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["second", "first"]);
}

#[tokio::test]
async fn test_load_then_continue_updates_same_record() {
    let (store, _dir) = create_temp_store();
    let relay = Arc::new(ScriptedRelay::new(vec![
        reply("one"),
        reply("two"),
        reply("three"),
    ]));

    let mut chat =
        ChatController::open(relay.clone(), store, "mistral", FailurePolicy::Record).unwrap();
    chat.send("older").await;
    chat.new_chat();
    chat.send("newer").await;

    chat.load(1).unwrap();
    let outcome = chat.send("again").await;

    let older_id = chat.history().get(1).unwrap().id.clone();
    assert_eq!(
        outcome,
        TurnOutcome::Replied {
            reply: "three".to_string(),
            save: SaveStatus::Updated(older_id)
        }
    );
    assert_eq!(chat.history().len(), 2);
    assert_eq!(chat.history().get(1).unwrap().messages.len(), 4);
    assert_eq!(chat.history().get(0).unwrap().messages.len(), 2);
    assert_eq!(relay.calls().last().unwrap().1, "mistral");
}

#[tokio::test]
async fn test_deleting_active_conversation_resets_session() {
    let (store, _dir) = create_temp_store();
    let relay = Arc::new(ScriptedRelay::new(vec![reply("a"), reply("b")]));

    let mut chat = ChatController::open(relay, store, "llama3", FailurePolicy::Record).unwrap();
    chat.send("first").await;
    chat.new_chat();
    chat.send("second").await;

    let other = chat.delete(1).unwrap();
    assert!(!other.cleared_active);
    assert_eq!(chat.session().messages().len(), 2);

    let active = chat.delete(0).unwrap();
    assert!(active.cleared_active);
    assert!(chat.session().is_empty());
    assert!(chat.history().is_empty());
    assert!(chat.store().load().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_turn_is_kept_until_next_successful_save() {
    let (store, _dir) = create_temp_store();
    let relay = Arc::new(ScriptedRelay::new(vec![
        Err(RelayError::Timeout(60)),
        reply("finally"),
    ]));

    let mut chat = ChatController::open(relay, store, "llama3", FailurePolicy::Record).unwrap();

    let failed = chat.send("hi").await;
    assert!(matches!(failed, TurnOutcome::Failed { recorded: true, .. }));
    assert!(chat.store().load().unwrap().is_empty());

    chat.send("retry").await;

    let stored = chat.store().load().unwrap();
    let messages = &stored.get(0).unwrap().messages;
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Request timed out. Please try again.");
}

#[tokio::test]
async fn test_chat_through_running_relay() {
    let backend = Arc::new(ScriptedRelay::new(vec![reply("hello")]));
    let api_url = spawn_relay(backend.clone(), "llama3").await;
    let client = HttpRelayClient::new(&ClientConfig {
        api_url,
        ..Default::default()
    })
    .unwrap();

    let (store, _dir) = create_temp_store();
    let mut chat =
        ChatController::open(Arc::new(client), store, "phi", FailurePolicy::Discard).unwrap();

    let outcome = chat.send("hi").await;

    assert!(matches!(outcome, TurnOutcome::Replied { ref reply, .. } if reply == "hello"));
    assert_eq!(backend.calls(), vec![("hi".to_string(), "phi".to_string())]);
    assert_eq!(chat.store().load().unwrap().get(0).unwrap().model, "phi");
}

#[test]
fn test_open_reports_corrupt_history() {
    let (store, _dir) = create_temp_store();
    std::fs::write(store.path(), "[{\"id\": 1").unwrap();

    let err = ChatController::open(
        Arc::new(ScriptedRelay::default()),
        store,
        "llama3",
        FailurePolicy::Record,
    )
    .err()
    .unwrap();

    assert!(matches!(
        err.downcast_ref::<OllachatError>(),
        Some(OllachatError::CorruptHistory { .. })
    ));
}
