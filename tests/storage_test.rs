use serde_json::json;
use share_harvester::storage::{ArtifactKind, ArtifactStore, JsonFileStore, MemoryStore};
use share_harvester::types::StoreConfig;
use uuid::Uuid;

#[tokio::test]
async fn rewriting_a_name_overwrites_instead_of_duplicating() {
    let store = MemoryStore::new();

    store
        .write(ArtifactKind::Conversation, "chat.json", &json!({"v": 1}))
        .await
        .unwrap();
    store
        .write(ArtifactKind::Conversation, "chat.json", &json!({"v": 2}))
        .await
        .unwrap();

    let names = store.list(ArtifactKind::Conversation).await.unwrap();
    assert_eq!(names, vec!["chat.json".to_string()]);

    let value = store
        .read(ArtifactKind::Conversation, "chat.json")
        .await
        .unwrap();
    assert_eq!(value["v"], 2);
}

#[tokio::test]
async fn kinds_are_listed_independently() {
    let store = MemoryStore::new();
    store
        .write(ArtifactKind::Conversation, "a.json", &json!({}))
        .await
        .unwrap();
    store
        .write(ArtifactKind::Insight, "b.json", &json!({}))
        .await
        .unwrap();

    assert_eq!(store.list(ArtifactKind::Conversation).await.unwrap(), vec!["a.json"]);
    assert_eq!(store.list(ArtifactKind::Insight).await.unwrap(), vec!["b.json"]);
}

#[tokio::test]
async fn file_store_round_trips_and_overwrites() {
    let base = std::env::temp_dir().join(format!("share-harvester-test-{}", Uuid::new_v4()));
    let config = StoreConfig {
        conversations_dir: base.join("valid_jsons").to_string_lossy().to_string(),
        insights_dir: base.join("insights_json").to_string_lossy().to_string(),
    };
    let store = JsonFileStore::new(config);
    store.ensure_directories().await.unwrap();

    store
        .write(ArtifactKind::Insight, "one.json", &json!({"main_topic": "first"}))
        .await
        .unwrap();
    store
        .write(ArtifactKind::Insight, "one.json", &json!({"main_topic": "second"}))
        .await
        .unwrap();

    let names = store.list(ArtifactKind::Insight).await.unwrap();
    assert_eq!(names, vec!["one.json".to_string()]);

    let value = store.read(ArtifactKind::Insight, "one.json").await.unwrap();
    assert_eq!(value["main_topic"], "second");

    // The other kind stays empty.
    assert!(store.list(ArtifactKind::Conversation).await.unwrap().is_empty());

    let _ = tokio::fs::remove_dir_all(&base).await;
}
