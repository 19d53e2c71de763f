use storage::repository::{IndexQueueStore, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_queue_round_trips() {
    let repo = connect("memdb_queue_roundtrip").await;

    assert_eq!(repo.load_queue("pool").await.unwrap(), None);

    repo.save_queue("pool", &[4, 0, 2]).await.unwrap();
    assert_eq!(repo.load_queue("pool").await.unwrap(), Some(vec![4, 0, 2]));

    repo.save_queue("pool", &[2]).await.unwrap();
    assert_eq!(repo.load_queue("pool").await.unwrap(), Some(vec![2]));

    repo.save_queue("pool", &[]).await.unwrap();
    assert_eq!(repo.load_queue("pool").await.unwrap(), Some(Vec::new()));
}

#[tokio::test]
async fn sqlite_keys_are_independent_and_clearable() {
    let repo = connect("memdb_queue_keys").await;

    repo.save_queue("a", &[1]).await.unwrap();
    repo.save_queue("b", &[2, 3]).await.unwrap();
    repo.clear_queue("a").await.unwrap();

    assert_eq!(repo.load_queue("a").await.unwrap(), None);
    assert_eq!(repo.load_queue("b").await.unwrap(), Some(vec![2, 3]));
}

#[tokio::test]
async fn sqlite_unreadable_queue_is_a_serialization_error() {
    let repo = connect("memdb_queue_garbage").await;

    sqlx::query(
        "INSERT INTO pool_queues (key, indices, updated_at) VALUES ('pool', 'not json', '2024-01-01')",
    )
    .execute(repo.pool())
    .await
    .unwrap();

    let err = repo.load_queue("pool").await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));

    // Overwriting the bad value makes the slot readable again.
    repo.save_queue("pool", &[1]).await.unwrap();
    assert_eq!(repo.load_queue("pool").await.unwrap(), Some(vec![1]));
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = connect("memdb_queue_migrate_twice").await;
    repo.save_queue("pool", &[1, 2]).await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.load_queue("pool").await.unwrap(), Some(vec![1, 2]));
}
