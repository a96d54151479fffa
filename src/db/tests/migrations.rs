use super::test_db;
use crate::config::DatabaseConfig;
use crate::db::*;
use tempfile::{NamedTempFile, TempDir};

#[tokio::test]
async fn test_migrations_create_schema() {
    let (db, _file) = test_db().await;

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(db.pool())
    .await
    .unwrap();

    assert_eq!(
        tables,
        vec!["favorites", "pooled", "posts", "schema_version", "tagged", "tags"]
    );

    db.close().await;
}

#[tokio::test]
async fn test_reopening_database_keeps_data_and_version() {
    let temp_file = NamedTempFile::new().unwrap();

    let db = Database::new(temp_file.path()).await.unwrap();
    db.persist_post(&super::sample_post(1)).await;
    db.close().await;

    let db = Database::new(temp_file.path()).await.unwrap();
    assert_eq!(db.count_posts().await.unwrap(), 1);

    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_version")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(versions, 1, "migration v1 must only be applied once");

    db.close().await;
}

#[tokio::test]
async fn test_connect_creates_missing_parent_directory() {
    let dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("nested").join("booru.db"),
        max_connections: 2,
    };

    let db = Database::connect(&config).await.unwrap();
    assert!(config.path.exists());
    db.close().await;
}

#[tokio::test]
async fn test_query_after_close_returns_error() {
    let (db, _file) = test_db().await;
    db.pool().close().await;

    let result = db.count_posts().await;
    assert!(result.is_err(), "expected error after close, got {:?}", result);
}
