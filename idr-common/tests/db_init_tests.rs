//! Unit tests for database initialization
//!
//! Covers automatic database creation, idempotent schema setup, and the
//! contacts table constraints.

use idr_common::db::init_database;

#[tokio::test]
async fn database_created_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("idr.db");
    assert!(!db_path.exists());

    let result = init_database(&db_path).await;
    assert!(
        result.is_ok(),
        "Database initialization failed: {:?}",
        result.err()
    );
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn initialization_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("idr.db");

    let pool1 = init_database(&db_path).await.unwrap();
    drop(pool1);

    let pool2 = init_database(&db_path).await;
    assert!(
        pool2.is_ok(),
        "Failed to open existing database: {:?}",
        pool2.err()
    );
}

#[tokio::test]
async fn contacts_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("idr.db")).await.unwrap();

    sqlx::query(
        "INSERT INTO contacts (email, phone_number, linked_id, link_precedence, created_at, updated_at) \
         VALUES ('a@x.com', '111', NULL, 'primary', 1000, 1000)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let (email, phone): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT email, phone_number FROM contacts WHERE id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();

    assert_eq!(email.as_deref(), Some("a@x.com"));
    assert_eq!(phone.as_deref(), Some("111"));
}

#[tokio::test]
async fn contact_without_any_channel_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("idr.db")).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO contacts (email, phone_number, linked_id, link_precedence, created_at, updated_at) \
         VALUES (NULL, NULL, NULL, 'primary', 1000, 1000)",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Expected CHECK constraint violation");
}

#[tokio::test]
async fn primary_with_link_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("idr.db")).await.unwrap();

    sqlx::query(
        "INSERT INTO contacts (email, phone_number, linked_id, link_precedence, created_at, updated_at) \
         VALUES ('a@x.com', NULL, NULL, 'primary', 1000, 1000)",
    )
    .execute(&pool)
    .await
    .unwrap();

    // A primary must not carry a link, and a secondary must carry one
    let primary_with_link = sqlx::query(
        "INSERT INTO contacts (email, phone_number, linked_id, link_precedence, created_at, updated_at) \
         VALUES ('b@x.com', NULL, 1, 'primary', 2000, 2000)",
    )
    .execute(&pool)
    .await;
    assert!(primary_with_link.is_err());

    let secondary_without_link = sqlx::query(
        "INSERT INTO contacts (email, phone_number, linked_id, link_precedence, created_at, updated_at) \
         VALUES ('c@x.com', NULL, NULL, 'secondary', 3000, 3000)",
    )
    .execute(&pool)
    .await;
    assert!(secondary_without_link.is_err());
}
