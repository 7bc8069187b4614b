#![cfg(feature = "sqlite")]
//! Embedded migration checks against a fresh SQLite database.

use diesel_async::RunQueryDsl;
use forumd::db;
use rstest::rstest;

async fn migrated() -> db::DbConnection {
    let mut conn = db::establish_sqlite(":memory:").await.expect("connect");
    db::apply_migrations(&mut conn, ":memory:")
        .await
        .expect("migrate");
    conn
}

#[rstest]
#[case("users")]
#[case("forum_categories")]
#[case("forum_threads")]
#[case("forum_posts")]
#[case("sessions")]
#[tokio::test]
async fn sqlite_migrations_create_table(#[case] table: &str) {
    let mut conn = migrated().await;
    diesel::sql_query(format!("SELECT * FROM {table}"))
        .execute(&mut conn)
        .await
        .expect("table exists");
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let mut conn = migrated().await;
    db::apply_migrations(&mut conn, ":memory:")
        .await
        .expect("second run is a no-op");
}

#[tokio::test]
async fn sqlite_enforces_foreign_keys() {
    let mut conn = migrated().await;
    let orphan = diesel::sql_query(
        "INSERT INTO forum_posts (thread_id, user_id, content, is_deleted, edit_count, \
         created_at, updated_at) VALUES (42, 42, 'x', 0, 0, '2025-01-01 00:00:00', \
         '2025-01-01 00:00:00')",
    )
    .execute(&mut conn)
    .await;
    assert!(orphan.is_err());
}
