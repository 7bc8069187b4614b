use chrono::{Duration, NaiveDate, NaiveDateTime};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rstest::{fixture, rstest};

use super::*;
use crate::{
    error::ForumError,
    models::{CategoryChanges, NewCategory, NewPost, NewThread, NewUser, SessionRecord, ThreadFlags},
    roles::Role,
};

fn at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

fn new_user<'a>(name: &'a str, email: &'a str) -> NewUser<'a> {
    NewUser {
        username: name,
        email,
        password_hash: "hash",
        first_name: None,
        last_name: None,
        display_name: None,
        bio: None,
        role: Role::Member.as_str(),
        is_active: true,
        post_count: 0,
        thread_count: 0,
        created_at: at(0),
        updated_at: at(0),
    }
}

fn new_category(name: &str, sort_order: i32) -> NewCategory<'_> {
    NewCategory {
        name,
        description: None,
        sort_order,
        thread_count: 0,
        post_count: 0,
        is_active: true,
        created_at: at(0),
        updated_at: at(0),
    }
}

fn new_thread(category_id: i32, user_id: i32, title: &str, when: NaiveDateTime) -> NewThread<'_> {
    NewThread {
        category_id,
        user_id,
        title,
        content: "body",
        is_locked: false,
        is_sticky: false,
        post_count: 0,
        view_count: 0,
        last_post_at: when,
        created_at: when,
        updated_at: when,
    }
}

fn new_post(thread_id: i32, user_id: i32, when: NaiveDateTime) -> NewPost<'static> {
    NewPost {
        thread_id,
        user_id,
        content: "reply",
        is_deleted: false,
        edit_count: 0,
        created_at: when,
        updated_at: when,
    }
}

#[fixture]
async fn migrated_conn() -> DbConnection {
    let mut conn = establish_sqlite(":memory:")
        .await
        .expect("failed to create in-memory connection");
    apply_migrations(&mut conn, "")
        .await
        .expect("failed to apply migrations");
    conn
}

/// Seeds one user and one category, returning their ids.
async fn seed(conn: &mut DbConnection) -> (i32, i32) {
    let user = create_user(conn, &new_user("alice", "alice@example.com"))
        .await
        .expect("create user");
    let cat = create_category(conn, &new_category("General", 0))
        .await
        .expect("create category");
    (user.id, cat.id)
}

#[rstest]
#[tokio::test]
async fn create_and_get_user(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let created = create_user(&mut conn, &new_user("alice", "alice@example.com"))
        .await
        .expect("failed to create user");
    let fetched = get_user_by_name(&mut conn, "alice")
        .await
        .expect("lookup failed")
        .expect("user not found");
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.password_hash, "hash");
    assert_eq!(fetched.role(), Role::Member);
    assert!(get_user_by_name(&mut conn, "Alice").await.expect("lookup").is_none());
}

#[rstest]
#[tokio::test]
async fn duplicate_username_is_unique_violation(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    create_user(&mut conn, &new_user("alice", "a@example.com"))
        .await
        .expect("first insert");
    let err = create_user(&mut conn, &new_user("alice", "b@example.com"))
        .await
        .expect_err("second insert must fail");
    assert!(matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    ));
}

#[rstest]
#[tokio::test]
async fn find_taken_reports_each_column(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    create_user(&mut conn, &new_user("alice", "alice@example.com"))
        .await
        .expect("insert");
    assert_eq!(
        find_taken(&mut conn, "alice", "other@example.com").await.expect("query"),
        (true, false)
    );
    assert_eq!(
        find_taken(&mut conn, "bob", "alice@example.com").await.expect("query"),
        (false, true)
    );
    assert_eq!(
        find_taken(&mut conn, "bob", "bob@example.com").await.expect("query"),
        (false, false)
    );
}

#[rstest]
#[tokio::test]
async fn set_role_updates_named_user(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let user = create_user(&mut conn, &new_user("alice", "alice@example.com"))
        .await
        .expect("insert");
    let touched = set_user_role(&mut conn, "alice", Role::Admin).await.expect("update");
    assert_eq!(touched, 1);
    let fetched = get_user(&mut conn, user.id).await.expect("query").expect("row");
    assert_eq!(fetched.role(), Role::Admin);
    assert_eq!(set_user_role(&mut conn, "ghost", Role::Admin).await.expect("update"), 0);
}

#[rstest]
#[tokio::test]
async fn categories_list_active_by_sort_order(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let late = create_category(&mut conn, &new_category("Late", 5)).await.expect("insert");
    let first_tie = create_category(&mut conn, &new_category("Tie A", 1)).await.expect("insert");
    let second_tie = create_category(&mut conn, &new_category("Tie B", 1)).await.expect("insert");
    let hidden = create_category(&mut conn, &new_category("Hidden", 0)).await.expect("insert");
    update_category(
        &mut conn,
        hidden.id,
        &CategoryChanges {
            name: None,
            description: None,
            sort_order: None,
            is_active: Some(false),
            updated_at: at(1),
        },
    )
    .await
    .expect("update")
    .expect("category exists");

    let ids: Vec<i32> = list_active_categories(&mut conn)
        .await
        .expect("list")
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![first_tie.id, second_tie.id, late.id]);
}

#[rstest]
#[tokio::test]
async fn thread_creation_bumps_counters(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, cat_id) = seed(&mut conn).await;
    let thread = create_thread(&mut conn, &new_thread(cat_id, user_id, "Hello", at(1)))
        .await
        .expect("create thread");
    assert_eq!(thread.post_count, 0);
    assert_eq!(thread.view_count, 0);

    let cat = get_category(&mut conn, cat_id).await.expect("query").expect("row");
    assert_eq!(cat.thread_count, 1);
    let user = get_user(&mut conn, user_id).await.expect("query").expect("row");
    assert_eq!(user.thread_count, 1);
}

#[rstest]
#[tokio::test]
async fn thread_in_inactive_category_is_not_found(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, cat_id) = seed(&mut conn).await;
    update_category(
        &mut conn,
        cat_id,
        &CategoryChanges {
            name: None,
            description: None,
            sort_order: None,
            is_active: Some(false),
            updated_at: at(1),
        },
    )
    .await
    .expect("update");

    let err = create_thread(&mut conn, &new_thread(cat_id, user_id, "Hello", at(1)))
        .await
        .expect_err("inactive category");
    assert!(matches!(err, ForumError::NotFound("category")));
    let missing = create_thread(&mut conn, &new_thread(cat_id + 100, user_id, "Hello", at(1)))
        .await
        .expect_err("missing category");
    assert!(matches!(missing, ForumError::NotFound("category")));
}

#[rstest]
#[tokio::test]
async fn threads_list_sticky_first_then_recent(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, cat_id) = seed(&mut conn).await;
    let old = create_thread(&mut conn, &new_thread(cat_id, user_id, "Old", at(1)))
        .await
        .expect("insert");
    let new = create_thread(&mut conn, &new_thread(cat_id, user_id, "New", at(3)))
        .await
        .expect("insert");
    let pinned = create_thread(&mut conn, &new_thread(cat_id, user_id, "Pinned", at(0)))
        .await
        .expect("insert");
    set_thread_flags(
        &mut conn,
        pinned.id,
        &ThreadFlags {
            is_locked: None,
            is_sticky: Some(true),
            updated_at: at(4),
        },
    )
    .await
    .expect("update")
    .expect("thread exists");

    let ids: Vec<i32> = list_threads_in_category(&mut conn, cat_id)
        .await
        .expect("list")
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![pinned.id, new.id, old.id]);
}

#[rstest]
#[tokio::test]
async fn record_view_counts_each_call(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, cat_id) = seed(&mut conn).await;
    let thread = create_thread(&mut conn, &new_thread(cat_id, user_id, "Hello", at(1)))
        .await
        .expect("insert");
    record_view(&mut conn, thread.id).await.expect("view");
    let viewed = record_view(&mut conn, thread.id).await.expect("view").expect("row");
    assert_eq!(viewed.view_count, 2);
    assert!(record_view(&mut conn, thread.id + 1).await.expect("view").is_none());
}

#[rstest]
#[tokio::test]
async fn post_creation_updates_thread_category_and_author(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, cat_id) = seed(&mut conn).await;
    let thread = create_thread(&mut conn, &new_thread(cat_id, user_id, "Hello", at(1)))
        .await
        .expect("insert");

    let post = create_post(&mut conn, &new_post(thread.id, user_id, at(2)), false)
        .await
        .expect("create post");

    let thread = get_thread(&mut conn, thread.id).await.expect("query").expect("row");
    assert_eq!(thread.post_count, 1);
    assert_eq!(thread.last_post_at, at(2));
    assert_eq!(thread.last_post_id, Some(post.id));
    assert_eq!(thread.last_post_user_id, Some(user_id));
    let cat = get_category(&mut conn, cat_id).await.expect("query").expect("row");
    assert_eq!(cat.post_count, 1);
    let user = get_user(&mut conn, user_id).await.expect("query").expect("row");
    assert_eq!(user.post_count, 1);
}

#[rstest]
#[tokio::test]
async fn last_post_at_never_moves_backwards(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, cat_id) = seed(&mut conn).await;
    let thread = create_thread(&mut conn, &new_thread(cat_id, user_id, "Hello", at(5)))
        .await
        .expect("insert");
    create_post(&mut conn, &new_post(thread.id, user_id, at(3)), false)
        .await
        .expect("create post");
    let thread = get_thread(&mut conn, thread.id).await.expect("query").expect("row");
    assert_eq!(thread.last_post_at, at(5));
    assert_eq!(thread.post_count, 1);
}

#[rstest]
#[tokio::test]
async fn locked_thread_rejects_posts_without_bypass(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, cat_id) = seed(&mut conn).await;
    let thread = create_thread(&mut conn, &new_thread(cat_id, user_id, "Hello", at(1)))
        .await
        .expect("insert");
    set_thread_flags(
        &mut conn,
        thread.id,
        &ThreadFlags {
            is_locked: Some(true),
            is_sticky: None,
            updated_at: at(1),
        },
    )
    .await
    .expect("lock");

    let err = create_post(&mut conn, &new_post(thread.id, user_id, at(2)), false)
        .await
        .expect_err("locked");
    assert!(matches!(err, ForumError::Forbidden(_)));
    create_post(&mut conn, &new_post(thread.id, user_id, at(2)), true)
        .await
        .expect("moderator bypass");

    let missing = create_post(&mut conn, &new_post(thread.id + 1, user_id, at(2)), true)
        .await
        .expect_err("missing thread");
    assert!(matches!(missing, ForumError::NotFound("thread")));
}

#[rstest]
#[tokio::test]
async fn soft_deleted_post_hidden_but_retrievable(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, cat_id) = seed(&mut conn).await;
    let thread = create_thread(&mut conn, &new_thread(cat_id, user_id, "Hello", at(1)))
        .await
        .expect("insert");
    let kept = create_post(&mut conn, &new_post(thread.id, user_id, at(2)), false)
        .await
        .expect("post");
    let gone = create_post(&mut conn, &new_post(thread.id, user_id, at(3)), false)
        .await
        .expect("post");

    let deleted = soft_delete_post(&mut conn, gone.id, at(4)).await.expect("delete");
    assert!(deleted.is_deleted);
    let again = soft_delete_post(&mut conn, gone.id, at(5)).await.expect("idempotent");
    assert_eq!(again.updated_at, at(4));

    let listed: Vec<i32> = list_posts_in_thread(&mut conn, thread.id)
        .await
        .expect("list")
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, vec![kept.id]);
    let direct = get_post(&mut conn, gone.id).await.expect("query").expect("row");
    assert!(direct.is_deleted);

    let thread = get_thread(&mut conn, thread.id).await.expect("query").expect("row");
    assert_eq!(thread.post_count, 1);
    let cat = get_category(&mut conn, cat_id).await.expect("query").expect("row");
    assert_eq!(cat.post_count, 1);
    let user = get_user(&mut conn, user_id).await.expect("query").expect("row");
    assert_eq!(user.post_count, 1);

    let missing = soft_delete_post(&mut conn, gone.id + 100, at(5)).await.expect_err("missing");
    assert!(matches!(missing, ForumError::NotFound("post")));
}

#[rstest]
#[tokio::test]
async fn deleting_newest_post_moves_last_post_pointer(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (alice, cat_id) = seed(&mut conn).await;
    let bob = create_user(&mut conn, &new_user("bob", "bob@example.com"))
        .await
        .expect("create user")
        .id;
    let thread = create_thread(&mut conn, &new_thread(cat_id, alice, "Hello", at(1)))
        .await
        .expect("insert");
    let older = create_post(&mut conn, &new_post(thread.id, alice, at(2)), false)
        .await
        .expect("post");
    let newest = create_post(&mut conn, &new_post(thread.id, bob, at(3)), false)
        .await
        .expect("post");

    soft_delete_post(&mut conn, newest.id, at(4)).await.expect("delete");
    let after = get_thread(&mut conn, thread.id).await.expect("query").expect("row");
    assert_eq!(after.last_post_id, Some(older.id));
    assert_eq!(after.last_post_user_id, Some(alice));
    assert_eq!(after.last_post_at, at(3));

    soft_delete_post(&mut conn, older.id, at(5)).await.expect("delete");
    let emptied = get_thread(&mut conn, thread.id).await.expect("query").expect("row");
    assert_eq!(emptied.last_post_id, None);
    assert_eq!(emptied.last_post_user_id, None);
    assert_eq!(emptied.post_count, 0);
}

#[rstest]
#[tokio::test]
async fn rejected_post_leaves_no_trace(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, cat_id) = seed(&mut conn).await;
    let thread = create_thread(&mut conn, &new_thread(cat_id, user_id, "Hello", at(1)))
        .await
        .expect("insert");
    set_thread_flags(
        &mut conn,
        thread.id,
        &ThreadFlags {
            is_locked: Some(true),
            is_sticky: None,
            updated_at: at(1),
        },
    )
    .await
    .expect("lock");
    create_post(&mut conn, &new_post(thread.id, user_id, at(2)), false)
        .await
        .expect_err("locked");

    // The connection is usable again once the failed write rolled back.
    let fresh = create_post(&mut conn, &new_post(thread.id, user_id, at(3)), true)
        .await
        .expect("post after rollback");
    let listed = list_posts_in_thread(&mut conn, thread.id).await.expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed.first().map(|p| p.id), Some(fresh.id));
}

#[rstest]
#[tokio::test]
async fn edit_post_tracks_editor(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, cat_id) = seed(&mut conn).await;
    let thread = create_thread(&mut conn, &new_thread(cat_id, user_id, "Hello", at(1)))
        .await
        .expect("insert");
    let post = create_post(&mut conn, &new_post(thread.id, user_id, at(2)), false)
        .await
        .expect("post");
    let edited = edit_post(&mut conn, post.id, "fixed", user_id, at(3))
        .await
        .expect("edit")
        .expect("row");
    assert_eq!(edited.content, "fixed");
    assert_eq!(edited.edit_count, 1);
    assert_eq!(edited.edited_at, Some(at(3)));
    assert_eq!(edited.edited_by_user_id, Some(user_id));
}

#[rstest]
#[tokio::test]
async fn expired_sessions_are_invisible_and_purged(#[future] migrated_conn: DbConnection) {
    let mut conn = migrated_conn.await;
    let (user_id, _) = seed(&mut conn).await;
    for (sid, expire) in [("live", at(10)), ("stale", at(1))] {
        insert_session(
            &mut conn,
            &SessionRecord {
                sid: sid.to_owned(),
                user_id,
                payload: "{}".to_owned(),
                expire,
            },
        )
        .await
        .expect("insert session");
    }
    let now = at(1) + Duration::minutes(30);
    assert!(find_live_session(&mut conn, "live", now).await.expect("query").is_some());
    assert!(find_live_session(&mut conn, "stale", now).await.expect("query").is_none());

    assert_eq!(purge_expired(&mut conn, now).await.expect("purge"), 1);
    assert_eq!(delete_session(&mut conn, "live").await.expect("delete"), 1);
    assert_eq!(delete_session(&mut conn, "live").await.expect("delete"), 0);
}
