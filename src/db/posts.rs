//! Forum post helpers.
//!
//! Posts are never removed. Deletion sets `is_deleted`, which hides the post
//! from thread listings while keeping it reachable by id.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::{
    categories,
    connection::{DbConnection, write_transaction},
    threads,
    users,
};
use crate::{
    error::ForumError,
    models::{NewPost, Post, Thread},
};

/// Insert a post and update every counter that tracks it.
///
/// In one transaction: the post row is inserted, the thread's post count
/// and last-post fields move, and the category and author post counts are
/// incremented. Locked threads accept posts only when `bypass_lock` is set.
///
/// # Errors
/// Returns [`ForumError::NotFound`] for a missing thread,
/// [`ForumError::Forbidden`] for a locked one, and [`ForumError::Database`]
/// for query failures.
#[must_use = "handle the result"]
pub async fn create_post(
    conn: &mut DbConnection,
    post: &NewPost<'_>,
    bypass_lock: bool,
) -> Result<Post, ForumError> {
    use crate::schema::forum_posts::dsl::forum_posts;

    write_transaction::<_, ForumError, _>(conn, |conn| {
        Box::pin(async move {
            let Some(thread): Option<Thread> = threads::get_thread(conn, post.thread_id).await? else {
                return Err(ForumError::NotFound("thread"));
            };
            if thread.is_locked && !bypass_lock {
                return Err(ForumError::Forbidden("thread is locked"));
            }

            let created = diesel::insert_into(forum_posts)
                .values(post)
                .get_result::<Post>(conn)
                .await?;
            threads::note_new_post(conn, thread.id, created.id, created.user_id, created.created_at)
                .await?;
            categories::bump_post_count(conn, thread.category_id, 1).await?;
            users::bump_post_count(conn, created.user_id, 1).await?;
            Ok(created)
        })
    })
    .await
}

/// Fetch a post by id, including soft-deleted posts.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn get_post(conn: &mut DbConnection, post_id: i32) -> QueryResult<Option<Post>> {
    use crate::schema::forum_posts::dsl::forum_posts;
    forum_posts.find(post_id).first::<Post>(conn).await.optional()
}

/// Visible posts of a thread in chronological order.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn list_posts_in_thread(conn: &mut DbConnection, thread: i32) -> QueryResult<Vec<Post>> {
    use crate::schema::forum_posts::dsl::{created_at, forum_posts, id, is_deleted, thread_id};
    forum_posts
        .filter(thread_id.eq(thread))
        .filter(is_deleted.eq(false))
        .order((created_at.asc(), id.asc()))
        .load::<Post>(conn)
        .await
}

/// Replace a post's content and record who edited it.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn edit_post(
    conn: &mut DbConnection,
    post_id: i32,
    body: &str,
    editor_id: i32,
    at: NaiveDateTime,
) -> QueryResult<Option<Post>> {
    use crate::schema::forum_posts::dsl::{
        content,
        edit_count,
        edited_at,
        edited_by_user_id,
        forum_posts,
        updated_at,
    };
    diesel::update(forum_posts.find(post_id))
        .set((
            content.eq(body),
            edit_count.eq(edit_count + 1),
            edited_at.eq(Some(at)),
            edited_by_user_id.eq(Some(editor_id)),
            updated_at.eq(at),
        ))
        .get_result::<Post>(conn)
        .await
        .optional()
}

/// Soft-delete a post and decrement the counters that included it.
///
/// The thread's last-post pointer moves to the newest post still visible.
/// Deleting an already deleted post changes nothing and returns it as is.
///
/// # Errors
/// Returns [`ForumError::NotFound`] for a missing post and
/// [`ForumError::Database`] for query failures.
#[must_use = "handle the result"]
pub async fn soft_delete_post(
    conn: &mut DbConnection,
    post_id: i32,
    at: NaiveDateTime,
) -> Result<Post, ForumError> {
    use crate::schema::forum_posts::dsl::{forum_posts, is_deleted, updated_at};

    write_transaction::<_, ForumError, _>(conn, |conn| {
        Box::pin(async move {
            let flipped = diesel::update(forum_posts.find(post_id).filter(is_deleted.eq(false)))
                .set((is_deleted.eq(true), updated_at.eq(at)))
                .get_result::<Post>(conn)
                .await
                .optional()?;
            let Some(post) = flipped else {
                return get_post(conn, post_id)
                    .await?
                    .ok_or(ForumError::NotFound("post"));
            };

            threads::drop_post(conn, post.thread_id).await?;
            threads::repoint_last_post(conn, post.thread_id).await?;
            if let Some(parent) = threads::get_thread(conn, post.thread_id).await? {
                categories::bump_post_count(conn, parent.category_id, -1).await?;
            }
            users::bump_post_count(conn, post.user_id, -1).await?;
            Ok(post)
        })
    })
    .await
}
