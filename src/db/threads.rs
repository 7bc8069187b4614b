//! Forum thread helpers.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::{
    categories,
    connection::{DbConnection, write_transaction},
    users,
};
use crate::{
    error::ForumError,
    models::{NewThread, Thread, ThreadFlags},
};

/// Insert a thread and bump the thread counters of its category and author.
///
/// Runs in one transaction. The category must exist and be active.
///
/// # Errors
/// Returns [`ForumError::NotFound`] for a missing or inactive category and
/// [`ForumError::Database`] for query failures.
#[must_use = "handle the result"]
pub async fn create_thread(conn: &mut DbConnection, thread: &NewThread<'_>) -> Result<Thread, ForumError> {
    use crate::schema::{forum_categories::dsl as c, forum_threads::dsl as t};

    write_transaction::<_, ForumError, _>(conn, |conn| {
        Box::pin(async move {
            let open = c::forum_categories
                .find(thread.category_id)
                .filter(c::is_active.eq(true))
                .select(c::id)
                .first::<i32>(conn)
                .await
                .optional()?;
            if open.is_none() {
                return Err(ForumError::NotFound("category"));
            }

            let created = diesel::insert_into(t::forum_threads)
                .values(thread)
                .get_result::<Thread>(conn)
                .await?;
            categories::bump_thread_count(conn, created.category_id).await?;
            users::bump_thread_count(conn, created.user_id).await?;
            Ok(created)
        })
    })
    .await
}

/// Fetch a thread by id.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn get_thread(conn: &mut DbConnection, thread_id: i32) -> QueryResult<Option<Thread>> {
    use crate::schema::forum_threads::dsl::forum_threads;
    forum_threads
        .find(thread_id)
        .first::<Thread>(conn)
        .await
        .optional()
}

/// Count one view and return the updated thread.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn record_view(conn: &mut DbConnection, thread_id: i32) -> QueryResult<Option<Thread>> {
    use crate::schema::forum_threads::dsl::{forum_threads, view_count};
    diesel::update(forum_threads.find(thread_id))
        .set(view_count.eq(view_count + 1))
        .get_result::<Thread>(conn)
        .await
        .optional()
}

/// Threads in a category: sticky first, then most recent activity.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn list_threads_in_category(conn: &mut DbConnection, cat_id: i32) -> QueryResult<Vec<Thread>> {
    use crate::schema::forum_threads::dsl::{category_id, forum_threads, id, is_sticky, last_post_at};
    forum_threads
        .filter(category_id.eq(cat_id))
        .order((is_sticky.desc(), last_post_at.desc(), id.desc()))
        .load::<Thread>(conn)
        .await
}

/// Update lock and pin flags. Returns `None` when the thread is absent.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn set_thread_flags(
    conn: &mut DbConnection,
    thread_id: i32,
    flags: &ThreadFlags,
) -> QueryResult<Option<Thread>> {
    use crate::schema::forum_threads::dsl::forum_threads;
    diesel::update(forum_threads.find(thread_id))
        .set(flags)
        .get_result::<Thread>(conn)
        .await
        .optional()
}

/// Record a new post against its thread.
///
/// `last_post_at` only moves forward.
pub(super) async fn note_new_post(
    conn: &mut DbConnection,
    thread_id: i32,
    post_id: i32,
    author_id: i32,
    at: NaiveDateTime,
) -> QueryResult<()> {
    use crate::schema::forum_threads::dsl::{
        forum_threads,
        last_post_at,
        last_post_id,
        last_post_user_id,
        post_count,
        updated_at,
    };
    diesel::update(forum_threads.find(thread_id))
        .set((
            post_count.eq(post_count + 1),
            last_post_id.eq(Some(post_id)),
            last_post_user_id.eq(Some(author_id)),
            updated_at.eq(at),
        ))
        .execute(conn)
        .await?;
    diesel::update(forum_threads.find(thread_id).filter(last_post_at.lt(at)))
        .set(last_post_at.eq(at))
        .execute(conn)
        .await?;
    Ok(())
}

/// Decrement a thread's post counter, never going below zero.
pub(super) async fn drop_post(conn: &mut DbConnection, thread_id: i32) -> QueryResult<usize> {
    use crate::schema::forum_threads::dsl::{forum_threads, post_count};
    diesel::update(forum_threads.find(thread_id).filter(post_count.gt(0)))
        .set(post_count.eq(post_count - 1))
        .execute(conn)
        .await
}

/// Point the thread's last-post fields at its newest visible post, or clear
/// them when none is left. `last_post_at` keeps recording activity and does
/// not move back.
pub(super) async fn repoint_last_post(conn: &mut DbConnection, thread_id: i32) -> QueryResult<usize> {
    use crate::schema::{forum_posts::dsl as p, forum_threads::dsl as t};
    let latest: Option<(i32, i32)> = p::forum_posts
        .filter(p::thread_id.eq(thread_id))
        .filter(p::is_deleted.eq(false))
        .order((p::created_at.desc(), p::id.desc()))
        .select((p::id, p::user_id))
        .first::<(i32, i32)>(conn)
        .await
        .optional()?;
    diesel::update(t::forum_threads.find(thread_id))
        .set((
            t::last_post_id.eq(latest.map(|(post_id, _)| post_id)),
            t::last_post_user_id.eq(latest.map(|(_, author_id)| author_id)),
        ))
        .execute(conn)
        .await
}
