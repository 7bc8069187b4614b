//! Forum category helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::{Category, CategoryChanges, NewCategory};

/// Insert a new forum category and return it.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn create_category(conn: &mut DbConnection, cat: &NewCategory<'_>) -> QueryResult<Category> {
    use crate::schema::forum_categories::dsl::forum_categories;
    diesel::insert_into(forum_categories)
        .values(cat)
        .get_result::<Category>(conn)
        .await
}

/// Fetch a category by id, active or not.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn get_category(conn: &mut DbConnection, cat_id: i32) -> QueryResult<Option<Category>> {
    use crate::schema::forum_categories::dsl::forum_categories;
    forum_categories
        .find(cat_id)
        .first::<Category>(conn)
        .await
        .optional()
}

/// Active categories by ascending sort order, ties by creation order.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn list_active_categories(conn: &mut DbConnection) -> QueryResult<Vec<Category>> {
    use crate::schema::forum_categories::dsl::{forum_categories, id, is_active, sort_order};
    forum_categories
        .filter(is_active.eq(true))
        .order((sort_order.asc(), id.asc()))
        .load::<Category>(conn)
        .await
}

/// Apply administrative edits. Returns `None` when the category is absent.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn update_category(
    conn: &mut DbConnection,
    cat_id: i32,
    changes: &CategoryChanges<'_>,
) -> QueryResult<Option<Category>> {
    use crate::schema::forum_categories::dsl::forum_categories;
    diesel::update(forum_categories.find(cat_id))
        .set(changes)
        .get_result::<Category>(conn)
        .await
        .optional()
}

/// Add `delta` to a category's post counter, never going below zero.
pub(super) async fn bump_post_count(conn: &mut DbConnection, cat_id: i32, delta: i32) -> QueryResult<usize> {
    use crate::schema::forum_categories::dsl::{forum_categories, post_count};
    if delta < 0 {
        diesel::update(forum_categories.find(cat_id).filter(post_count.gt(0)))
            .set(post_count.eq(post_count + delta))
            .execute(conn)
            .await
    } else {
        diesel::update(forum_categories.find(cat_id))
            .set(post_count.eq(post_count + delta))
            .execute(conn)
            .await
    }
}

/// Increment a category's thread counter.
pub(super) async fn bump_thread_count(conn: &mut DbConnection, cat_id: i32) -> QueryResult<usize> {
    use crate::schema::forum_categories::dsl::{forum_categories, thread_count};
    diesel::update(forum_categories.find(cat_id))
        .set(thread_count.eq(thread_count + 1))
        .execute(conn)
        .await
}
