//! User record helpers.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::{
    models::{NewUser, ProfileChanges, User},
    roles::Role,
};

/// Look up a user record by exact username.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_user_by_name(conn: &mut DbConnection, name: &str) -> QueryResult<Option<User>> {
    use crate::schema::users::dsl::{username, users};
    users
        .filter(username.eq(name))
        .first::<User>(conn)
        .await
        .optional()
}

/// Look up a user record by id.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_user(conn: &mut DbConnection, user_id: i32) -> QueryResult<Option<User>> {
    use crate::schema::users::dsl::users;
    users.find(user_id).first::<User>(conn).await.optional()
}

/// Report which of `name` and `mail` are already registered.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn find_taken(
    conn: &mut DbConnection,
    name: &str,
    mail: &str,
) -> QueryResult<(bool, bool)> {
    use crate::schema::users::dsl::{email, username, users};
    let rows: Vec<(String, String)> = users
        .filter(username.eq(name).or(email.eq(mail)))
        .select((username, email))
        .load(conn)
        .await?;
    let name_taken = rows.iter().any(|(u, _)| u == name);
    let mail_taken = rows.iter().any(|(_, e)| e == mail);
    Ok((name_taken, mail_taken))
}

/// Insert a new user record and return it.
///
/// # Errors
/// Returns any error produced by the insertion query, including unique
/// violations on username or email.
#[must_use = "handle the result"]
pub async fn create_user(conn: &mut DbConnection, user: &NewUser<'_>) -> QueryResult<User> {
    use crate::schema::users::dsl::users;
    diesel::insert_into(users)
        .values(user)
        .get_result::<User>(conn)
        .await
}

/// Stamp a successful login.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn record_login(
    conn: &mut DbConnection,
    user_id: i32,
    at: NaiveDateTime,
) -> QueryResult<User> {
    use crate::schema::users::dsl::{last_login_at, users};
    diesel::update(users.find(user_id))
        .set(last_login_at.eq(Some(at)))
        .get_result::<User>(conn)
        .await
}

/// Apply profile edits and bump `updated_at`.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn update_profile(
    conn: &mut DbConnection,
    user_id: i32,
    changes: &ProfileChanges<'_>,
    at: NaiveDateTime,
) -> QueryResult<User> {
    use crate::schema::users::dsl::{updated_at, users};
    diesel::update(users.find(user_id))
        .set((changes, updated_at.eq(at)))
        .get_result::<User>(conn)
        .await
}

/// Change a user's role by username. Returns the number of rows touched.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn set_user_role(conn: &mut DbConnection, name: &str, new_role: Role) -> QueryResult<usize> {
    use crate::schema::users::dsl::{role, username, users};
    diesel::update(users.filter(username.eq(name)))
        .set(role.eq(new_role.as_str()))
        .execute(conn)
        .await
}

/// Activate or deactivate an account.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn set_user_active(conn: &mut DbConnection, user_id: i32, active: bool) -> QueryResult<usize> {
    use crate::schema::users::dsl::{is_active, users};
    diesel::update(users.find(user_id))
        .set(is_active.eq(active))
        .execute(conn)
        .await
}

/// Add `delta` to a user's post counter, never going below zero.
pub(super) async fn bump_post_count(conn: &mut DbConnection, user_id: i32, delta: i32) -> QueryResult<usize> {
    use crate::schema::users::dsl::{post_count, users};
    if delta < 0 {
        diesel::update(users.find(user_id).filter(post_count.gt(0)))
            .set(post_count.eq(post_count + delta))
            .execute(conn)
            .await
    } else {
        diesel::update(users.find(user_id))
            .set(post_count.eq(post_count + delta))
            .execute(conn)
            .await
    }
}

/// Increment a user's thread counter.
pub(super) async fn bump_thread_count(conn: &mut DbConnection, user_id: i32) -> QueryResult<usize> {
    use crate::schema::users::dsl::{thread_count, users};
    diesel::update(users.find(user_id))
        .set(thread_count.eq(thread_count + 1))
        .execute(conn)
        .await
}
