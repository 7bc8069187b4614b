//! Persistent session store.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::SessionRecord;

/// Store a new session row.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn insert_session(conn: &mut DbConnection, record: &SessionRecord) -> QueryResult<usize> {
    use crate::schema::sessions::dsl::sessions;
    diesel::insert_into(sessions).values(record).execute(conn).await
}

/// Fetch a session that has not yet expired at `now`.
///
/// # Errors
/// Returns any error produced by the database.
#[must_use = "handle the result"]
pub async fn find_live_session(
    conn: &mut DbConnection,
    session_id: &str,
    now: NaiveDateTime,
) -> QueryResult<Option<SessionRecord>> {
    use crate::schema::sessions::dsl::{expire, sessions};
    sessions
        .find(session_id)
        .filter(expire.gt(now))
        .first::<SessionRecord>(conn)
        .await
        .optional()
}

/// Replace the cached payload of a session.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn refresh_payload(conn: &mut DbConnection, session_id: &str, body: &str) -> QueryResult<usize> {
    use crate::schema::sessions::dsl::{payload, sessions};
    diesel::update(sessions.find(session_id))
        .set(payload.eq(body))
        .execute(conn)
        .await
}

/// Remove a session. Missing sessions are not an error.
///
/// # Errors
/// Returns any error produced by the delete query.
#[must_use = "handle the result"]
pub async fn delete_session(conn: &mut DbConnection, session_id: &str) -> QueryResult<usize> {
    use crate::schema::sessions::dsl::sessions;
    diesel::delete(sessions.find(session_id)).execute(conn).await
}

/// Drop every session that expired at or before `now`.
///
/// # Errors
/// Returns any error produced by the delete query.
#[must_use = "handle the result"]
pub async fn purge_expired(conn: &mut DbConnection, now: NaiveDateTime) -> QueryResult<usize> {
    use crate::schema::sessions::dsl::{expire, sessions};
    diesel::delete(sessions.filter(expire.le(now))).execute(conn).await
}
