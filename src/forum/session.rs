//! Server-side sessions keyed by an opaque random id.

use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ForumService, Identity, SignedIn, now};
use crate::{
    db::{self, DbConnection},
    error::ForumResult,
    models::{SafeUser, SessionRecord},
};

const SID_LEN: usize = 48;

/// JSON stored in `sessions.payload`.
///
/// The user snapshot is a cache for diagnostics and is rewritten whenever the
/// session is resolved; authorization never reads it.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    user_id: i32,
    user: SafeUser,
}

fn new_sid() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(SID_LEN)
        .map(char::from)
        .collect()
}

impl ForumService {
    pub(super) async fn open_session(&self, conn: &mut DbConnection, user: SafeUser) -> ForumResult<SignedIn> {
        let issued_at = now();
        let purged = db::purge_expired(conn, issued_at).await?;
        if purged > 0 {
            debug!(purged, "removed expired sessions");
        }
        let payload = serde_json::to_string(&SessionPayload {
            user_id: user.id,
            user: user.clone(),
        })?;
        let record = SessionRecord {
            sid: new_sid(),
            user_id: user.id,
            payload,
            expire: issued_at + self.session_ttl,
        };
        db::insert_session(conn, &record).await?;
        Ok(SignedIn {
            sid: record.sid,
            user,
        })
    }

    /// Resolve a session id to the caller's current identity.
    ///
    /// Returns `None` for unknown or expired sessions and for sessions whose
    /// user has since been deleted or deactivated.
    ///
    /// # Errors
    /// Returns infrastructure errors from the pool or database.
    pub async fn identify(&self, sid: &str) -> ForumResult<Option<Identity>> {
        let mut conn = self.conn().await?;
        let Some(record) = db::find_live_session(&mut conn, sid, now()).await? else {
            return Ok(None);
        };
        let Some(row) = db::get_user(&mut conn, record.user_id).await? else {
            return Ok(None);
        };
        if !row.is_active {
            debug!(user_id = row.id, "session belongs to a deactivated account");
            return Ok(None);
        }
        let user = SafeUser::from(row);

        let cached: Option<SessionPayload> = serde_json::from_str(&record.payload).ok();
        if cached.is_none_or(|p| p.user != user) {
            let payload = serde_json::to_string(&SessionPayload {
                user_id: user.id,
                user: user.clone(),
            })?;
            db::refresh_payload(&mut conn, sid, &payload).await?;
        }

        Ok(Some(Identity {
            sid: record.sid,
            user_id: user.id,
            user,
        }))
    }

    /// Destroy a session. Unknown ids are ignored.
    ///
    /// # Errors
    /// Returns infrastructure errors from the pool or database.
    pub async fn logout(&self, sid: &str) -> ForumResult<()> {
        let mut conn = self.conn().await?;
        db::delete_session(&mut conn, sid).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sids_are_long_and_distinct() {
        let a = new_sid();
        let b = new_sid();
        assert_eq!(a.len(), SID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
