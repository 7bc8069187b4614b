//! Thread creation, listing and moderation.

use serde::Deserialize;
use tracing::info;

use super::{ForumService, Identity, now, validate};
use crate::{
    authz::{require_authenticated, require_role},
    db,
    error::{ForumError, ForumResult},
    models::{NewThread, Thread, ThreadFlags},
    roles::Role,
};

/// Body of a thread creation request.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ThreadInput {
    /// Category the thread is filed under.
    pub category_id: i32,
    /// Title, at most 255 characters.
    pub title: String,
    /// Opening message.
    pub content: String,
}

/// Moderator changes to a thread. Absent fields are left unchanged.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThreadModeration {
    /// Lock or unlock replies.
    pub is_locked: Option<bool>,
    /// Pin or unpin the thread.
    pub is_sticky: Option<bool>,
}

impl ForumService {
    /// Open a thread in an active category.
    ///
    /// The category's and the author's thread counters move in the same
    /// transaction as the insert.
    ///
    /// # Errors
    /// Returns [`ForumError::Unauthorized`] without a session,
    /// [`ForumError::InvalidInput`] for a blank or oversized title or blank
    /// content, and [`ForumError::NotFound`] for a missing or disabled
    /// category.
    pub async fn create_thread(
        &self,
        identity: Option<&Identity>,
        input: ThreadInput,
    ) -> ForumResult<Thread> {
        let who = require_authenticated(identity)?;
        let title = validate::title(&input.title)?;
        validate::required("content", &input.content)?;
        let created_at = now();
        let mut conn = self.conn().await?;
        let thread = db::create_thread(
            &mut conn,
            &NewThread {
                category_id: input.category_id,
                user_id: who.user_id,
                title,
                content: &input.content,
                is_locked: false,
                is_sticky: false,
                post_count: 0,
                view_count: 0,
                last_post_at: created_at,
                created_at,
                updated_at: created_at,
            },
        )
        .await?;
        info!(thread_id = thread.id, category_id = thread.category_id, "created thread");
        Ok(thread)
    }

    /// Threads of a category, pinned first, then most recent activity.
    ///
    /// # Errors
    /// Returns infrastructure errors from the pool or database.
    pub async fn list_threads(&self, category_id: i32) -> ForumResult<Vec<Thread>> {
        let mut conn = self.conn().await?;
        Ok(db::list_threads_in_category(&mut conn, category_id).await?)
    }

    /// Fetch a thread, counting the view.
    ///
    /// # Errors
    /// Returns [`ForumError::NotFound`] for unknown ids.
    pub async fn get_thread(&self, thread_id: i32) -> ForumResult<Thread> {
        let mut conn = self.conn().await?;
        db::record_view(&mut conn, thread_id)
            .await?
            .ok_or(ForumError::NotFound("thread"))
    }

    /// Lock or pin a thread. Moderators and administrators only.
    ///
    /// # Errors
    /// Returns [`ForumError::Unauthorized`] or [`ForumError::Forbidden`] for
    /// callers below moderator and [`ForumError::NotFound`] for unknown ids.
    pub async fn moderate_thread(
        &self,
        identity: Option<&Identity>,
        thread_id: i32,
        input: ThreadModeration,
    ) -> ForumResult<Thread> {
        let who = require_role(identity, Role::Moderator)?;
        let flags = ThreadFlags {
            is_locked: input.is_locked,
            is_sticky: input.is_sticky,
            updated_at: now(),
        };
        let mut conn = self.conn().await?;
        let thread = db::set_thread_flags(&mut conn, thread_id, &flags)
            .await?
            .ok_or(ForumError::NotFound("thread"))?;
        info!(
            thread_id,
            moderator = who.user_id,
            locked = thread.is_locked,
            sticky = thread.is_sticky,
            "moderated thread"
        );
        Ok(thread)
    }
}
