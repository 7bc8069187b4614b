//! Replies within threads.

use serde::Deserialize;
use tracing::info;

use super::{ForumService, Identity, now, validate};
use crate::{
    authz::{require_authenticated, require_owner_or_moderator},
    db,
    error::{ForumError, ForumResult},
    models::{NewPost, Post},
};

/// Body of a reply.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    /// Thread being replied to.
    pub thread_id: i32,
    /// Reply text.
    pub content: String,
}

/// Body of a post edit.
#[derive(Deserialize, Debug, Clone)]
pub struct PostEdit {
    /// Replacement text.
    pub content: String,
}

impl ForumService {
    /// Reply to a thread.
    ///
    /// The insert and the thread, category and author counters commit
    /// together. Locked threads only accept replies from moderators.
    ///
    /// # Errors
    /// Returns [`ForumError::Unauthorized`] without a session,
    /// [`ForumError::InvalidInput`] for blank content,
    /// [`ForumError::NotFound`] for a missing thread, and
    /// [`ForumError::Forbidden`] for a locked one.
    pub async fn create_post(&self, identity: Option<&Identity>, input: PostInput) -> ForumResult<Post> {
        let who = require_authenticated(identity)?;
        validate::required("content", &input.content)?;
        let created_at = now();
        let mut conn = self.conn().await?;
        let post = db::create_post(
            &mut conn,
            &NewPost {
                thread_id: input.thread_id,
                user_id: who.user_id,
                content: &input.content,
                is_deleted: false,
                edit_count: 0,
                created_at,
                updated_at: created_at,
            },
            who.role().can_moderate(),
        )
        .await?;
        info!(post_id = post.id, thread_id = post.thread_id, "created post");
        Ok(post)
    }

    /// Visible replies of a thread, oldest first.
    ///
    /// # Errors
    /// Returns infrastructure errors from the pool or database.
    pub async fn list_posts(&self, thread_id: i32) -> ForumResult<Vec<Post>> {
        let mut conn = self.conn().await?;
        Ok(db::list_posts_in_thread(&mut conn, thread_id).await?)
    }

    /// Fetch a post by id, including deleted posts.
    ///
    /// # Errors
    /// Returns [`ForumError::NotFound`] for unknown ids.
    pub async fn get_post(&self, post_id: i32) -> ForumResult<Post> {
        let mut conn = self.conn().await?;
        db::get_post(&mut conn, post_id)
            .await?
            .ok_or(ForumError::NotFound("post"))
    }

    /// Replace the text of a post. Authors and moderators only.
    ///
    /// # Errors
    /// Returns [`ForumError::Unauthorized`] without a session,
    /// [`ForumError::InvalidInput`] for blank content,
    /// [`ForumError::NotFound`] for unknown or deleted posts, and
    /// [`ForumError::Forbidden`] for other users' posts.
    pub async fn edit_post(
        &self,
        identity: Option<&Identity>,
        post_id: i32,
        input: PostEdit,
    ) -> ForumResult<Post> {
        require_authenticated(identity)?;
        validate::required("content", &input.content)?;
        let mut conn = self.conn().await?;
        let existing = db::get_post(&mut conn, post_id)
            .await?
            .filter(|p| !p.is_deleted)
            .ok_or(ForumError::NotFound("post"))?;
        let who = require_owner_or_moderator(identity, existing.user_id)?;
        let post = db::edit_post(&mut conn, post_id, &input.content, who.user_id, now())
            .await?
            .ok_or(ForumError::NotFound("post"))?;
        info!(post_id, editor = who.user_id, edits = post.edit_count, "edited post");
        Ok(post)
    }

    /// Soft-delete a post. Authors and moderators only.
    ///
    /// # Errors
    /// Returns [`ForumError::Unauthorized`] without a session,
    /// [`ForumError::NotFound`] for unknown posts, and
    /// [`ForumError::Forbidden`] for other users' posts.
    pub async fn delete_post(&self, identity: Option<&Identity>, post_id: i32) -> ForumResult<Post> {
        require_authenticated(identity)?;
        let mut conn = self.conn().await?;
        let existing = db::get_post(&mut conn, post_id)
            .await?
            .ok_or(ForumError::NotFound("post"))?;
        let who = require_owner_or_moderator(identity, existing.user_id)?;
        if existing.is_deleted {
            return Ok(existing);
        }
        let post = db::soft_delete_post(&mut conn, post_id, now()).await?;
        info!(post_id, actor = who.user_id, "deleted post");
        Ok(post)
    }
}
