//! Authorization gates applied before forum operations.
//!
//! Identities reach these checks already rehydrated from storage, so the
//! role tested here is the user's current role, not a session-time snapshot.

use crate::{
    error::{ForumError, ForumResult},
    forum::Identity,
    roles::Role,
};

/// Require a signed-in caller.
///
/// # Errors
/// Returns [`ForumError::Unauthorized`] when `identity` is `None`.
pub const fn require_authenticated(identity: Option<&Identity>) -> ForumResult<&Identity> {
    match identity {
        Some(who) => Ok(who),
        None => Err(ForumError::Unauthorized),
    }
}

/// Require a signed-in caller whose role meets `required`.
///
/// # Errors
/// Returns [`ForumError::Unauthorized`] when `identity` is `None` and
/// [`ForumError::Forbidden`] when the caller's role is too low.
pub fn require_role(identity: Option<&Identity>, required: Role) -> ForumResult<&Identity> {
    let who = require_authenticated(identity)?;
    if who.role().satisfies(required) {
        Ok(who)
    } else {
        Err(ForumError::Forbidden(match required {
            Role::Admin => "administrator role required",
            Role::Moderator => "moderator role required",
            Role::Member => "membership required",
        }))
    }
}

/// Allow the owner of a resource, or anyone who may moderate.
///
/// # Errors
/// Returns [`ForumError::Unauthorized`] when `identity` is `None` and
/// [`ForumError::Forbidden`] when the caller neither owns the resource nor
/// moderates.
pub fn require_owner_or_moderator(identity: Option<&Identity>, owner_id: i32) -> ForumResult<&Identity> {
    let who = require_authenticated(identity)?;
    if who.user_id == owner_id || who.role().can_moderate() {
        Ok(who)
    } else {
        Err(ForumError::Forbidden("only the author or a moderator may do that"))
    }
}
