//! Request extractors: JSON bodies, path ids, and the session cookie.

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use cookie::{Cookie, SameSite, time::Duration as CookieDuration};

use super::{AppState, error::ApiError};
use crate::forum::Identity;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "forumd.sid";

/// JSON body whose rejections render as `{"message": ...}` with status 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// A JSON body whose rejection is held back so the handler can run its
/// access check first. Unauthorized callers learn nothing about the body
/// they sent.
pub type GatedJson<T> = Result<ApiJson<T>, ApiError>;

/// Path parameters whose rejections render as `{"message": ...}` with
/// status 400.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Pull the session id out of the `Cookie` headers, if any.
#[must_use]
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| Cookie::parse(pair.trim()).ok())
        .find(|c| c.name() == SESSION_COOKIE && !c.value().is_empty())
        .map(|c| c.value().to_owned())
}

/// `Set-Cookie` value that installs a session.
#[must_use]
pub fn session_cookie(sid: &str, max_age_secs: i64, secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, sid.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(CookieDuration::seconds(max_age_secs))
        .build()
        .to_string()
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build();
    cookie.make_removal();
    cookie.to_string()
}

/// The caller's identity when the request carries a live session.
///
/// Resolution always goes back to storage, so role changes and bans take
/// effect on the next request.
pub struct MaybeUser(pub Option<Identity>);

impl MaybeUser {
    /// Borrow the identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> { self.0.as_ref() }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(sid) = session_id(&parts.headers) else {
            return Ok(Self(None));
        };
        Ok(Self(state.forum.identify(&sid).await?))
    }
}
