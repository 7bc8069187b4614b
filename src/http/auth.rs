//! Registration, login and session endpoints.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::{
    AppState,
    error::ApiError,
    extract::{ApiJson, MaybeUser, clear_session_cookie, session_cookie, session_id},
};
use crate::{
    forum::{Credentials, ForumService, Registration, SignedIn},
    models::SafeUser,
};

#[derive(Serialize)]
pub(super) struct UserBody {
    user: SafeUser,
}

#[derive(Serialize)]
struct SignedInBody {
    user: SafeUser,
    message: &'static str,
}

#[derive(Serialize)]
pub(super) struct MessageBody {
    pub(super) message: &'static str,
}

fn signed_in(
    state: &AppState,
    status: StatusCode,
    signed: SignedIn,
    message: &'static str,
) -> Response {
    let cookie = session_cookie(
        &signed.sid,
        state.forum.session_ttl().num_seconds(),
        state.secure_cookies,
    );
    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(SignedInBody {
            user: signed.user,
            message,
        }),
    )
        .into_response()
}

pub(super) async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<Registration>,
) -> Result<Response, ApiError> {
    let signed = state.forum.register(input).await?;
    Ok(signed_in(&state, StatusCode::CREATED, signed, "registration successful"))
}

pub(super) async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<Credentials>,
) -> Result<Response, ApiError> {
    let signed = state.forum.login(input).await?;
    Ok(signed_in(&state, StatusCode::OK, signed, "login successful"))
}

/// Drops the server-side session and clears the cookie. Succeeds without a
/// session too.
pub(super) async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(sid) = session_id(&headers) {
        state.forum.logout(&sid).await?;
    }
    Ok((
        [(header::SET_COOKIE, clear_session_cookie(state.secure_cookies))],
        Json(MessageBody {
            message: "logged out",
        }),
    ))
}

pub(super) async fn me(caller: MaybeUser) -> Result<Json<UserBody>, ApiError> {
    let user = ForumService::me(caller.identity())?;
    Ok(Json(UserBody { user }))
}
