//! Public profiles and self-service profile edits.

use axum::{Json, extract::State};

use super::{
    AppState,
    error::ApiError,
    extract::{ApiJson, ApiPath, GatedJson, MaybeUser},
};
use crate::{authz::require_authenticated, forum::ProfileUpdate, models::SafeUser};

pub(super) async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i32>,
) -> Result<Json<SafeUser>, ApiError> {
    Ok(Json(state.forum.get_safe_user(user_id).await?))
}

pub(super) async fn update_me(
    State(state): State<AppState>,
    caller: MaybeUser,
    body: GatedJson<ProfileUpdate>,
) -> Result<Json<SafeUser>, ApiError> {
    require_authenticated(caller.identity())?;
    let ApiJson(input) = body?;
    Ok(Json(state.forum.update_profile(caller.identity(), input).await?))
}
