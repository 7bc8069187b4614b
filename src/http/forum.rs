//! Category, thread and post endpoints.

use axum::{Json, extract::State, http::StatusCode};

use super::{
    AppState,
    auth::MessageBody,
    error::ApiError,
    extract::{ApiJson, ApiPath, GatedJson, MaybeUser},
};
use crate::{
    authz::{require_authenticated, require_role},
    forum::{
        CategoryInput,
        CategoryUpdate,
        PostEdit,
        PostInput,
        ThreadInput,
        ThreadModeration,
    },
    models::{Category, Post, Thread},
    roles::Role,
};

type Created<T> = (StatusCode, Json<T>);

pub(super) async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.forum.list_categories().await?))
}

pub(super) async fn create_category(
    State(state): State<AppState>,
    caller: MaybeUser,
    body: GatedJson<CategoryInput>,
) -> Result<Created<Category>, ApiError> {
    require_role(caller.identity(), Role::Admin)?;
    let ApiJson(input) = body?;
    let category = state.forum.create_category(caller.identity(), input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub(super) async fn update_category(
    State(state): State<AppState>,
    caller: MaybeUser,
    ApiPath(category_id): ApiPath<i32>,
    body: GatedJson<CategoryUpdate>,
) -> Result<Json<Category>, ApiError> {
    require_role(caller.identity(), Role::Admin)?;
    let ApiJson(input) = body?;
    Ok(Json(
        state
            .forum
            .update_category(caller.identity(), category_id, input)
            .await?,
    ))
}

pub(super) async fn list_threads(
    State(state): State<AppState>,
    ApiPath(category_id): ApiPath<i32>,
) -> Result<Json<Vec<Thread>>, ApiError> {
    Ok(Json(state.forum.list_threads(category_id).await?))
}

pub(super) async fn get_thread(
    State(state): State<AppState>,
    ApiPath(thread_id): ApiPath<i32>,
) -> Result<Json<Thread>, ApiError> {
    Ok(Json(state.forum.get_thread(thread_id).await?))
}

pub(super) async fn create_thread(
    State(state): State<AppState>,
    caller: MaybeUser,
    body: GatedJson<ThreadInput>,
) -> Result<Created<Thread>, ApiError> {
    require_authenticated(caller.identity())?;
    let ApiJson(input) = body?;
    let thread = state.forum.create_thread(caller.identity(), input).await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

pub(super) async fn moderate_thread(
    State(state): State<AppState>,
    caller: MaybeUser,
    ApiPath(thread_id): ApiPath<i32>,
    body: GatedJson<ThreadModeration>,
) -> Result<Json<Thread>, ApiError> {
    require_role(caller.identity(), Role::Moderator)?;
    let ApiJson(input) = body?;
    Ok(Json(
        state
            .forum
            .moderate_thread(caller.identity(), thread_id, input)
            .await?,
    ))
}

pub(super) async fn list_posts(
    State(state): State<AppState>,
    ApiPath(thread_id): ApiPath<i32>,
) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.forum.list_posts(thread_id).await?))
}

pub(super) async fn create_post(
    State(state): State<AppState>,
    caller: MaybeUser,
    body: GatedJson<PostInput>,
) -> Result<Created<Post>, ApiError> {
    require_authenticated(caller.identity())?;
    let ApiJson(input) = body?;
    let post = state.forum.create_post(caller.identity(), input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub(super) async fn get_post(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<Json<Post>, ApiError> {
    Ok(Json(state.forum.get_post(post_id).await?))
}

pub(super) async fn edit_post(
    State(state): State<AppState>,
    caller: MaybeUser,
    ApiPath(post_id): ApiPath<i32>,
    body: GatedJson<PostEdit>,
) -> Result<Json<Post>, ApiError> {
    require_authenticated(caller.identity())?;
    let ApiJson(input) = body?;
    Ok(Json(
        state
            .forum
            .edit_post(caller.identity(), post_id, input)
            .await?,
    ))
}

pub(super) async fn delete_post(
    State(state): State<AppState>,
    caller: MaybeUser,
    ApiPath(post_id): ApiPath<i32>,
) -> Result<Json<MessageBody>, ApiError> {
    state.forum.delete_post(caller.identity(), post_id).await?;
    Ok(Json(MessageBody {
        message: "post deleted",
    }))
}
