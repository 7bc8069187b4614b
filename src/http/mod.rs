//! JSON REST front end for the forum service.
//!
//! Every route lives under `/api`. Handlers are thin: they extract the
//! caller and the body, delegate to [`ForumService`], and let [`ApiError`]
//! shape failures.

mod auth;
pub mod error;
pub mod extract;
mod forum;
mod users;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

pub use self::error::ApiError;
use crate::{error::ForumError, forum::ForumService};

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Domain service backing every route.
    pub forum: ForumService,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
}

async fn no_route() -> ApiError { ApiError(ForumError::NotFound("route")) }

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/users/me", patch(users::update_me))
        .route("/api/users/{id}", get(users::get_user))
        .route(
            "/api/forum/categories",
            get(forum::list_categories).post(forum::create_category),
        )
        .route("/api/forum/categories/{id}", patch(forum::update_category))
        .route("/api/forum/categories/{id}/threads", get(forum::list_threads))
        .route("/api/forum/threads", post(forum::create_thread))
        .route(
            "/api/forum/threads/{id}",
            get(forum::get_thread).patch(forum::moderate_thread),
        )
        .route("/api/forum/threads/{id}/posts", get(forum::list_posts))
        .route("/api/forum/posts", post(forum::create_post))
        .route(
            "/api/forum/posts/{id}",
            get(forum::get_post)
                .patch(forum::edit_post)
                .delete(forum::delete_post),
        )
        .fallback(no_route)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
