//! Shared helpers for router-level integration tests.
//!
//! Each [`TestApp`] owns a fresh `SQLite` file in a temporary directory, so
//! pooled connections all see the same database.

use argon2::{Algorithm, Argon2, Params, Version};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use forumd::{
    db,
    forum::ForumService,
    http::{AppState, router},
    roles::Role,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BODY_LIMIT: usize = 1024 * 1024;

/// Status, session cookie and parsed JSON body of a response.
pub struct TestResponse {
    pub status: StatusCode,
    /// `name=value` pair from `Set-Cookie`, ready to send back.
    pub cookie: Option<String>,
    pub set_cookie: Option<String>,
    pub body: Value,
}

pub struct TestApp {
    app: Router,
    state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = dir
            .path()
            .join("forum.db")
            .to_str()
            .expect("utf-8 path")
            .to_owned();
        let pool = db::establish_pool(&url, 8).await.expect("pool");
        {
            let mut conn = pool.get().await.expect("conn");
            db::apply_migrations(&mut conn, &url).await.expect("migrate");
        }
        let params = Params::new(1024, 1, 1, None).expect("params");
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let state = AppState {
            forum: ForumService::new(pool, argon2, Duration::hours(1)),
            secure_cookies: false,
        };
        Self {
            app: router(state.clone()),
            state,
            _dir: dir,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("infallible");
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let cookie = set_cookie
            .as_deref()
            .and_then(|v| v.split(';').next())
            .map(str::to_owned);
        let bytes = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        TestResponse {
            status,
            cookie,
            set_cookie,
            body,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, cookie, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, cookie, Some(body)).await
    }

    /// Register `name` with a derived email and return the session cookie.
    pub async fn register(&self, name: &str) -> String {
        let res = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "username": name,
                    "email": format!("{name}@example.com"),
                    "password": "password123",
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.cookie.expect("session cookie")
    }

    /// Change a user's role directly in storage.
    pub async fn set_role(&self, name: &str, role: Role) {
        let mut conn = self.state.forum.pool().get().await.expect("conn");
        let touched = db::set_user_role(&mut conn, name, role)
            .await
            .expect("set role");
        assert_eq!(touched, 1);
    }

    /// Deactivate a user directly in storage.
    pub async fn ban(&self, user_id: i32) {
        let mut conn = self.state.forum.pool().get().await.expect("conn");
        db::set_user_active(&mut conn, user_id, false)
            .await
            .expect("ban");
    }

    /// Register `name` and promote it to administrator.
    pub async fn admin(&self, name: &str) -> String {
        let cookie = self.register(name).await;
        self.set_role(name, Role::Admin).await;
        cookie
    }

    /// Create a category as `admin` and return its id.
    pub async fn category(&self, admin: &str, name: &str, sort_order: i32) -> i64 {
        let res = self
            .post(
                "/api/forum/categories",
                Some(admin),
                json!({ "name": name, "sortOrder": sort_order }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        id_of(&res.body)
    }

    /// Open a thread as `author` and return its id.
    pub async fn thread(&self, author: &str, category_id: i64, title: &str) -> i64 {
        let res = self
            .post(
                "/api/forum/threads",
                Some(author),
                json!({ "categoryId": category_id, "title": title, "content": "opening post" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        id_of(&res.body)
    }
}

pub fn id_of(body: &Value) -> i64 { body["id"].as_i64().expect("numeric id") }
