//! Forum domain service.
//!
//! [`ForumService`] owns the connection pool and the password hasher and
//! exposes one method per forum operation. Methods that need a caller take
//! `Option<&Identity>` and run the [`crate::authz`] gates themselves, so the
//! same rules apply whichever front end drives the service.

mod accounts;
mod categories;
mod posts;
mod session;
mod threads;
pub(crate) mod validate;

use std::sync::Arc;

use argon2::Argon2;
use chrono::{Duration, NaiveDateTime, Utc};
use diesel_async::pooled_connection::bb8::PooledConnection;
use tokio::sync::OnceCell;

pub use self::{
    accounts::{Credentials, ProfileUpdate, Registration},
    categories::{CategoryInput, CategoryUpdate},
    posts::{PostEdit, PostInput},
    threads::{ThreadInput, ThreadModeration},
};
use crate::{
    db::{DbConnection, DbPool},
    error::ForumResult,
    models::SafeUser,
    roles::Role,
    users::{hash_password, verify_password},
};

/// The authenticated caller of a request, rebuilt from storage each time.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Session id the identity was resolved from.
    pub sid: String,
    /// Id of the signed-in user.
    pub user_id: i32,
    /// Fresh projection of the user row.
    pub user: SafeUser,
}

impl Identity {
    /// Current role of the caller.
    #[must_use]
    pub const fn role(&self) -> Role { self.user.role }
}

/// Result of a successful registration or login.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Newly issued session id for the cookie.
    pub sid: String,
    /// The signed-in user.
    pub user: SafeUser,
}

/// Entry point for every forum operation.
#[derive(Clone)]
pub struct ForumService {
    pool: DbPool,
    argon2: Arc<Argon2<'static>>,
    session_ttl: Duration,
    decoy: Arc<OnceCell<String>>,
}

/// Password behind the decoy hash. It is never stored for any account.
const DECOY_PASSWORD: &str = "forumd decoy password";

impl ForumService {
    /// Build a service over an already migrated pool.
    #[must_use]
    pub fn new(pool: DbPool, argon2: Argon2<'static>, session_ttl: Duration) -> Self {
        Self {
            pool,
            argon2: Arc::new(argon2),
            session_ttl,
            decoy: Arc::new(OnceCell::new()),
        }
    }

    /// Lifetime of newly issued sessions.
    #[must_use]
    pub const fn session_ttl(&self) -> Duration { self.session_ttl }

    /// Underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &DbPool { &self.pool }

    async fn conn(&self) -> ForumResult<PooledConnection<'_, DbConnection>> {
        Ok(self.pool.get().await?)
    }

    async fn hash(&self, password: String) -> ForumResult<String> {
        let argon2 = Arc::clone(&self.argon2);
        let hashed = tokio::task::spawn_blocking(move || hash_password(&argon2, &password)).await??;
        Ok(hashed)
    }

    /// Hash compared against when a login names no known account, computed
    /// once with the configured parameters so that path costs a full Argon2
    /// verification like any other.
    async fn decoy_hash(&self) -> ForumResult<String> {
        let hash = self
            .decoy
            .get_or_try_init(|| self.hash(DECOY_PASSWORD.to_owned()))
            .await?;
        Ok(hash.clone())
    }

    async fn verify(hash: String, password: String) -> ForumResult<bool> {
        Ok(tokio::task::spawn_blocking(move || verify_password(&hash, &password)).await?)
    }
}

fn now() -> NaiveDateTime { Utc::now().naive_utc() }
