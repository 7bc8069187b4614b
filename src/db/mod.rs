//! Manage database connections and forum queries.
//!
//! This module tree exposes helpers for creating pooled Diesel connections,
//! running embedded migrations, and executing forum queries grouped by the
//! table they touch. Writes that span several tables run inside a single
//! transaction and express counter changes in SQL.

mod categories;
mod connection;
mod migrations;
mod posts;
mod sessions;
mod threads;
mod users;

#[cfg(test)]
mod tests;

pub use self::{
    categories::{create_category, get_category, list_active_categories, update_category},
    connection::{Backend, DbConnection, DbPool, MIGRATIONS, establish_pool, redact_url},
    migrations::{MigrationError, apply_migrations},
    posts::{create_post, edit_post, get_post, list_posts_in_thread, soft_delete_post},
    sessions::{delete_session, find_live_session, insert_session, purge_expired, refresh_payload},
    threads::{create_thread, get_thread, list_threads_in_category, record_view, set_thread_flags},
    users::{
        create_user,
        find_taken,
        get_user,
        get_user_by_name,
        record_login,
        set_user_active,
        set_user_role,
        update_profile,
    },
};
#[cfg(feature = "sqlite")]
pub use self::connection::establish_sqlite;
