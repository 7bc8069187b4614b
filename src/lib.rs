//! Core library for `forumd`, the REST backend of the tribute site's forum.
//!
//! This crate exposes the database layer, the forum domain service, the HTTP
//! router, and the server runtime used by the binary. Only one database
//! backend (either `sqlite` or `postgres`) should be enabled at a time.
cfg_if::cfg_if! {
    if #[cfg(all(feature = "sqlite", feature = "postgres", not(feature = "lint")))] {
        compile_error!("Choose either sqlite or postgres, not both");
    } else if #[cfg(feature = "sqlite")] {
        pub use diesel::sqlite::Sqlite as DbBackend;
    } else if #[cfg(feature = "postgres")] {
        pub use diesel::pg::Pg as DbBackend;
    } else {
        compile_error!("Either the 'sqlite' or 'postgres' feature must be enabled");
    }
}

pub mod authz;
pub mod db;
pub mod error;
pub mod forum;
pub mod http;
pub mod models;
pub mod roles;
pub mod schema;
pub mod server;
pub mod telemetry;
pub mod users;
