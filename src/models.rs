//! Row types for the forum tables and the client-facing user projection.
//!
//! Queryable structs list their fields in the same order as the columns in
//! [`crate::schema`]. [`User`] deliberately does not implement `Serialize`;
//! the only user shape that leaves the process is [`SafeUser`].
#![expect(
    missing_docs,
    reason = "row fields mirror the columns defined in the migrations"
)]

use std::fmt;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Full user row, including the password hash.
#[derive(Queryable, Identifiable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub post_count: i32,
    pub thread_count: i32,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    /// Parsed role; unrecognised stored values fall back to the least
    /// privileged role.
    #[must_use]
    pub fn role(&self) -> Role { self.role.parse().unwrap_or_default() }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .finish_non_exhaustive()
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub display_name: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub role: &'a str,
    pub is_active: bool,
    pub post_count: i32,
    pub thread_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Profile fields a user may change on their own account.
#[derive(AsChangeset, Default, Debug)]
#[diesel(table_name = crate::schema::users)]
pub struct ProfileChanges<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub display_name: Option<&'a str>,
    pub bio: Option<&'a str>,
}

/// The user record without its password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub post_count: i32,
    pub thread_count: i32,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<User> for SafeUser {
    fn from(user: User) -> Self {
        let role = user.role();
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            display_name: user.display_name,
            bio: user.bio,
            role,
            is_active: user.is_active,
            post_count: user.post_count,
            thread_count: user.thread_count,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Queryable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::forum_categories)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub thread_count: i32,
    pub post_count: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::forum_categories)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub sort_order: i32,
    pub thread_count: i32,
    pub post_count: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Administrative edits to a category. `None` leaves a column untouched.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::forum_categories)]
pub struct CategoryChanges<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::forum_threads)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: i32,
    pub category_id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub is_locked: bool,
    pub is_sticky: bool,
    pub post_count: i32,
    pub view_count: i32,
    pub last_post_at: NaiveDateTime,
    pub last_post_user_id: Option<i32>,
    pub last_post_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::forum_threads)]
pub struct NewThread<'a> {
    pub category_id: i32,
    pub user_id: i32,
    pub title: &'a str,
    pub content: &'a str,
    pub is_locked: bool,
    pub is_sticky: bool,
    pub post_count: i32,
    pub view_count: i32,
    pub last_post_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Moderator flags on a thread.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::forum_threads)]
pub struct ThreadFlags {
    pub is_locked: Option<bool>,
    pub is_sticky: Option<bool>,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::forum_posts)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i32,
    pub thread_id: i32,
    pub user_id: i32,
    pub content: String,
    pub is_deleted: bool,
    pub edit_count: i32,
    pub edited_at: Option<NaiveDateTime>,
    pub edited_by_user_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::forum_posts)]
pub struct NewPost<'a> {
    pub thread_id: i32,
    pub user_id: i32,
    pub content: &'a str,
    pub is_deleted: bool,
    pub edit_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Server-side session row.
#[derive(Queryable, Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::sessions)]
pub struct SessionRecord {
    pub sid: String,
    pub user_id: i32,
    pub payload: String,
    pub expire: NaiveDateTime,
}
