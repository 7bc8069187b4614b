//! Registration, login and profile operations.

use serde::Deserialize;
use tracing::{info, warn};

use super::{ForumService, Identity, SignedIn, now, validate};
use crate::{
    authz::require_authenticated,
    db,
    error::{ForumError, ForumResult},
    models::{NewUser, ProfileChanges, SafeUser},
    roles::Role,
};

/// Body of a registration request.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Desired username, 3 to 50 characters.
    pub username: String,
    /// Contact address, unique across accounts.
    pub email: String,
    /// Plaintext password, at least 8 characters.
    pub password: String,
    /// Optional given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Optional family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Optional public display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Optional free-form biography.
    #[serde(default)]
    pub bio: Option<String>,
}

/// Body of a login request.
#[derive(Deserialize, Debug, Clone)]
pub struct Credentials {
    /// Exact username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Profile fields a user may change on their own account.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New display name.
    pub display_name: Option<String>,
    /// New biography.
    pub bio: Option<String>,
}

impl ForumService {
    /// Create a member account and sign it in.
    ///
    /// # Errors
    /// Returns [`ForumError::InvalidInput`] for malformed fields,
    /// [`ForumError::Conflict`] when the username or email is taken, and
    /// infrastructure errors otherwise.
    pub async fn register(&self, input: Registration) -> ForumResult<SignedIn> {
        validate::username(&input.username)?;
        validate::email(&input.email)?;
        validate::password(&input.password)?;

        let mut conn = self.conn().await?;
        match db::find_taken(&mut conn, &input.username, &input.email).await? {
            (true, _) => return Err(ForumError::Conflict("username already taken".to_owned())),
            (_, true) => return Err(ForumError::Conflict("email already registered".to_owned())),
            (false, false) => {}
        }

        let password_hash = self.hash(input.password).await?;
        let created_at = now();
        let row = db::create_user(
            &mut conn,
            &NewUser {
                username: &input.username,
                email: &input.email,
                password_hash: &password_hash,
                first_name: input.first_name.as_deref(),
                last_name: input.last_name.as_deref(),
                display_name: input.display_name.as_deref(),
                bio: input.bio.as_deref(),
                role: Role::Member.as_str(),
                is_active: true,
                post_count: 0,
                thread_count: 0,
                created_at,
                updated_at: created_at,
            },
        )
        .await?;
        info!(user_id = row.id, username = %row.username, "registered user");
        self.open_session(&mut conn, SafeUser::from(row)).await
    }

    /// Check credentials and sign the user in.
    ///
    /// # Errors
    /// Returns [`ForumError::InvalidCredentials`] for an unknown user, a wrong
    /// password or a deactivated account, and infrastructure errors otherwise.
    pub async fn login(&self, input: Credentials) -> ForumResult<SignedIn> {
        let mut conn = self.conn().await?;
        let Some(row) = db::get_user_by_name(&mut conn, &input.username).await? else {
            Self::verify(self.decoy_hash().await?, input.password).await?;
            warn!(username = %input.username, "login for unknown user");
            return Err(ForumError::InvalidCredentials);
        };
        if !Self::verify(row.password_hash.clone(), input.password).await? {
            warn!(user_id = row.id, "login with wrong password");
            return Err(ForumError::InvalidCredentials);
        }
        if !row.is_active {
            warn!(user_id = row.id, "login for deactivated account");
            return Err(ForumError::InvalidCredentials);
        }
        let stamped = db::record_login(&mut conn, row.id, now()).await?;
        self.open_session(&mut conn, SafeUser::from(stamped)).await
    }

    /// The caller's own account.
    ///
    /// # Errors
    /// Returns [`ForumError::Unauthorized`] without a session.
    pub fn me(identity: Option<&Identity>) -> ForumResult<SafeUser> {
        Ok(require_authenticated(identity)?.user.clone())
    }

    /// Public view of any account.
    ///
    /// # Errors
    /// Returns [`ForumError::NotFound`] for unknown ids.
    pub async fn get_safe_user(&self, user_id: i32) -> ForumResult<SafeUser> {
        let mut conn = self.conn().await?;
        db::get_user(&mut conn, user_id)
            .await?
            .map(SafeUser::from)
            .ok_or(ForumError::NotFound("user"))
    }

    /// Change display fields on the caller's account.
    ///
    /// # Errors
    /// Returns [`ForumError::Unauthorized`] without a session.
    pub async fn update_profile(
        &self,
        identity: Option<&Identity>,
        input: ProfileUpdate,
    ) -> ForumResult<SafeUser> {
        let who = require_authenticated(identity)?;
        let changes = ProfileChanges {
            first_name: input.first_name.as_deref(),
            last_name: input.last_name.as_deref(),
            display_name: input.display_name.as_deref(),
            bio: input.bio.as_deref(),
        };
        let mut conn = self.conn().await?;
        let row = db::update_profile(&mut conn, who.user_id, &changes, now()).await?;
        Ok(SafeUser::from(row))
    }
}
