//! Account roles and the hierarchy used by authorization checks.
//!
//! Roles are persisted as lowercase text in the `users.role` column. The
//! hierarchy is strict: `admin` satisfies every requirement, `moderator`
//! satisfies moderator and member requirements, and `member` satisfies only
//! itself.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role attached to a user account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular forum participant.
    #[default]
    Member,
    /// May lock, pin and clean up threads and posts.
    Moderator,
    /// Full control, including category management.
    Admin,
}

/// Returned when text does not name a known role.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    /// Database and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Member => 0,
            Self::Moderator => 1,
            Self::Admin => 2,
        }
    }

    /// Whether this role meets `required`.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool { self.rank() >= required.rank() }

    /// Moderators and admins may act on content they do not own.
    #[must_use]
    pub const fn can_moderate(self) -> bool { self.satisfies(Self::Moderator) }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}
