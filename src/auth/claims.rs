use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Marketplace role, fixed at registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Seeker,
    Poster,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Seeker => "seeker",
            Role::Poster => "poster",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seeker" => Ok(Role::Seeker),
            "poster" => Ok(Role::Poster),
            other => Err(format!("`{other}` is not a valid role")),
        }
    }
}

/// Who a successful login or registration resolved to. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Session token payload. Unknown fields are rejected on decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    pub sub: Uuid,      // user ID
    pub role: Role,
    pub name: String,
    pub email: String,
    pub iat: i64,       // issued at (unix timestamp)
    pub exp: i64,       // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// What clients see when they read their session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionView {
    pub user: SessionUser,
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

pub fn session_view(claims: &Claims) -> SessionView {
    let expires = OffsetDateTime::from_unix_timestamp(claims.exp)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    SessionView {
        user: SessionUser {
            id: claims.sub,
            name: claims.name.clone(),
            email: claims.email.clone(),
            role: claims.role,
        },
        expires,
    }
}
