use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::claims::Role;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rating {
    pub avg: f64,
    pub count: i32,
}

/// User record as the rest of the crate sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 PHC string, not exposed in JSON
    pub role: Role,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub location: Location,
    pub rating: Rating,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Validated input for a new user; the hash is already computed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub location: Location,
}

/// Row shape of the `users` table.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub location_city: Option<String>,
    pub location_state: Option<String>,
    pub location_pincode: Option<String>,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            password_hash: r.password_hash,
            role: r.role.parse()?,
            avatar: r.avatar,
            phone: r.phone,
            bio: r.bio,
            skills: r.skills,
            location: Location {
                city: r.location_city,
                state: r.location_state,
                pincode: r.location_pincode,
            },
            rating: Rating {
                avg: r.rating_avg,
                count: r.rating_count,
            },
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
