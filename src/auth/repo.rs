use async_trait::async_trait;
use sqlx::{error::ErrorKind, PgPool};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("{0}")]
    Constraint(String),

    #[error("credential store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

// Postgres SQLSTATE for "value too long for type".
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::UniqueViolation => return StoreError::DuplicateEmail,
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                    return StoreError::Constraint(db_err.message().to_string())
                }
                _ => {}
            }
            if db_err.code().as_deref() == Some(STRING_DATA_RIGHT_TRUNCATION) {
                return StoreError::Constraint(db_err.message().to_string());
            }
        }
        StoreError::Unavailable(err.into())
    }
}

/// Persisted user records. Implementations must enforce email uniqueness themselves.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
}

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, role, avatar, phone, \
     bio, skills, location_city, location_state, location_pincode, rating_avg, rating_count, \
     created_at, updated_at";

#[derive(Clone)]
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_user(row: UserRow) -> Result<User, StoreError> {
    User::try_from(row).map_err(|e| StoreError::Unavailable(anyhow::anyhow!("corrupt user row: {e}")))
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(into_user).transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, role,
                               phone, bio, skills, location_city, location_state, location_pincode)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.phone)
        .bind(&user.bio)
        .bind(&user.skills)
        .bind(&user.location.city)
        .bind(&user.location.state)
        .bind(&user.location.pincode)
        .fetch_one(&self.db)
        .await?;
        into_user(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{borrow::Cow, error::Error as StdError, fmt};

    #[derive(Debug)]
    struct TestDbError {
        code: &'static str,
        kind: ErrorKind,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test db error {}", self.code)
        }
    }

    impl StdError for TestDbError {}

    impl sqlx::error::DatabaseError for TestDbError {
        fn message(&self) -> &str {
            "constraint says no"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.kind {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::CheckViolation => ErrorKind::CheckViolation,
                ErrorKind::NotNullViolation => ErrorKind::NotNullViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn db_error(code: &'static str, kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(TestDbError { code, kind }))
    }

    #[test]
    fn unique_violation_maps_to_duplicate_email() {
        let err = StoreError::from(db_error("23505", ErrorKind::UniqueViolation));
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[test]
    fn schema_violations_map_to_constraint() {
        let err = StoreError::from(db_error("23514", ErrorKind::CheckViolation));
        assert!(matches!(err, StoreError::Constraint(msg) if msg == "constraint says no"));
        let err = StoreError::from(db_error("22001", ErrorKind::Other));
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[test]
    fn connectivity_faults_map_to_unavailable() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(db_error("99999", ErrorKind::Other)),
            StoreError::Unavailable(_)
        ));
    }
}
