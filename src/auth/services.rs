use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{
    claims::{Identity, Role},
    dto::RegisterRequest,
    password::{hash_password_blocking, verify_password_blocking},
    repo::CredentialStore,
    repo_types::{Location, NewUser, User},
};
use crate::error::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_BIO_LEN: usize = 500;

const REGISTER_REQUIRED: &str = "First name, email, and password are required";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.display_name(),
            role: user.role,
        }
    }
}

/// Checks an email/password pair against the store.
///
/// Missing fields, unknown email and wrong password all come back as
/// `InvalidCredentials`; only the server log tells them apart.
pub async fn authorize(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<Identity, AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        warn!("login missing credentials");
        return Err(AuthError::InvalidCredentials);
    }
    let email = normalize_email(email);

    let Some(user) = store.find_by_email(&email).await? else {
        warn!("login unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    let ok = verify_password_blocking(password.to_string(), user.password_hash.clone())
        .await
        .map_err(AuthError::Internal)?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    info!(user_id = %user.id, role = %user.role, "user authenticated");
    Ok(Identity::from(&user))
}

/// Creates a user. Checks run in a fixed order: required fields, password
/// length, email uniqueness, schema constraints, then hash and write.
pub async fn register(
    store: &dyn CredentialStore,
    req: RegisterRequest,
) -> Result<Identity, AuthError> {
    let first_name = present(req.first_name.as_deref())
        .ok_or(AuthError::MissingField(REGISTER_REQUIRED))?
        .trim()
        .to_string();
    let email = present(req.email.as_deref())
        .map(normalize_email)
        .ok_or(AuthError::MissingField(REGISTER_REQUIRED))?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or(AuthError::MissingField(REGISTER_REQUIRED))?;

    // Length is counted in UTF-16 code units, as browsers count it.
    if password.encode_utf16().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }

    if store.find_by_email(&email).await?.is_some() {
        warn!("registration for existing email");
        return Err(AuthError::EmailTaken);
    }

    if !is_valid_email(&email) {
        return Err(AuthError::ValidationFailed("Please enter a valid email".into()));
    }
    let requested_role = present(req.role.as_deref());
    let role = match requested_role {
        None => Role::Seeker,
        Some(r) => r.parse::<Role>().map_err(AuthError::ValidationFailed)?,
    };
    let bio = trimmed(req.bio);
    if bio.as_ref().is_some_and(|b| b.chars().count() > MAX_BIO_LEN) {
        return Err(AuthError::ValidationFailed(format!(
            "Bio cannot exceed {MAX_BIO_LEN} characters"
        )));
    }

    // Skills and location are only taken from an explicit seeker signup;
    // a defaulted role stores neither.
    let (skills, location) = match requested_role {
        Some("seeker") => (
            req.skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            req.location
                .map(|l| Location {
                    city: trimmed(l.city),
                    state: trimmed(l.state),
                    pincode: trimmed(l.pincode),
                })
                .unwrap_or_default(),
        ),
        _ => (Vec::new(), Location::default()),
    };

    let password_hash = hash_password_blocking(password)
        .await
        .map_err(AuthError::Internal)?;

    let user = store
        .insert(NewUser {
            id: Uuid::new_v4(),
            first_name,
            last_name: trimmed(req.last_name).unwrap_or_default(),
            email,
            password_hash,
            role,
            phone: trimmed(req.phone),
            bio,
            skills,
            location,
        })
        .await?;

    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(Identity::from(&user))
}
