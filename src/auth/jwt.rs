use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, Identity};
use crate::config::SessionConfig;

/// Sessions live exactly seven days from issuance.
pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session token")]
    Invalid,
    #[error("failed to sign session token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signing and verification keys, built once at startup.
#[derive(Clone)]
pub struct SessionIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    validation: Validation,
}

impl SessionIssuer {
    pub fn new(cfg: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&cfg.audience));
        validation.set_issuer(std::slice::from_ref(&cfg.issuer));
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss", "aud"]);
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            validation,
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, SessionError> {
        self.issue_at(identity, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, identity: &Identity, now: OffsetDateTime) -> Result<String, SessionError> {
        let exp = now + TimeDuration::seconds(SESSION_TTL.as_secs() as i64);
        let claims = Claims {
            sub: identity.id,
            role: identity.role,
            name: identity.name.clone(),
            email: identity.email.clone(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(SessionError::Signing)?;
        debug!(user_id = %identity.id, role = %identity.role, "session issued");
        Ok(token)
    }

    /// Tampered, expired, foreign and malformed tokens are all just `Invalid`.
    pub fn parse(&self, token: &str) -> Result<Claims, SessionError> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                debug!(reason = ?e.kind(), "session rejected");
                Err(SessionError::Invalid)
            }
        }
    }
}
