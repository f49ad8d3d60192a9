use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let secret = lookup("AUTH_SECRET")
            .filter(|s| !s.is_empty())
            .context("AUTH_SECRET is not set")?;
        let session = SessionConfig {
            secret,
            issuer: lookup("AUTH_ISSUER").unwrap_or_else(|| "gigboard".into()),
            audience: lookup("AUTH_AUDIENCE").unwrap_or_else(|| "gigboard-users".into()),
            cookie_name: lookup("SESSION_COOKIE").unwrap_or_else(|| "gigboard_session".into()),
            cookie_secure: lookup("SESSION_COOKIE_SECURE")
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(true),
        };
        Ok(Self {
            database_url,
            session,
        })
    }
}
