use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{CredentialStore, StoreError};
use super::repo_types::{NewUser, Rating, User};

/// Map-backed store for tests. Uniqueness is checked under the same lock as the write.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryCredentialStore {
    pub fn len(&self) -> usize {
        self.users.lock().map(|u| u.len()).unwrap_or(0)
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable(anyhow::anyhow!("memory store lock poisoned"))
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.lock().map_err(|_| poisoned())?;
        if users.values().any(|u| u.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        if new.bio.as_ref().is_some_and(|b| b.chars().count() > 500) {
            return Err(StoreError::Constraint("bio is too long".into()));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: new.id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            avatar: None,
            phone: new.phone,
            bio: new.bio,
            skills: new.skills,
            location: new.location,
            rating: Rating::default(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}
