use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::User;

/// Process-local store with the same email uniqueness rule as the `users` table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn save(&self, mut user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|other| other.id != user.id && other.email == user.email)
        {
            warn!(email = %user.email, "email uniqueness enforced by storage");
            return Err(DomainError::DuplicateEmail(user.email));
        }

        if let Some(stored) = users.get(&user.id) {
            user.created_at = stored.created_at;
        }
        users.insert(user.id, user.clone());

        info!(user_id = %user.id, email = %user.email, "user saved");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        match self.users.write().await.remove(&id) {
            Some(_) => {
                info!(user_id = %id, "user deleted");
                Ok(())
            }
            None => Err(DomainError::UserNotFound(id)),
        }
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }
}
