use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::reconciliation::reconcile;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{NewUser, User, UserPatch};
use crate::infrastructure::events::{EventPublisher, UserEvent, UserOperation};

pub struct UserService<R: UserRepository + 'static> {
    repo: Arc<R>,
    events: Arc<dyn EventPublisher>,
}

impl<R: UserRepository + 'static> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            events: Arc::clone(&self.events),
        }
    }
}

impl<R> UserService<R>
where
    R: UserRepository + 'static,
{
    pub fn new(repo: Arc<R>, events: Arc<dyn EventPublisher>) -> Self {
        Self { repo, events }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.repo.find_all().await
    }

    #[instrument(skip(self))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        let new_user = new_user.normalized()?;

        if self.repo.exists_by_email(&new_user.email).await? {
            return Err(DomainError::DuplicateEmail(new_user.email));
        }

        // a concurrent insert that wins the race is rejected by the storage constraint
        let user = User::new(new_user.name, new_user.email, new_user.age);
        let user = self.repo.save(user).await?;
        info!(user_id = %user.id, "user created");

        self.events
            .publish(UserEvent::new(user.email.clone(), UserOperation::Create));
        Ok(user)
    }

    /// Applies a partial update; storage is written only when a field actually changed.
    #[instrument(skip(self))]
    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<User, DomainError> {
        let existing = self.get_user(id).await?;
        patch.validate()?;

        let outcome = reconcile(self.repo.as_ref(), &existing, &patch).await?;
        if !outcome.changed {
            info!(user_id = %id, "update is a no-op");
            return Ok(existing);
        }

        let user = self.repo.save(outcome.user).await?;
        info!(user_id = %id, "user updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        let user = self.get_user(id).await?;
        self.repo.delete(id).await?;
        info!(user_id = %id, "user deleted");

        self.events
            .publish(UserEvent::new(user.email, UserOperation::Delete));
        Ok(())
    }
}
