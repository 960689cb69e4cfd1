use crate::domain::error::DomainError;
use crate::domain::user::User;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const EMAIL_CONSTRAINT: &str = "users_email_key";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;
    /// Inserts the user, or overwrites the mutable fields of the row with the same id.
    async fn save(&self, user: User) -> Result<User, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError>;
}

/// True when the error is the `users` email unique constraint rejecting a write.
fn is_email_conflict(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation() && db.constraint() == Some(EMAIL_CONSTRAINT))
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, age, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find user by id {}: {}", id, e);
            DomainError::Internal(format!("database error: {}", e))
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, age, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to find user by email {}: {}", email, e);
            DomainError::Internal(format!("database error: {}", e))
        })
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, age, created_at
            FROM users
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("db error while fetching users: {}", e);
            DomainError::Internal(format!("database error: {}", e))
        })?;

        debug!(count = users.len(), "users fetched");
        Ok(users)
    }

    async fn save(&self, user: User) -> Result<User, DomainError> {
        let saved = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, age, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, email = EXCLUDED.email, age = EXCLUDED.age
            RETURNING id, name, email, age, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.age)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_email_conflict(&e) {
                warn!(email = %user.email, "email uniqueness enforced by storage");
                DomainError::DuplicateEmail(user.email.clone())
            } else {
                error!("failed to save user {}: {}", user.id, e);
                DomainError::Internal(format!("database error: {}", e))
            }
        })?;

        info!(user_id = %saved.id, email = %saved.email, "user saved");
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete user {}: {}", id, e);
                DomainError::Internal(format!("database error: {}", e))
            })?;

        if deleted.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id));
        }

        info!(user_id = %id, "user deleted");
        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to check email {}: {}", email, e);
                DomainError::Internal(format!("database error: {}", e))
            })
    }
}
