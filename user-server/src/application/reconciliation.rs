use tracing::debug;

use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{FieldUpdate, User, UserPatch, age_in_range};

/// Outcome of merging a patch into a stored user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub user: User,
    pub changed: bool,
}

/// Merges `patch` into a copy of `existing`, field by field: name, email, age.
///
/// Blank or identical values leave a field unchanged. A new email is rejected
/// with `DuplicateEmail` when another user owns it; an age outside `1..=150`
/// is rejected with `InvalidAge`. The repository is only read. On error
/// `existing` is untouched, and when `changed` is false the returned user
/// equals `existing`, so the caller must skip the write.
pub async fn reconcile<R>(
    repo: &R,
    existing: &User,
    patch: &UserPatch,
) -> Result<Reconciliation, DomainError>
where
    R: UserRepository + ?Sized,
{
    let mut user = existing.clone();
    let mut changed = false;

    if let Some(name) = proposed_text(&patch.name, &user.name) {
        user.name = name.to_string();
        changed = true;
    }

    if let Some(email) = proposed_text(&patch.email, &user.email) {
        if let Some(owner) = repo.find_by_email(email).await? {
            if owner.id != user.id {
                return Err(DomainError::DuplicateEmail(email.to_string()));
            }
        }
        user.email = email.to_string();
        changed = true;
    }

    if let FieldUpdate::Set(age) = patch.age {
        if age != user.age {
            if !age_in_range(age) {
                return Err(DomainError::InvalidAge(age));
            }
            user.age = age;
            changed = true;
        }
    }

    debug!(user_id = %user.id, changed, "patch reconciled");
    Ok(Reconciliation { user, changed })
}

fn proposed_text<'a>(field: &'a FieldUpdate<String>, current: &str) -> Option<&'a str> {
    field
        .as_set()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty() && *value != current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory_repository::InMemoryUserRepository;

    fn ivan() -> User {
        User::new("Ivan".into(), "ivan@x.com".into(), 25)
    }

    fn patch(name: Option<&str>, email: Option<&str>, age: Option<i32>) -> UserPatch {
        UserPatch {
            name: name.map(str::to_string).into(),
            email: email.map(str::to_string).into(),
            age: age.into(),
        }
    }

    #[tokio::test]
    async fn empty_patch_changes_nothing() {
        let existing = ivan();
        let repo = InMemoryUserRepository::with_users([existing.clone()]);

        let result = reconcile(&repo, &existing, &UserPatch::default())
            .await
            .unwrap();

        assert!(!result.changed);
        assert_eq!(result.user, existing);
    }

    #[tokio::test]
    async fn blank_name_absent_email_and_same_age_are_a_no_op() {
        let existing = ivan();
        let repo = InMemoryUserRepository::with_users([existing.clone()]);

        let result = reconcile(&repo, &existing, &patch(Some("  "), None, Some(25)))
            .await
            .unwrap();

        assert!(!result.changed);
        assert_eq!(result.user, existing);
    }

    #[tokio::test]
    async fn values_equal_after_trim_are_a_no_op() {
        let existing = ivan();
        let repo = InMemoryUserRepository::with_users([existing.clone()]);

        let result = reconcile(
            &repo,
            &existing,
            &patch(Some(" Ivan "), Some("\tivan@x.com "), Some(25)),
        )
        .await
        .unwrap();

        assert!(!result.changed);
        assert_eq!(result.user, existing);
    }

    #[tokio::test]
    async fn applies_trimmed_values() {
        let existing = ivan();
        let repo = InMemoryUserRepository::with_users([existing.clone()]);

        let result = reconcile(
            &repo,
            &existing,
            &patch(Some("  Ivan Petrov "), Some(" ivan.p@x.com"), Some(26)),
        )
        .await
        .unwrap();

        assert!(result.changed);
        assert_eq!(result.user.name, "Ivan Petrov");
        assert_eq!(result.user.email, "ivan.p@x.com");
        assert_eq!(result.user.age, 26);
        assert_eq!(result.user.id, existing.id);
        assert_eq!(result.user.created_at, existing.created_at);
    }

    #[tokio::test]
    async fn email_owned_by_another_user_is_rejected() {
        let a = User::new("Anna".into(), "a@x.com".into(), 30);
        let b = User::new("Boris".into(), "b@x.com".into(), 40);
        let repo = InMemoryUserRepository::with_users([a.clone(), b]);

        let err = reconcile(&repo, &a, &patch(Some("Anya"), Some("b@x.com"), None))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::DuplicateEmail(email) if email == "b@x.com"));
        let stored = repo.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(stored, a);
    }

    #[tokio::test]
    async fn age_out_of_range_is_rejected() {
        let existing = ivan();
        let repo = InMemoryUserRepository::with_users([existing.clone()]);

        for age in [0, -5, 151, 200] {
            let err = reconcile(&repo, &existing, &patch(None, None, Some(age)))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidAge(v) if v == age));
        }
    }

    #[tokio::test]
    async fn age_bounds_are_accepted() {
        let existing = ivan();
        let repo = InMemoryUserRepository::with_users([existing.clone()]);

        for age in [1, 150] {
            let result = reconcile(&repo, &existing, &patch(None, None, Some(age)))
                .await
                .unwrap();
            assert!(result.changed);
            assert_eq!(result.user.age, age);
        }
    }

    #[tokio::test]
    async fn duplicate_email_surfaces_before_invalid_age() {
        let a = User::new("Anna".into(), "a@x.com".into(), 30);
        let b = User::new("Boris".into(), "b@x.com".into(), 40);
        let repo = InMemoryUserRepository::with_users([a.clone(), b]);

        let err = reconcile(&repo, &a, &patch(None, Some("b@x.com"), Some(0)))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::DuplicateEmail(_)));
    }
}
