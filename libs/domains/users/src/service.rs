use std::sync::Arc;
use tracing::instrument;

use crate::error::{ConflictKind, MISSING_CREATE_FIELDS, MISSING_UPDATE_FIELDS, UserError, UserResult};
use crate::models::{CreateUserForm, NewUser, UpdateUserForm, UserChanges, UserResponse, parse_user_id};
use crate::password::PasswordHashing;
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    hashing: PasswordHashing,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_hashing(repository, PasswordHashing::default())
    }

    pub fn with_hashing(repository: R, hashing: PasswordHashing) -> Self {
        Self {
            repository: Arc::new(repository),
            hashing,
        }
    }

    /// Hex ids of every stored user
    #[instrument(skip(self))]
    pub async fn list_user_ids(&self) -> UserResult<Vec<String>> {
        let ids = self.repository.list_ids().await?;
        Ok(ids.into_iter().map(|id| id.to_hex()).collect())
    }

    /// Get a user by its textual id
    #[instrument(skip(self))]
    pub async fn get_user(&self, uid: &str) -> UserResult<UserResponse> {
        let id = parse_user_id(uid).ok_or(UserError::NotFound)?;
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        Ok(user.into())
    }

    /// Create a user after checking that its name and email are unused
    #[instrument(skip(self, form))]
    pub async fn create_user(&self, form: CreateUserForm) -> UserResult<UserResponse> {
        let (Some(name), Some(email), Some(password)) = (form.name, form.email, form.password)
        else {
            return Err(UserError::Validation(MISSING_CREATE_FIELDS));
        };

        let name_taken = self.repository.exists_by_name(&name).await?;
        let email_taken = self.repository.exists_by_email(&email).await?;
        if let Some(kind) = ConflictKind::from_flags(name_taken, email_taken) {
            tracing::info!(?kind, "Rejected user creation");
            return Err(UserError::Conflict(kind));
        }

        let password = self.hashing.hash(&password)?;
        let id = self
            .repository
            .insert(NewUser {
                name,
                email,
                password,
            })
            .await?;

        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;
        Ok(user.into())
    }

    /// Delete a user, returning the record as it was just before removal
    #[instrument(skip(self))]
    pub async fn delete_user(&self, uid: &str) -> UserResult<UserResponse> {
        let id = parse_user_id(uid).ok_or(UserError::NotFound)?;
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        self.repository.delete(id).await?;
        Ok(user.into())
    }

    /// Overwrite the supplied fields of a user. Name and email uniqueness is
    /// not re-checked here.
    #[instrument(skip(self, form))]
    pub async fn update_user(&self, uid: &str, form: UpdateUserForm) -> UserResult<UserResponse> {
        let id = parse_user_id(uid).ok_or(UserError::NotFound)?;
        if form.is_empty() {
            return Err(UserError::Validation(MISSING_UPDATE_FIELDS));
        }

        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        let password = form
            .password
            .as_deref()
            .map(|plaintext| self.hashing.hash(plaintext))
            .transpose()?;
        let changes = UserChanges {
            name: form.name,
            email: form.email,
            password,
        };
        self.repository.update(id, changes).await?;

        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;
        Ok(user.into())
    }

    /// Check `plaintext` against the stored hash of a user
    #[instrument(skip(self, plaintext))]
    pub async fn verify_password(&self, uid: &str, plaintext: &str) -> UserResult<bool> {
        let id = parse_user_id(uid).ok_or(UserError::NotFound)?;
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound)?;

        Ok(user.password.verify(plaintext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EMAIL_TAKEN, NAME_AND_EMAIL_TAKEN, NAME_TAKEN};
    use crate::models::User;
    use crate::password::cheap_hashing;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use mockall::predicate::eq;
    use mongodb::bson::oid::ObjectId;

    fn service(repo: MockUserRepository) -> UserService<MockUserRepository> {
        UserService::with_hashing(repo, cheap_hashing())
    }

    fn create_form(name: &str, email: &str, password: &str) -> CreateUserForm {
        CreateUserForm {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn stored_user(id: ObjectId) -> User {
        User {
            id,
            name: "ada".into(),
            email: "ada@example.com".into(),
            password: cheap_hashing().hash("pw").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_malformed_uid_never_touches_store() {
        // A mock with no expectations panics on any call.
        let svc = service(MockUserRepository::new());

        for uid in ["abc", "", "0123456789abcdef0123456789", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
            assert!(matches!(svc.get_user(uid).await, Err(UserError::NotFound)));
            assert!(matches!(svc.delete_user(uid).await, Err(UserError::NotFound)));
            assert!(matches!(
                svc.update_user(uid, UpdateUserForm::default()).await,
                Err(UserError::NotFound)
            ));
        }
    }

    #[tokio::test]
    async fn test_create_missing_field_never_touches_store() {
        let svc = service(MockUserRepository::new());
        let form = CreateUserForm {
            name: Some("ada".into()),
            email: Some("ada@example.com".into()),
            password: None,
        };

        let err = svc.create_user(form).await.unwrap_err();
        assert!(matches!(err, UserError::Validation(MISSING_CREATE_FIELDS)));
    }

    #[tokio::test]
    async fn test_create_conflict_matrix() {
        let cases = [
            (true, false, NAME_TAKEN),
            (false, true, EMAIL_TAKEN),
            (true, true, NAME_AND_EMAIL_TAKEN),
        ];

        for (name_taken, email_taken, expected) in cases {
            let mut repo = MockUserRepository::new();
            repo.expect_exists_by_name()
                .with(eq("ada"))
                .returning(move |_| Ok(name_taken));
            repo.expect_exists_by_email()
                .with(eq("ada@example.com"))
                .returning(move |_| Ok(email_taken));
            repo.expect_insert().never();

            let err = service(repo)
                .create_user(create_form("ada", "ada@example.com", "pw"))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn test_create_stores_hash_and_returns_stored_record() {
        let repo = InMemoryUserRepository::new();
        let svc = UserService::with_hashing(repo.clone(), cheap_hashing());

        let created = svc
            .create_user(create_form("ada", "ada@example.com", "hunter2"))
            .await
            .unwrap();

        assert_eq!(created.id.len(), 24);
        assert_eq!(created.name, "ada");
        assert_ne!(created.password, "hunter2");
        assert!(svc.verify_password(&created.id, "hunter2").await.unwrap());
        assert!(!svc.verify_password(&created.id, "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_empty_form_is_rejected_before_lookup() {
        let svc = service(MockUserRepository::new());
        let uid = ObjectId::new().to_hex();

        let err = svc
            .update_user(&uid, UpdateUserForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(MISSING_UPDATE_FIELDS)));
    }

    #[tokio::test]
    async fn test_update_unknown_user_does_not_write() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let form = UpdateUserForm {
            name: Some("x".into()),
            ..Default::default()
        };
        let err = service(repo)
            .update_user(&ObjectId::new().to_hex(), form)
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_returns_snapshot() {
        let id = ObjectId::new();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(id))
            .times(1)
            .returning(move |id| Ok(Some(stored_user(id))));
        repo.expect_delete().with(eq(id)).times(1).returning(|_| Ok(()));

        let deleted = service(repo).delete_user(&id.to_hex()).await.unwrap();
        assert_eq!(deleted.id, id.to_hex());
        assert_eq!(deleted.name, "ada");
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_database_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_list_ids()
            .returning(|| Err(UserError::Database("down".into())));

        let err = service(repo).list_user_ids().await.unwrap_err();
        assert!(matches!(err, UserError::Database(_)));
    }
}
