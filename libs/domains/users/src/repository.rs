use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::UserResult;
use crate::models::{NewUser, User, UserChanges};

/// Persistence for user documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Ids of every stored user, in store order
    async fn list_ids(&self) -> UserResult<Vec<ObjectId>>;

    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>>;

    /// Exact, case-sensitive match
    async fn exists_by_name(&self, name: &str) -> UserResult<bool>;

    /// Exact, case-sensitive match
    async fn exists_by_email(&self, email: &str) -> UserResult<bool>;

    /// Store `user` and return the id assigned to it
    async fn insert(&self, user: NewUser) -> UserResult<ObjectId>;

    /// Apply `changes` to the user with `id`. Missing users are ignored.
    async fn update(&self, id: ObjectId, changes: UserChanges) -> UserResult<()>;

    /// Remove the user with `id`. Missing users are ignored.
    async fn delete(&self, id: ObjectId) -> UserResult<()>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_ids(&self) -> UserResult<Vec<ObjectId>> {
        let users = self.users.read().await;
        Ok(users.iter().map(|u| u.id).collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn exists_by_name(&self, name: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.name == name))
    }

    async fn exists_by_email(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn insert(&self, user: NewUser) -> UserResult<ObjectId> {
        let id = ObjectId::new();
        let mut users = self.users.write().await;
        users.push(User {
            id,
            name: user.name,
            email: user.email,
            password: user.password,
        });

        tracing::info!(user_id = %id, "Created user");
        Ok(id)
    }

    async fn update(&self, id: ObjectId, changes: UserChanges) -> UserResult<()> {
        let mut users = self.users.write().await;
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            changes.apply_to(user);
            tracing::info!(user_id = %id, "Updated user");
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> UserResult<()> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() < before {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::cheap_hashing;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password: cheap_hashing().hash("pw").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let repo = InMemoryUserRepository::new();
        let id = repo.insert(new_user("ada", "ada@example.com")).await.unwrap();

        let user = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.name, "ada");
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_list_ids_keeps_insertion_order() {
        let repo = InMemoryUserRepository::new();
        let a = repo.insert(new_user("a", "a@x")).await.unwrap();
        let b = repo.insert(new_user("b", "b@x")).await.unwrap();
        let c = repo.insert(new_user("c", "c@x")).await.unwrap();

        assert_eq!(repo.list_ids().await.unwrap(), vec![a, b, c]);
    }

    #[tokio::test]
    async fn test_exists_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.insert(new_user("Ada", "Ada@example.com")).await.unwrap();

        assert!(repo.exists_by_name("Ada").await.unwrap());
        assert!(!repo.exists_by_name("ada").await.unwrap());
        assert!(repo.exists_by_email("Ada@example.com").await.unwrap());
        assert!(!repo.exists_by_email("ada@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_user_is_noop() {
        let repo = InMemoryUserRepository::new();
        let changes = UserChanges {
            name: Some("x".into()),
            ..Default::default()
        };
        repo.update(ObjectId::new(), changes).await.unwrap();
        assert!(repo.list_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_only_target() {
        let repo = InMemoryUserRepository::new();
        let a = repo.insert(new_user("a", "a@x")).await.unwrap();
        let b = repo.insert(new_user("b", "b@x")).await.unwrap();

        repo.delete(a).await.unwrap();
        repo.delete(a).await.unwrap();

        assert_eq!(repo.list_ids().await.unwrap(), vec![b]);
    }
}
