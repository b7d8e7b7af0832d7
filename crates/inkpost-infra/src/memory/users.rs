use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkpost_core::domain::User;
use inkpost_core::error::RepoError;
use inkpost_core::ports::{BaseRepository, UserRepository};

/// User store backed by a `HashMap` behind an async `RwLock`.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if store.values().any(|u| u.name == user.name) {
            return Err(RepoError::Constraint("users.name already exists".to_string()));
        }
        if store.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("users.email already exists".to_string()));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.name == name).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_name_is_unique() {
        let repo = InMemoryUserRepository::new();
        repo.create(User::new("ada".into(), "ada@example.com".into(), "h".into()))
            .await
            .unwrap();

        let dup = repo
            .create(User::new("ada".into(), "other@example.com".into(), "h".into()))
            .await;
        assert!(matches!(dup, Err(RepoError::Constraint(_))));
        assert!(repo.find_by_name("ada").await.unwrap().is_some());
        assert!(repo.find_by_name("Ada").await.unwrap().is_none());
    }
}
