//! Principal resolution: verified credential subject -> live user record.

use std::sync::Arc;

use thiserror::Error;

use quillgate_auth::Principal;
use quillgate_core::{StoreError, UserId};

use crate::store::UserStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The credential is valid but the user no longer exists.
    #[error("principal not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct PrincipalResolver {
    users: Arc<dyn UserStore>,
}

impl PrincipalResolver {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Look the subject up on every call; there is no principal cache, so role
    /// changes and deletions take effect on the next request.
    pub async fn resolve(&self, id: UserId) -> Result<Principal, ResolveError> {
        self.users
            .get(id)
            .await?
            .map(Principal::from)
            .ok_or(ResolveError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quillgate_auth::{NewUser, Role};

    use crate::InMemoryUserStore;

    #[tokio::test]
    async fn resolves_live_users_only() {
        let store = Arc::new(InMemoryUserStore::new());
        let user = NewUser::new("a@example.com", "A", Role::Admin, "$h")
            .unwrap()
            .into_user(UserId::new(), Utc::now());
        let id = user.id;
        store.insert(user).await.unwrap();

        let resolver = PrincipalResolver::new(store.clone());
        let first = resolver.resolve(id).await.unwrap();
        let second = resolver.resolve(id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.role, Role::Admin);

        store.delete(id).await.unwrap();
        assert_eq!(resolver.resolve(id).await, Err(ResolveError::NotFound));
    }
}
