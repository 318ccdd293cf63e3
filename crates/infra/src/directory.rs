use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use quillgate_audit::{ActorDirectory, ActorSummary};
use quillgate_core::{StoreError, UserId};

use crate::store::UserStore;

/// Actor lookups for the log query service, backed by the user store.
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<dyn UserStore>,
}

impl UserDirectory {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl ActorDirectory for UserDirectory {
    async fn actors(&self, ids: &[UserId]) -> Result<HashMap<UserId, ActorSummary>, StoreError> {
        let users = self.users.get_many(ids).await?;
        Ok(users
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    ActorSummary {
                        id: u.id,
                        name: u.name,
                        email: u.email,
                        role: u.role,
                    },
                )
            })
            .collect())
    }
}
