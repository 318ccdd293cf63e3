//! Startup seeding.

use chrono::Utc;
use tracing::info;

use quillgate_auth::{hash_password, NewUser, Role};
use quillgate_core::{StoreError, UserId};

use crate::config::BootstrapAdmin;
use crate::store::UserStore;

/// Create the bootstrap admin unless a user already holds that email.
///
/// Returns `true` when a user was created. An existing account is left as is,
/// whatever its role.
pub async fn ensure_bootstrap_admin(
    users: &dyn UserStore,
    admin: &BootstrapAdmin,
) -> anyhow::Result<bool> {
    if users.find_by_email(&admin.email).await?.is_some() {
        info!(email = %admin.email, "bootstrap admin already present");
        return Ok(false);
    }

    let hash = hash_password(&admin.password)?;
    let user = NewUser::new(&admin.email, &admin.name, Role::Admin, hash)?
        .into_user(UserId::new(), Utc::now());

    match users.insert(user).await {
        Ok(()) => {
            info!(email = %admin.email, "bootstrap admin created");
            Ok(true)
        }
        // Another instance seeded it first.
        Err(StoreError::Conflict(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
