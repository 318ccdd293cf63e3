//! In-memory stores for tests/dev. Not optimized for performance.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use quillgate_audit::{AuditEntry, AuditLog, LogFilter, PageRequest};
use quillgate_auth::{normalize_email, Role, User};
use quillgate_content::ContentItem;
use quillgate_core::{ContentId, StoreError, UserId};

use super::{ContentStore, UserStore};

fn poisoned() -> StoreError {
    StoreError::unavailable("in-memory store lock poisoned")
}

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut map = self.users.write().map_err(|_| poisoned())?;
        let email = normalize_email(&user.email);
        if map.values().any(|u| u.email == email) {
            return Err(StoreError::conflict(format!("email already registered: {email}")));
        }
        if map.contains_key(&user.id) {
            return Err(StoreError::conflict(format!("duplicate user id: {}", user.id)));
        }
        map.insert(user.id, User { email, ..user });
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let map = self.users.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = normalize_email(email);
        let map = self.users.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let map = self.users.read().map_err(|_| poisoned())?;
        let mut users: Vec<User> = map.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let map = self.users.read().map_err(|_| poisoned())?;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn update_role(
        &self,
        id: UserId,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let mut map = self.users.write().map_err(|_| poisoned())?;
        Ok(map.get_mut(&id).map(|user| {
            user.role = role;
            user.updated_at = now;
            user.clone()
        }))
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let mut map = self.users.write().map_err(|_| poisoned())?;
        Ok(map.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    items: RwLock<HashMap<ContentId, ContentItem>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn insert(&self, item: ContentItem) -> Result<(), StoreError> {
        let mut map = self.items.write().map_err(|_| poisoned())?;
        if map.contains_key(&item.id) {
            return Err(StoreError::conflict(format!("duplicate content id: {}", item.id)));
        }
        map.insert(item.id, item);
        Ok(())
    }

    async fn get(&self, id: ContentId) -> Result<Option<ContentItem>, StoreError> {
        let map = self.items.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<ContentItem>, StoreError> {
        let map = self.items.read().map_err(|_| poisoned())?;
        let mut items: Vec<ContentItem> = map.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn update(&self, item: ContentItem) -> Result<(), StoreError> {
        let mut map = self.items.write().map_err(|_| poisoned())?;
        match map.get_mut(&item.id) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: ContentId) -> Result<bool, StoreError> {
        let mut map = self.items.write().map_err(|_| poisoned())?;
        Ok(map.remove(&id).is_some())
    }
}

/// Append-only in-memory audit log.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.push(entry);
        Ok(())
    }

    async fn query(
        &self,
        filter: &LogFilter,
        page: PageRequest,
    ) -> Result<(Vec<AuditEntry>, u64), StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        let mut hits: Vec<&AuditEntry> = entries.iter().filter(|e| filter.matches(e)).collect();
        // Ids are UUIDv7, so they break timestamp ties in insertion order.
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

        let total = hits.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let slice = hits.into_iter().skip(offset).take(limit).cloned().collect();
        Ok((slice, total))
    }

    async fn entries_since(&self, since: DateTime<Utc>) -> Result<Vec<AuditEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.iter().filter(|e| e.created_at >= since).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quillgate_audit::{AuditAction, AuditMetadata};
    use quillgate_auth::NewUser;
    use quillgate_content::NewContent;

    fn user(email: &str) -> User {
        NewUser::new(email, "Someone", Role::Viewer, "$hash")
            .unwrap()
            .into_user(UserId::new(), Utc::now())
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let store = InMemoryUserStore::new();
        store.insert(user("a@example.com")).await.unwrap();

        let mut dup = user("a@example.com");
        dup.email = "A@Example.com".to_string();
        assert!(matches!(store.insert(dup).await, Err(StoreError::Conflict(_))));

        assert!(store.find_by_email(" A@EXAMPLE.COM ").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_role_and_delete() {
        let store = InMemoryUserStore::new();
        let u = user("b@example.com");
        let id = u.id;
        store.insert(u).await.unwrap();

        let updated = store.update_role(id, Role::Editor, Utc::now()).await.unwrap().unwrap();
        assert_eq!(updated.role, Role::Editor);
        assert!(store.update_role(UserId::new(), Role::Admin, Utc::now()).await.unwrap().is_none());

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn content_list_is_newest_first_and_update_requires_existing() {
        let store = InMemoryContentStore::new();
        let author = UserId::new();
        let now = Utc::now();
        let older = NewContent::parse(Some("old"), Some("b"), None)
            .unwrap()
            .into_item(ContentId::new(), author, now - Duration::minutes(5));
        let newer = NewContent::parse(Some("new"), Some("b"), None)
            .unwrap()
            .into_item(ContentId::new(), author, now);
        store.insert(older.clone()).await.unwrap();
        store.insert(newer).await.unwrap();

        let titles: Vec<String> = store.list().await.unwrap().into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["new", "old"]);

        let ghost = NewContent::parse(Some("g"), Some("b"), None)
            .unwrap()
            .into_item(ContentId::new(), author, now);
        assert_eq!(store.update(ghost).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn audit_query_filters_and_pages() {
        let log = InMemoryAuditLog::new();
        let actor = UserId::new();
        let base = Utc::now();
        for i in 0..5 {
            let action = if i % 2 == 0 { AuditAction::UserLogin } else { AuditAction::UserLogout };
            log.append(AuditEntry::new(actor, action, AuditMetadata::new(), base + Duration::seconds(i)))
                .await
                .unwrap();
        }

        let filter = LogFilter { action: Some(AuditAction::UserLogin), actor_id: None };
        let (page, total) = log.query(&filter, PageRequest::new(Some(1), Some(2)).unwrap()).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].created_at, base + Duration::seconds(4));

        let recent = log.entries_since(base + Duration::seconds(3)).await.unwrap();
        assert_eq!(recent.len(), 2);
    }
}
