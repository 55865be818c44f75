use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::users::{
    repo::UserStore,
    repo_types::{NewUser, User, UserChanges},
};

/// In-process store with the same soft-delete rules as the postgres one.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw row lookup, including soft-deleted rows.
    pub fn raw(&self, id: i64) -> Option<User> {
        let rows = self.rows.lock().unwrap();
        rows.iter().find(|u| u.id == id).cloned()
    }
}

fn apply(changes: UserChanges, user: &mut User) {
    if let Some(v) = changes.name {
        user.name = v;
    }
    if let Some(v) = changes.email {
        user.email = v;
    }
    if let Some(v) = changes.address {
        user.address = v;
    }
    if let Some(v) = changes.age {
        user.age = v;
    }
    if let Some(v) = changes.phone_number {
        user.phone_number = v;
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = self.rows.lock().unwrap();
        let mut live: Vec<User> = rows.iter().filter(|u| u.deleted_at.is_none()).cloned().collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(live)
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn create(&self, new: NewUser) -> anyhow::Result<User> {
        let mut rows = self.rows.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: rows.len() as i64 + 1,
            name: new.name,
            email: new.email,
            address: new.address,
            age: new.age,
            phone_number: new.phone_number,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> anyhow::Result<Option<User>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(user) = rows
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        else {
            return Ok(None);
        };
        apply(changes, user);
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn soft_delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        {
            Some(user) => {
                let now = OffsetDateTime::now_utc();
                user.deleted_at = Some(now);
                user.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: "a@b.com".into(),
            address: "Valid Address".into(),
            age: 24,
            phone_number: "+15551234567".into(),
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_list_is_newest_first() {
        let store = MemoryUserStore::new();
        let a = store.create(new_user("first")).await.unwrap();
        let b = store.create(new_user("second")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);

        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn soft_delete_hides_row_but_keeps_it() {
        let store = MemoryUserStore::new();
        let u = store.create(new_user("gone")).await.unwrap();

        assert!(store.soft_delete(u.id).await.unwrap());
        assert!(!store.soft_delete(u.id).await.unwrap());
        assert!(store.find(u.id).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.update(u.id, UserChanges::default()).await.unwrap().is_none());

        let raw = store.raw(u.id).expect("row still present");
        assert!(raw.deleted_at.is_some());
    }

    #[tokio::test]
    async fn update_writes_only_provided_fields() {
        let store = MemoryUserStore::new();
        let u = store.create(new_user("before")).await.unwrap();
        let changes = UserChanges {
            name: Some("after".into()),
            age: Some(0),
            ..Default::default()
        };
        let updated = store.update(u.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.name, "after");
        assert_eq!(updated.age, 0);
        assert_eq!(updated.email, u.email);
        assert_eq!(updated.created_at, u.created_at);
        assert!(updated.updated_at >= u.updated_at);
    }
}
