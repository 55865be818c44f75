use std::sync::Arc;

use crate::users::repo::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool) -> Self {
        Self::from_store(Arc::new(PgUserStore::new(db)))
    }

    pub fn from_store(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    #[cfg(test)]
    pub fn fake() -> (Self, Arc<crate::users::memory::MemoryUserStore>) {
        let store = Arc::new(crate::users::memory::MemoryUserStore::new());
        (Self::from_store(store.clone()), store)
    }
}
