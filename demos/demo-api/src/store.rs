//! In-memory user storage shared by every call

use crate::model::User;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use wirebind::Describe;

/// Never sent over the wire; handed to procedures by the dispatcher
#[derive(Debug, Default, Describe)]
#[describe(opaque)]
pub struct UserStore {
    users: RwLock<BTreeMap<u64, User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: u64) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn get_by_name(&self, name: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.display_name == name)
            .cloned()
    }

    /// Store `user` under the next free id and return the stored copy
    pub async fn insert(&self, mut user: User) -> User {
        let mut users = self.users.write().await;
        user.id = users.keys().next_back().map_or(1, |last| last + 1);
        users.insert(user.id, user.clone());
        user
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.users.write().await.clear();
    }
}
