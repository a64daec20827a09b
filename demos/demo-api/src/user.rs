use crate::auth::Session;
use crate::model::User;
use crate::store::UserStore;
use std::sync::Arc;
use thiserror::Error;
use wirebind::describe_fn;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("display name must not be empty")]
    EmptyName,
}

#[describe_fn]
pub async fn get(store: Arc<UserStore>, id: u64) -> Option<User> {
    store.get(id).await
}

/// Create a user managed by the caller, when the caller exists
#[describe_fn]
pub async fn create(
    session: &Session,
    store: &UserStore,
    name: &str,
    email: Option<String>,
) -> Result<User, UserError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(UserError::EmptyName);
    }
    let manager = store
        .get_by_name(&session.user)
        .await
        .map(Box::new);
    let user = store
        .insert(User {
            id: 0,
            display_name: name.to_string(),
            email,
            tags: Vec::new(),
            manager,
        })
        .await;
    tracing::info!(id = user.id, created_by = %session.user, "Created user");
    Ok(user)
}

#[describe_fn]
pub fn whoami(session: &Session) -> String {
    session.user.clone()
}

#[describe_fn]
pub async fn clear(store: Arc<UserStore>) {
    store.clear().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user: &str) -> Session {
        Session { user: user.into() }
    }

    #[tokio::test]
    async fn test_create_links_manager() {
        let store = UserStore::new();
        let boss = create(&session("root"), &store, "ada", None).await.unwrap();
        assert_eq!(boss.id, 1);
        assert!(boss.manager.is_none());

        let report = create(&session("ada"), &store, " grace ", Some("g@x.io".into()))
            .await
            .unwrap();
        assert_eq!(report.display_name, "grace");
        assert_eq!(report.manager.as_deref(), Some(&boss));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let store = UserStore::new();
        assert!(matches!(
            create(&session("ada"), &store, "  ", None).await,
            Err(UserError::EmptyName)
        ));
        assert!(store.is_empty().await);
    }
}
