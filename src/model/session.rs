//! Durable session storage: bearer token plus cached user profile
//!
//! The session is persisted to disk so restarts keep the user signed in, and
//! every change is broadcast on a watch channel so dependent subsystems can
//! react without polling.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use super::catalog::User;

const SESSION_FILE: &str = ".cache/session.json";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    token: Option<String>,
    user: Option<User>,
}

/// Shared session state with disk persistence and change notification.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<StoredSession>>,
    path: Arc<PathBuf>,
    changes: Arc<watch::Sender<Option<User>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_path(PathBuf::from(SESSION_FILE))
    }

    pub fn with_path(path: PathBuf) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            state: Arc::new(RwLock::new(StoredSession::default())),
            path: Arc::new(path),
            changes: Arc::new(tx),
        }
    }

    /// Load a previously persisted session, if any.
    pub async fn load_from_disk(&self) -> Result<()> {
        let path: &Path = self.path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let stored: StoredSession = serde_json::from_str(&content)?;
            let user = stored.user.clone();
            *self.state.write().await = stored;
            let _ = self.changes.send(user);
        }
        Ok(())
    }

    async fn save_to_disk(&self) -> Result<()> {
        let path: &Path = self.path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let state = self.state.read().await;
        let content = serde_json::to_string(&*state)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.token.is_some()
    }

    /// Subscribe to session changes. The receiver yields the current user
    /// (or `None` once signed out) on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.changes.subscribe()
    }

    pub async fn set_session(&self, token: String, user: Option<User>) {
        {
            let mut state = self.state.write().await;
            state.token = Some(token);
            state.user = user.clone();
        }
        if let Err(e) = self.save_to_disk().await {
            tracing::warn!(error = %e, "Failed to persist session");
        }
        let _ = self.changes.send(user);
    }

    /// Refresh the cached profile without touching the token.
    pub async fn set_user(&self, user: User) {
        {
            let mut state = self.state.write().await;
            state.user = Some(user.clone());
        }
        if let Err(e) = self.save_to_disk().await {
            tracing::warn!(error = %e, "Failed to persist session");
        }
        let _ = self.changes.send(Some(user));
    }

    /// Drop the session unconditionally (logout or confirmed expiry).
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            state.token = None;
            state.user = None;
        }
        if let Err(e) = self.save_to_disk().await {
            tracing::warn!(error = %e, "Failed to persist session");
        }
        let _ = self.changes.send(None);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            user_id: 7,
            username: "alice".into(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn set_and_clear_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));

        store.set_session("tok".into(), Some(test_user())).await;
        assert_eq!(store.token().await.as_deref(), Some("tok"));
        assert!(store.is_authenticated().await);

        store.clear().await;
        assert_eq!(store.token().await, None);
        assert_eq!(store.user().await, None);
    }

    #[tokio::test]
    async fn load_without_persisted_file_starts_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));

        store.load_from_disk().await.unwrap();
        assert_eq!(store.token().await, None);
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::with_path(path.clone());
        store.set_session("tok".into(), Some(test_user())).await;

        let reloaded = SessionStore::with_path(path);
        reloaded.load_from_disk().await.unwrap();
        assert_eq!(reloaded.token().await.as_deref(), Some("tok"));
        assert_eq!(reloaded.user().await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn changes_are_broadcast() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));
        let mut rx = store.subscribe();

        store.set_session("tok".into(), Some(test_user())).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().unwrap().username, "alice");

        store.clear().await;
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }
}
