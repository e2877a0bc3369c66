use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::profile::wizard::ProfileWizard;

pub type SharedWizard = Arc<Mutex<ProfileWizard>>;

/// Open wizard sessions, one per user. Each session sits behind its own mutex so every
/// edit, step change and save for that user runs one at a time.
#[derive(Clone, Default)]
pub struct WizardSessions {
    inner: Arc<RwLock<HashMap<Uuid, SharedWizard>>>,
}

impl WizardSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh session for `owner`, replacing any previous one.
    pub async fn start(&self, owner: Uuid) -> SharedWizard {
        let wizard = Arc::new(Mutex::new(ProfileWizard::new(owner)));
        let replaced = self
            .inner
            .write()
            .await
            .insert(owner, Arc::clone(&wizard))
            .is_some();
        info!("Started profile wizard for user {owner} (replaced existing: {replaced})");
        wizard
    }

    pub async fn get(&self, owner: Uuid) -> Option<SharedWizard> {
        self.inner.read().await.get(&owner).cloned()
    }

    /// Drops the session. Returns whether one existed.
    pub async fn discard(&self, owner: Uuid) -> bool {
        self.inner.write().await.remove(&owner).is_some()
    }

    /// Drops the session only if it is still `wizard`. A session started while `wizard`
    /// was saving stays open.
    pub async fn discard_if_current(&self, owner: Uuid, wizard: &SharedWizard) -> bool {
        let mut sessions = self.inner.write().await;
        match sessions.get(&owner) {
            Some(current) if Arc::ptr_eq(current, wizard) => {
                sessions.remove(&owner);
                true
            }
            _ => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_replaces_previous_session() {
        let sessions = WizardSessions::new();
        let owner = Uuid::new_v4();
        let first = sessions.start(owner).await;
        first.lock().await.add_skill("Rust");

        let second = sessions.start(owner).await;
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.lock().await.document().skills.is_empty());
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_discard() {
        let sessions = WizardSessions::new();
        let owner = Uuid::new_v4();
        sessions.start(owner).await;
        assert!(sessions.get(owner).await.is_some());
        assert!(sessions.discard(owner).await);
        assert!(!sessions.discard(owner).await);
        assert!(sessions.get(owner).await.is_none());
    }

    #[tokio::test]
    async fn test_discard_if_current_keeps_newer_session() {
        let sessions = WizardSessions::new();
        let owner = Uuid::new_v4();
        let saving = sessions.start(owner).await;
        let fresh = sessions.start(owner).await;

        assert!(!sessions.discard_if_current(owner, &saving).await);
        let current = sessions.get(owner).await.unwrap();
        assert!(Arc::ptr_eq(&current, &fresh));

        assert!(sessions.discard_if_current(owner, &fresh).await);
        assert!(sessions.get(owner).await.is_none());
        assert!(!sessions.discard_if_current(owner, &fresh).await);
    }
}
