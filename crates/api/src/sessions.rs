//! In-memory store of import sessions awaiting commit.
//!
//! Sessions live only as long as the process; nothing here is persisted.

use std::collections::HashMap;
use std::time::Duration;

use crm_core::import::{ImportPhase, ImportSession};
use tokio::sync::RwLock;
use uuid::Uuid;

pub struct ImportSessionStore {
    sessions: RwLock<HashMap<Uuid, ImportSession>>,
    ttl: Duration,
}

impl ImportSessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Store a new session under a fresh id. Expired sessions are purged
    /// first.
    pub async fn create(&self, session: ImportSession) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        let purged = purge(&mut sessions, self.ttl);
        if purged > 0 {
            tracing::debug!(purged, "Purged expired import sessions");
        }
        sessions.insert(id, session);
        id
    }

    /// Run `f` against the session under the write lock.
    ///
    /// Returns `None` when no session has this id. Transitions made inside
    /// `f` are atomic with respect to every other request.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut ImportSession) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&id).map(f)
    }

    /// Run `f` against the session under the read lock.
    pub async fn view<R>(&self, id: Uuid, f: impl FnOnce(&ImportSession) -> R) -> Option<R> {
        let sessions = self.sessions.read().await;
        sessions.get(&id).map(f)
    }

    /// Drop sessions idle longer than the TTL. Sessions mid-commit are kept.
    pub async fn purge_expired(&self) -> usize {
        purge(&mut *self.sessions.write().await, self.ttl)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

fn purge(sessions: &mut HashMap<Uuid, ImportSession>, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| {
        session.phase() == ImportPhase::Committing || session.last_touched().elapsed() <= ttl
    });
    before - sessions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::import::{EntityKind, PreviewError, UploadedFile};

    #[tokio::test]
    async fn create_then_view() {
        let store = ImportSessionStore::new(Duration::from_secs(60));
        let id = store.create(ImportSession::new(EntityKind::Lead)).await;
        assert_eq!(store.view(id, |s| s.entity()).await, Some(EntityKind::Lead));
        assert_eq!(store.view(Uuid::new_v4(), |s| s.entity()).await, None);
    }

    #[tokio::test]
    async fn update_applies_transition() {
        let store = ImportSessionStore::new(Duration::from_secs(60));
        let id = store.create(ImportSession::new(EntityKind::Company)).await;
        let file = UploadedFile::new("a.csv", b"name\nAcme\n".to_vec());
        store.update(id, |s| s.select_file(file)).await.unwrap().unwrap();
        assert_eq!(store.view(id, |s| s.phase()).await, Some(ImportPhase::FileSelected));
    }

    #[tokio::test]
    async fn expired_sessions_purged_on_create() {
        let store = ImportSessionStore::new(Duration::ZERO);
        let old = store.create(ImportSession::new(EntityKind::Company)).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        let fresh = store.create(ImportSession::new(EntityKind::Company)).await;
        assert_eq!(store.len().await, 1);
        assert!(store.view(old, |_| ()).await.is_none());
        assert!(store.view(fresh, |_| ()).await.is_some());
    }

    #[tokio::test]
    async fn committing_sessions_survive_purge() {
        let store = ImportSessionStore::new(Duration::ZERO);
        let id = store.create(ImportSession::new(EntityKind::Company)).await;
        let file = UploadedFile::new("a.csv", b"Company Name\nAcme\n".to_vec());
        store
            .update(id, |s| -> Result<(), PreviewError> {
                s.preview(file)?;
                s.begin_commit()?;
                Ok(())
            })
            .await
            .unwrap()
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.purge_expired().await, 0);
        assert_eq!(store.len().await, 1);
    }
}
