//! SessionStore - actor that owns the session map
//!
//! Processes commands via channels. The map holds each session behind its
//! own mutex, so a slow Oracle call in one session never blocks another.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::messages::{SessionCommand, SessionError, SessionResponse};
use super::state::{SessionState, SharedSession};
use crate::catalog::Catalog;
use crate::domain::SessionId;

/// Handle to send commands to the SessionStore
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionStore {
    /// Spawn a new SessionStore actor
    pub fn spawn() -> Self {
        debug!("SessionStore::spawn: called");
        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(actor_loop(rx));
        info!("SessionStore spawned");
        Self { tx }
    }

    /// Allocate a session with an empty journey and the given catalog snapshot
    pub async fn create(&self, catalog: Arc<Catalog>) -> SessionResponse<SessionId> {
        debug!("create: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Create {
                catalog,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::ChannelError)?;
        reply_rx.await.map_err(|_| SessionError::ChannelError)?
    }

    /// Look up a session
    pub async fn get(&self, id: &SessionId) -> SessionResponse<SharedSession> {
        debug!(%id, "get: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Get {
                id: id.clone(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::ChannelError)?;
        reply_rx.await.map_err(|_| SessionError::ChannelError)?
    }

    /// Remove a session; returns whether it existed
    pub async fn delete(&self, id: &SessionId) -> SessionResponse<bool> {
        debug!(%id, "delete: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Delete {
                id: id.clone(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::ChannelError)?;
        reply_rx.await.map_err(|_| SessionError::ChannelError)?
    }

    /// Number of live sessions
    pub async fn count(&self) -> SessionResponse<usize> {
        debug!("count: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Count { reply: reply_tx })
            .await
            .map_err(|_| SessionError::ChannelError)?;
        reply_rx.await.map_err(|_| SessionError::ChannelError)?
    }

    /// Shutdown the SessionStore
    pub async fn shutdown(&self) -> SessionResponse<()> {
        debug!("shutdown: called");
        self.tx
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| SessionError::ChannelError)
    }
}

async fn actor_loop(mut rx: mpsc::Receiver<SessionCommand>) {
    debug!("actor_loop: called");
    let mut sessions: HashMap<SessionId, SharedSession> = HashMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            SessionCommand::Create { catalog, reply } => {
                let id = SessionId::generate();
                debug!(%id, "actor_loop: Create command");
                let state = SessionState::new(id.clone(), catalog);
                sessions.insert(id.clone(), Arc::new(tokio::sync::Mutex::new(state)));
                info!(%id, live = sessions.len(), "Session started");
                let _ = reply.send(Ok(id));
            }

            SessionCommand::Get { id, reply } => {
                debug!(%id, "actor_loop: Get command");
                let result = sessions.get(&id).cloned().ok_or(SessionError::NotFound(id));
                let _ = reply.send(result);
            }

            SessionCommand::Delete { id, reply } => {
                debug!(%id, "actor_loop: Delete command");
                let existed = sessions.remove(&id).is_some();
                if existed {
                    info!(%id, live = sessions.len(), "Session removed");
                }
                let _ = reply.send(Ok(existed));
            }

            SessionCommand::Count { reply } => {
                debug!("actor_loop: Count command");
                let _ = reply.send(Ok(sessions.len()));
            }

            SessionCommand::Shutdown => {
                debug!("actor_loop: Shutdown command");
                break;
            }
        }
    }

    info!(remaining = sessions.len(), "SessionStore actor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_entries;
    use crate::domain::Lifecycle;

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::new(builtin_entries()))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SessionStore::spawn();
        let id = store.create(catalog()).await.unwrap();

        let session = store.get(&id).await.unwrap();
        let state = session.lock().await;
        assert_eq!(state.id, id);
        assert_eq!(state.lifecycle, Lifecycle::Building);
        assert!(state.journey.screens.is_empty());
        assert_eq!(state.catalog.names().len(), 5);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = SessionStore::spawn();
        let a = store.create(catalog()).await.unwrap();
        let b = store.create(catalog()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let store = SessionStore::spawn();
        let result = store.get(&SessionId::from("nope")).await;
        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = SessionStore::spawn();
        let id = store.create(catalog()).await.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert!(matches!(store.get(&id).await, Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mutation_is_visible_to_later_get() {
        let store = SessionStore::spawn();
        let id = store.create(catalog()).await.unwrap();

        {
            let session = store.get(&id).await.unwrap();
            session.lock().await.journey.journey_name = "KYC".to_string();
        }

        let session = store.get(&id).await.unwrap();
        assert_eq!(session.lock().await.journey.journey_name, "KYC");
    }

    #[tokio::test]
    async fn test_shutdown_closes_channel() {
        let store = SessionStore::spawn();
        store.shutdown().await.unwrap();
        tokio::task::yield_now().await;
        let result = store.create(catalog()).await;
        assert!(matches!(result, Err(SessionError::ChannelError)));
    }
}
