//! In-memory session store — one flow controller per onboarding session.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::controller::{OnboardingFlowController, OnboardingSnapshot};
use super::notify::{Notice, NoticeLog, RouteLog};
use super::processing::ProcessingStatus;
use crate::error::SessionError;

/// A hosted onboarding session and the collaborators wired into it.
pub struct Session {
    pub controller: OnboardingFlowController,
    pub processing: ProcessingStatus,
    pub created_at: DateTime<Utc>,
    notices: NoticeLog,
    routes: RouteLog,
}

impl Session {
    fn new() -> Self {
        let notices = NoticeLog::new();
        let routes = RouteLog::new();
        let controller =
            OnboardingFlowController::new(Arc::new(notices.clone()), Arc::new(routes.clone()));
        Self {
            controller,
            processing: ProcessingStatus::default(),
            created_at: Utc::now(),
            notices,
            routes,
        }
    }

    /// Build the response view, draining notices raised since the last one.
    fn view(&self, id: Uuid) -> SessionView {
        SessionView {
            id,
            created_at: self.created_at,
            snapshot: self.controller.snapshot(),
            processing: self.processing.clone(),
            notices: self.notices.drain(),
            redirect: self.routes.last(),
        }
    }
}

/// What clients see of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: OnboardingSnapshot,
    pub processing: ProcessingStatus,
    pub notices: Vec<Notice>,
    /// Route the client should move to, once onboarding has completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// All live sessions, keyed by id.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Start a new session on the profile step.
    pub async fn create(&self) -> SessionView {
        let id = Uuid::new_v4();
        let session = Session::new();
        let view = session.view(id);
        self.sessions.write().await.insert(id, session);
        info!(session_id = %id, "Onboarding session created");
        view
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, SessionError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(|s| s.view(id))
            .ok_or(SessionError::NotFound { id })
    }

    /// Run `f` against a session while holding the store's write lock.
    pub async fn with_session<F, R>(&self, id: Uuid, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(SessionError::NotFound { id })?;
        Ok(f(session))
    }

    /// Discard a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Onboarding session discarded");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::step::Step;

    #[tokio::test]
    async fn create_view_and_remove() {
        let store = SessionStore::new();
        let created = store.create().await;
        assert_eq!(created.snapshot.current_step, Step::Profile);
        assert_eq!(store.len().await, 1);

        let viewed = store.view(created.id).await.unwrap();
        assert_eq!(viewed.id, created.id);
        assert_eq!(viewed.processing, ProcessingStatus::Idle);
        assert!(viewed.redirect.is_none());

        assert!(store.remove(created.id).await);
        assert!(!store.remove(created.id).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            store.view(id).await,
            Err(SessionError::NotFound { .. })
        ));
        assert!(store.with_session(id, |_| ()).await.is_err());
    }

    #[tokio::test]
    async fn notices_are_drained_into_the_next_view() {
        let store = SessionStore::new();
        let id = store.create().await.id;

        let advanced = store
            .with_session(id, |s| s.controller.advance())
            .await
            .unwrap();
        assert!(!advanced);

        let first = store.view(id).await.unwrap();
        assert_eq!(first.notices.len(), 1);
        assert!(first.snapshot.errors.contains_key("schoolName"));

        let second = store.view(id).await.unwrap();
        assert!(second.notices.is_empty());
    }
}
