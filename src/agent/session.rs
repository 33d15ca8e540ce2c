//! Conversation sessions.

use super::events::{Content, Event};
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A conversation keyed by application and user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub app_name: String,
    pub user_id: String,
    pub state: Map<String, Value>,
    pub events: Vec<Event>,
    pub last_update_time: DateTime<Utc>,
}

impl Session {
    /// Contents of all events, oldest first.
    pub fn contents(&self) -> Vec<Content> {
        self.events
            .iter()
            .filter_map(|e| e.content.clone())
            .collect()
    }
}

/// Storage for sessions.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Create a new session with initial state.
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        state: Map<String, Value>,
    ) -> Result<Session>;

    /// Fetch a session snapshot.
    async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<Session>>;

    /// Append an event to a session's history.
    async fn append_event(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        event: Event,
    ) -> Result<()>;

    /// Drop a session.
    async fn delete_session(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<()>;
}

type SessionKey = (String, String, String);

fn key(app_name: &str, user_id: &str, session_id: &str) -> SessionKey {
    (app_name.to_string(), user_id.to_string(), session_id.to_string())
}

/// Sessions held in process memory; nothing survives exit.
#[derive(Default)]
pub struct InMemorySessionService {
    sessions: Mutex<HashMap<SessionKey, Session>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        state: Map<String, Value>,
    ) -> Result<Session> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            state,
            events: Vec::new(),
            last_update_time: Utc::now(),
        };

        self.sessions
            .lock()
            .await
            .insert(key(app_name, user_id, &session.id), session.clone());

        Ok(session)
    }

    async fn get_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<Session>> {
        Ok(self
            .sessions
            .lock()
            .await
            .get(&key(app_name, user_id, session_id))
            .cloned())
    }

    async fn append_event(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        event: Event,
    ) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&key(app_name, user_id, session_id))
            .ok_or_else(|| AgentError::Agent(format!("Session not found: {}", session_id)))?;

        session.last_update_time = event.timestamp;
        session.events.push(event);
        Ok(())
    }

    async fn delete_session(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<()> {
        self.sessions
            .lock()
            .await
            .remove(&key(app_name, user_id, session_id));
        Ok(())
    }
}
