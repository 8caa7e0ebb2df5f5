//! Session management
//!
//! One session per conversation. Each session's assistant sits behind a
//! `tokio::sync::Mutex` so utterances are handled to completion in order;
//! the map itself is a `DashMap` so handlers never hold a global lock.
//! Sessions do not survive a restart.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use uuid::Uuid;

use member_assist_agent::Assistant;

use crate::ServerError;

/// A live conversation
pub struct Session {
    pub id: String,
    pub assistant: Mutex<Assistant>,
    pub created_at: Instant,
    last_activity: RwLock<Instant>,
}

impl Session {
    fn new(id: String, assistant: Assistant) -> Self {
        let now = Instant::now();
        Self {
            id,
            assistant: Mutex::new(assistant),
            created_at: now,
            last_activity: RwLock::new(now),
        }
    }

    /// Mark activity (called per request)
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Seconds since the last request
    pub fn idle_seconds(&self) -> u64 {
        self.last_activity.read().elapsed().as_secs()
    }

    fn last_activity_at(&self) -> Instant {
        *self.last_activity.read()
    }
}

/// In-memory session map with a capacity bound
pub struct SessionManager {
    sessions: DashMap<String, Arc<Session>>,
    max_sessions: usize,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions,
        }
    }

    /// Create a session around the given assistant
    ///
    /// When the map is full, the longest-idle session is evicted first;
    /// if everything is busy the request is refused.
    pub fn create(&self, assistant: Assistant) -> Result<Arc<Session>, ServerError> {
        if self.sessions.len() >= self.max_sessions {
            self.evict_idlest()?;
        }

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Session::new(id.clone(), assistant));
        self.sessions.insert(id, session.clone());
        tracing::info!(session_id = %session.id, "Session created");
        Ok(session)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|s| s.clone())
    }

    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|s| s.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn evict_idlest(&self) -> Result<(), ServerError> {
        let idlest = self
            .sessions
            .iter()
            .min_by_key(|s| s.last_activity_at())
            .map(|s| s.key().clone());

        match idlest {
            Some(id) => {
                tracing::warn!(session_id = %id, "Session capacity reached, evicting idlest");
                self.sessions.remove(&id);
                Ok(())
            }
            None => Err(ServerError::SessionLimit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use member_assist_config::AgentConfig;
    use member_assist_persistence::{AppointmentLog, CustomerStore};
    use member_assist_text_processing::RuleBasedClassifier;

    fn test_assistant() -> Assistant {
        let classifier = Arc::new(RuleBasedClassifier::new());
        Assistant::new(
            &AgentConfig::default(),
            classifier.clone(),
            classifier,
            Arc::new(CustomerStore::new()),
            Arc::new(AppointmentLog::new()),
        )
    }

    #[test]
    fn test_create_get_remove() {
        let manager = SessionManager::new(10);
        let session = manager.create(test_assistant()).unwrap();

        assert!(manager.get(&session.id).is_some());
        assert_eq!(manager.len(), 1);

        assert!(manager.remove(&session.id));
        assert!(manager.get(&session.id).is_none());
    }

    #[test]
    fn test_capacity_evicts_idlest() {
        let manager = SessionManager::new(2);
        let first = manager.create(test_assistant()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = manager.create(test_assistant()).unwrap();

        // Keep the second session fresh, then overflow
        std::thread::sleep(std::time::Duration::from_millis(2));
        second.touch();
        let third = manager.create(test_assistant()).unwrap();

        assert_eq!(manager.len(), 2);
        assert!(manager.get(&third.id).is_some());
        assert!(manager.get(&second.id).is_some());
        assert!(manager.get(&first.id).is_none());
    }
}
