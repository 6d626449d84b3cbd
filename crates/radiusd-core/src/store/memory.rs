//! In-memory policy and session store

use super::{PolicyStore, SessionStore, SessionTransaction, StoreError};
use crate::model::{
    NewSession, PolicyLimits, Session, SessionKey, SessionSnapshot, TerminalRecord, UserPolicy,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store
///
/// Policies live in a `DashMap`; the session table and the terminal log share
/// one `tokio::sync::RwLock` so a transaction commit updates both under a
/// single write guard. Clones share the same underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    policies: Arc<DashMap<String, PolicyLimits>>,
    tables: Arc<RwLock<SessionTables>>,
}

#[derive(Debug, Default)]
struct SessionTables {
    sessions: HashMap<SessionKey, Session>,
    log: Vec<TerminalRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed policies from operator-supplied records
    pub fn from_users(users: &[UserPolicy]) -> Result<Self, StoreError> {
        let store = Self::new();
        for user in users {
            store.insert_policy(user.username.clone(), user.to_limits()?);
        }
        Ok(store)
    }

    pub fn insert_policy(&self, user: impl Into<String>, limits: PolicyLimits) {
        self.policies.insert(user.into(), limits);
    }

    pub async fn session(&self, key: &SessionKey) -> Option<Session> {
        self.tables.read().await.sessions.get(key).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    pub async fn terminal_log(&self) -> Vec<TerminalRecord> {
        self.tables.read().await.log.clone()
    }
}

#[async_trait]
impl PolicyStore for MemoryStore {
    async fn lookup_policy(&self, user: &str) -> Result<Option<PolicyLimits>, StoreError> {
        Ok(self.policies.get(user).map(|entry| entry.value().clone()))
    }

    async fn count_open_sessions(&self, user: &str) -> Result<u32, StoreError> {
        let tables = self.tables.read().await;
        let count = tables.sessions.keys().filter(|key| key.user == user).count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, session: &NewSession) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .sessions
            .insert(session.key.clone(), Session::open(session));
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn SessionTransaction>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            tables: Arc::clone(&self.tables),
            staged: Vec::new(),
        }))
    }
}

#[derive(Debug)]
enum StagedOp {
    Update(SessionSnapshot),
    Log(SessionKey),
    Remove(SessionKey),
}

/// Stages operations and applies them in place at commit. Removal is the
/// only step that can fail, so every staged removal is checked before the
/// first op is applied.
struct MemoryTransaction {
    tables: Arc<RwLock<SessionTables>>,
    staged: Vec<StagedOp>,
}

impl MemoryTransaction {
    fn removal_staged(&self, key: &SessionKey) -> bool {
        self.staged
            .iter()
            .any(|op| matches!(op, StagedOp::Remove(staged) if staged == key))
    }
}

impl SessionTables {
    fn check(&self, op: &StagedOp) -> Result<(), StoreError> {
        match op {
            StagedOp::Remove(key) if !self.sessions.contains_key(key) => {
                Err(StoreError::SessionNotFound(key.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn apply(&mut self, op: StagedOp) {
        match op {
            StagedOp::Update(snapshot) => {
                if let Some(session) = self.sessions.get_mut(&snapshot.key) {
                    session.apply(&snapshot);
                }
            }
            StagedOp::Log(key) => {
                if let Some(session) = self.sessions.get(&key) {
                    self.log.push(TerminalRecord {
                        session: session.clone(),
                        stopped_at: Utc::now(),
                    });
                }
            }
            StagedOp::Remove(key) => {
                self.sessions.remove(&key);
            }
        }
    }
}

#[async_trait]
impl SessionTransaction for MemoryTransaction {
    async fn update_session(&mut self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        self.staged.push(StagedOp::Update(snapshot.clone()));
        Ok(())
    }

    async fn log_terminal_session(&mut self, key: &SessionKey) -> Result<(), StoreError> {
        self.staged.push(StagedOp::Log(key.clone()));
        Ok(())
    }

    async fn remove_session(&mut self, key: &SessionKey) -> Result<(), StoreError> {
        let exists = self.tables.read().await.sessions.contains_key(key);
        if !exists || self.removal_staged(key) {
            return Err(StoreError::SessionNotFound(key.to_string()));
        }
        self.staged.push(StagedOp::Remove(key.clone()));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction { tables, staged } = *self;
        let mut tables = tables.write().await;
        for op in &staged {
            tables.check(op)?;
        }
        for op in staged {
            tables.apply(op);
        }
        Ok(())
    }
}
