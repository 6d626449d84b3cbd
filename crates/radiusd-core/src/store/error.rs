//! Errors reported by policy and session stores

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Generic backend failure (connection, timeout, injected fault)
    #[error("Backend error: {0}")]
    Backend(String),

    /// No session row matches the (session id, user, NAS) triple
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Policy data violates an invariant (e.g. half a DNS pair)
    #[error("Invalid policy data: {0}")]
    InvalidPolicy(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
