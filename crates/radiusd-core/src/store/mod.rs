//! Policy and session store interfaces
//!
//! The engines never own durable state. Everything they read or mutate goes
//! through the traits below:
//!
//! - [`PolicyStore`]: per-user policy lookup and open-session counting
//! - [`SessionStore`]: session creation (Accounting-Start) and transactions
//! - [`SessionTransaction`]: the counter overwrite / terminal log / remove
//!   sequence of Interim-Update and Stop, applied all-or-nothing
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: in-process tables, for single-node use and tests
//! - [`PgStore`]: PostgreSQL via sqlx

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::{PgStore, PostgresConfig};

use crate::model::{NewSession, PolicyLimits, SessionKey, SessionSnapshot};
use async_trait::async_trait;

/// Read-only access to user policy
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// `Ok(None)` when the user does not exist
    async fn lookup_policy(&self, user: &str) -> Result<Option<PolicyLimits>, StoreError>;

    /// Number of sessions currently open for `user`
    async fn count_open_sessions(&self, user: &str) -> Result<u32, StoreError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a session with zeroed counters.
    ///
    /// An existing row with the same key is overwritten.
    async fn create_session(&self, session: &NewSession) -> Result<(), StoreError>;

    async fn begin(&self) -> Result<Box<dyn SessionTransaction>, StoreError>;
}

/// A unit of work over the session table.
///
/// Nothing is visible to other readers until [`commit`](Self::commit)
/// succeeds; dropping the transaction discards every staged mutation.
#[async_trait]
pub trait SessionTransaction: Send {
    /// Overwrite the counters of the session matching `snapshot.key`.
    ///
    /// A missing row is left missing.
    async fn update_session(&mut self, snapshot: &SessionSnapshot) -> Result<(), StoreError>;

    /// Append a terminal record for the session to the audit log
    async fn log_terminal_session(&mut self, key: &SessionKey) -> Result<(), StoreError>;

    /// Delete the session row; [`StoreError::SessionNotFound`] when absent
    async fn remove_session(&mut self, key: &SessionKey) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
