//! RADIUS AAA decision core
//!
//! Decides Access-Requests (PAP and CHAP against per-user policy, with a
//! simultaneous-use limit and vendor attributes on accept) and drives the
//! Accounting Start / Interim-Update / Stop session lifecycle against a
//! transactional session store.
//!
//! Every request ends in a [`Disposition`]: a signed response packet, or a
//! silent drop with the [`DropReason`] that caused it.
//!
//! # Example
//!
//! ```rust
//! use radiusd_core::{
//!     AccountingEngine, AuthEngine, ChannelUsageQueue, EngineOptions, MemoryStore,
//!     RequestHandler, UserPolicy,
//! };
//! use radiusd_proto::{Attribute, AttributeType, Code, Packet, encrypt_user_password};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::from_users(&[UserPolicy::new("bob", "secret")])?;
//! let (usage, _records) = ChannelUsageQueue::new();
//! let options = EngineOptions::default();
//! let handler = RequestHandler::new(
//!     AuthEngine::new(Arc::new(store.clone()), options),
//!     AccountingEngine::new(Arc::new(store.clone()), Arc::new(store), Arc::new(usage), options),
//! );
//!
//! let authenticator = [7u8; 16];
//! let hidden = encrypt_user_password(b"secret", b"testing123", &authenticator)?;
//! let request = Packet::new(Code::AccessRequest, 1, authenticator)
//!     .with_attribute(Attribute::string(AttributeType::UserName.as_u8(), "bob")?)
//!     .with_attribute(Attribute::new(AttributeType::UserPassword.as_u8(), hidden)?);
//!
//! let disposition = handler.handle(&request, b"testing123").await;
//! assert_eq!(disposition.response().map(|p| p.code), Some(Code::AccessAccept));
//! # Ok(())
//! # }
//! ```

pub mod accounting;
pub mod attrs;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod model;
pub mod request;
pub mod store;
pub mod usage;
pub mod vendor;

pub use accounting::{AccountingEngine, AcctAck};
pub use auth::{AuthEngine, AuthOutcome, RejectReason};
pub use config::{Config, ConfigError, EngineOptions, StoreBackend, StoreConfig, UsageNotify};
pub use dispatch::{Disposition, RequestHandler};
pub use error::DropReason;
pub use model::{
    DnsPair, NewSession, PolicyLimits, Session, SessionCounters, SessionKey, SessionSnapshot,
    TerminalRecord, UserPolicy,
};
pub use request::{AccessRequest, AccountingRequest, AcctEvent, Credentials, ValidationError};
pub use store::{
    MemoryStore, PgStore, PolicyStore, PostgresConfig, SessionStore, SessionTransaction,
    StoreError,
};
pub use usage::{ChannelUsageQueue, UsageQueue, UsageRecord};
pub use vendor::policy_attributes;
