//! Request routing and the respond-or-drop outcome

use crate::accounting::AccountingEngine;
use crate::auth::AuthEngine;
use crate::config::{Config, ConfigError, EngineOptions, StoreBackend};
use crate::error::DropReason;
use crate::store::{MemoryStore, PgStore, PolicyStore, SessionStore};
use crate::usage::UsageQueue;
use radiusd_proto::{Code, Packet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of handling one request
#[derive(Debug)]
pub enum Disposition {
    /// Signed response to send back to the NAS
    Responded(Packet),
    /// Nothing goes on the wire
    Dropped(DropReason),
}

impl Disposition {
    pub fn response(&self) -> Option<&Packet> {
        match self {
            Disposition::Responded(packet) => Some(packet),
            Disposition::Dropped(_) => None,
        }
    }

    pub fn drop_reason(&self) -> Option<&DropReason> {
        match self {
            Disposition::Responded(_) => None,
            Disposition::Dropped(reason) => Some(reason),
        }
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Disposition::Dropped(_))
    }
}

/// Routes Access-Request and Accounting-Request to their engines
pub struct RequestHandler {
    auth: AuthEngine,
    accounting: AccountingEngine,
}

impl RequestHandler {
    pub fn new(auth: AuthEngine, accounting: AccountingEngine) -> Self {
        RequestHandler { auth, accounting }
    }

    /// Build both engines over the store selected in `config`
    pub async fn from_config(
        config: &Config,
        usage: Arc<dyn UsageQueue>,
    ) -> Result<Self, ConfigError> {
        let options = EngineOptions::from_config(config);

        let (policies, sessions): (Arc<dyn PolicyStore>, Arc<dyn SessionStore>) =
            match config.store.backend {
                StoreBackend::Memory => {
                    let store = MemoryStore::from_users(&config.users)?;
                    info!(users = config.users.len(), "Using in-memory store");
                    (Arc::new(store.clone()), Arc::new(store))
                }
                StoreBackend::Postgres => {
                    let settings = config.store.postgres.as_ref().ok_or_else(|| {
                        ConfigError::Invalid(
                            "store.postgres is required for the postgres backend".to_string(),
                        )
                    })?;
                    if !config.users.is_empty() {
                        warn!("Configured users are ignored by the postgres backend");
                    }
                    let store = PgStore::connect(settings).await?;
                    (Arc::new(store.clone()), Arc::new(store))
                }
            };

        Ok(Self::new(
            AuthEngine::new(Arc::clone(&policies), options),
            AccountingEngine::new(policies, sessions, usage, options),
        ))
    }

    pub async fn handle(&self, request: &Packet, secret: &[u8]) -> Disposition {
        match request.code {
            Code::AccessRequest => self.auth.handle(request, secret).await,
            Code::AccountingRequest => self.accounting.handle(request, secret).await,
            other => {
                warn!(packet_type = ?other, "Unsupported packet type");
                Disposition::Dropped(DropReason::UnsupportedCode(other))
            }
        }
    }

    /// Decode, handle and encode; `None` means send nothing
    pub async fn handle_datagram(&self, data: &[u8], secret: &[u8]) -> Option<Vec<u8>> {
        let request = match Packet::decode(data) {
            Ok(packet) => packet,
            Err(e) => {
                debug!(error = %e, len = data.len(), "Discarding undecodable datagram");
                return None;
            }
        };

        let response = self.handle(&request, secret).await.response()?.encode();
        match response {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "Failed to encode response");
                None
            }
        }
    }
}
