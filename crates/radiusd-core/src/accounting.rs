//! Accounting-Request processing and session lifecycle
//!
//! Per (Acct-Session-Id, User-Name, NAS-IP-Address):
//!
//! - **Start** opens a session row for a known user.
//! - **Interim-Update** overwrites the row's counters and notifies the usage
//!   queue, inside one store transaction.
//! - **Stop** overwrites the counters, appends a terminal log record, removes
//!   the row and notifies the usage queue, inside one store transaction.
//!
//! Any failure drops the request without a response and leaves the store as
//! it was. Accounting-On/Off are acknowledged without touching the store.

use crate::config::{EngineOptions, UsageNotify};
use crate::dispatch::Disposition;
use crate::error::DropReason;
use crate::model::{NewSession, SessionSnapshot};
use crate::request::{AccountingRequest, AcctEvent};
use crate::store::{PolicyStore, SessionStore};
use crate::usage::{UsageQueue, UsageRecord};
use radiusd_proto::{AcctStatusType, AttributeType, Code, Packet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What was done for an accepted Accounting-Request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcctAck {
    Started,
    Updated,
    Finished,
    /// Accounting-On / Accounting-Off
    Nas(AcctStatusType),
}

impl AcctAck {
    /// Reply-Message carried by the Accounting-Response
    pub fn reply_message(self) -> Option<&'static str> {
        match self {
            AcctAck::Updated => Some("Updated accounting."),
            AcctAck::Finished => Some("Finished accounting."),
            AcctAck::Started | AcctAck::Nas(_) => None,
        }
    }
}

pub struct AccountingEngine {
    policies: Arc<dyn PolicyStore>,
    sessions: Arc<dyn SessionStore>,
    usage: Arc<dyn UsageQueue>,
    options: EngineOptions,
}

impl AccountingEngine {
    pub fn new(
        policies: Arc<dyn PolicyStore>,
        sessions: Arc<dyn SessionStore>,
        usage: Arc<dyn UsageQueue>,
        options: EngineOptions,
    ) -> Self {
        AccountingEngine {
            policies,
            sessions,
            usage,
            options,
        }
    }

    pub async fn process(&self, packet: &Packet) -> Result<AcctAck, DropReason> {
        let request = AccountingRequest::from_packet(packet)?;

        match request.event {
            AcctEvent::Start(session) => self.start(session).await,
            AcctEvent::InterimUpdate(snapshot) => self.update(snapshot).await,
            AcctEvent::Stop(snapshot) => self.stop(snapshot).await,
            AcctEvent::Nas(status) => {
                let nas_ip = packet
                    .find_attribute(AttributeType::NasIpAddress.as_u8())
                    .and_then(|a| a.as_ipv4().ok());
                info!(status = %status, nas_ip = ?nas_ip, "NAS accounting state change");
                Ok(AcctAck::Nas(status))
            }
        }
    }

    async fn start(&self, session: NewSession) -> Result<AcctAck, DropReason> {
        let user = &session.key.user;
        match self.policies.lookup_policy(user).await? {
            Some(policy) if !policy.pass.is_empty() => {}
            _ => return Err(DropReason::UnknownUser(user.clone())),
        }

        self.sessions.create_session(&session).await?;

        info!(
            user = %user,
            session_id = %session.key.session_id,
            nas_ip = %session.key.nas_ip,
            framed_ip = %session.assigned_ip,
            "Session started"
        );
        Ok(AcctAck::Started)
    }

    async fn update(&self, snapshot: SessionSnapshot) -> Result<AcctAck, DropReason> {
        let mut txn = self.sessions.begin().await?;
        txn.update_session(&snapshot).await?;
        self.notify(UsageNotify::BeforeCommit, &snapshot);
        txn.commit().await?;
        self.notify(UsageNotify::AfterCommit, &snapshot);

        if self.options.verbose {
            debug!(
                user = %snapshot.key.user,
                session_id = %snapshot.key.session_id,
                bytes_in = snapshot.counters.bytes_in,
                bytes_out = snapshot.counters.bytes_out,
                session_time = snapshot.counters.session_time,
                "Session updated"
            );
        }
        Ok(AcctAck::Updated)
    }

    async fn stop(&self, snapshot: SessionSnapshot) -> Result<AcctAck, DropReason> {
        let mut txn = self.sessions.begin().await?;
        txn.update_session(&snapshot).await?;
        txn.log_terminal_session(&snapshot.key).await?;
        txn.remove_session(&snapshot.key).await?;
        self.notify(UsageNotify::BeforeCommit, &snapshot);
        txn.commit().await?;
        self.notify(UsageNotify::AfterCommit, &snapshot);

        info!(
            user = %snapshot.key.user,
            session_id = %snapshot.key.session_id,
            nas_ip = %snapshot.key.nas_ip,
            bytes_in = snapshot.counters.bytes_in,
            bytes_out = snapshot.counters.bytes_out,
            session_time = snapshot.counters.session_time,
            "Session finished"
        );
        Ok(AcctAck::Finished)
    }

    /// Enqueue usage if `point` is the configured notification point
    fn notify(&self, point: UsageNotify, snapshot: &SessionSnapshot) {
        if self.options.usage_notify == point {
            self.usage.enqueue(UsageRecord::from(snapshot));
        }
    }

    /// Process and build the signed Accounting-Response
    pub async fn handle(&self, packet: &Packet, secret: &[u8]) -> Disposition {
        let ack = match self.process(packet).await {
            Ok(ack) => ack,
            Err(reason) => {
                warn!(request_id = packet.identifier, error = %reason, "Dropping Accounting-Request");
                return Disposition::Dropped(reason);
            }
        };

        let response = match ack.reply_message() {
            Some(message) => {
                Packet::reply_with_message(packet, Code::AccountingResponse, message, secret)
            }
            None => Packet::reply_to(packet, Code::AccountingResponse, Vec::new(), secret),
        };

        match response {
            Ok(response) => Disposition::Responded(response),
            Err(e) => {
                warn!(error = %e, "Failed to encode Accounting-Response");
                Disposition::Dropped(DropReason::Encode(e))
            }
        }
    }
}
