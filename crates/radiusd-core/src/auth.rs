//! Access-Request decisions
//!
//! Checks run in a fixed order and the first failing one decides the
//! outcome:
//!
//! 1. request structure (failure: drop)
//! 2. policy lookup (store fault: drop; unknown user: reject)
//! 3. credentials, PAP or CHAP (reject)
//! 4. simultaneous-use limit (store fault: drop; at limit: reject)
//! 5. administrative enable flag (reject)
//!
//! The engine only reads from its [`PolicyStore`].

use crate::config::EngineOptions;
use crate::dispatch::Disposition;
use crate::error::DropReason;
use crate::request::{AccessRequest, Credentials, ValidationError};
use crate::store::PolicyStore;
use crate::vendor::policy_attributes;
use radiusd_proto::{
    Attribute, AttributeType, Code, Packet, decrypt_user_password, verify_chap_response,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoSuchUser,
    InvalidPassword,
    MaxConnsReached,
    /// Account disabled; worded like a credential failure on purpose
    Disabled,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::NoSuchUser => "No such user",
            RejectReason::InvalidPassword => "Invalid password",
            RejectReason::MaxConnsReached => "Max conns reached",
            RejectReason::Disabled => "Invalid user/pass",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Access-Accept with these attributes
    Accept(Vec<Attribute>),
    /// Access-Reject with the reason as Reply-Message
    Reject(RejectReason),
}

pub struct AuthEngine {
    policies: Arc<dyn PolicyStore>,
    options: EngineOptions,
}

impl AuthEngine {
    pub fn new(policies: Arc<dyn PolicyStore>, options: EngineOptions) -> Self {
        AuthEngine { policies, options }
    }

    pub async fn decide(&self, packet: &Packet, secret: &[u8]) -> Result<AuthOutcome, DropReason> {
        let request = AccessRequest::from_packet(packet)?;
        let user = request.user.as_str();

        if self.options.verbose {
            let method = match request.credentials {
                Credentials::Pap { .. } => "PAP",
                Credentials::Chap { .. } => "CHAP",
            };
            debug!(user = %user, nas_ip = ?request.nas_ip, method, "Access-Request");
        }

        let policy = match self.policies.lookup_policy(user).await? {
            Some(policy) if !policy.pass.is_empty() => policy,
            _ => return Ok(AuthOutcome::Reject(RejectReason::NoSuchUser)),
        };

        let valid = match &request.credentials {
            Credentials::Pap {
                cipher,
                authenticator,
            } => {
                let password = decrypt_user_password(cipher, secret, authenticator).map_err(|e| {
                    ValidationError::malformed(AttributeType::UserPassword, e.to_string())
                })?;
                password == policy.pass.as_bytes()
            }
            Credentials::Chap {
                response,
                challenge,
            } => verify_chap_response(response, policy.pass.as_bytes(), challenge),
        };
        if !valid {
            return Ok(AuthOutcome::Reject(RejectReason::InvalidPassword));
        }

        let open = self.policies.count_open_sessions(user).await?;
        if open >= policy.simultaneous_use {
            if self.options.verbose {
                debug!(
                    user = %user,
                    open,
                    limit = policy.simultaneous_use,
                    "Simultaneous-use limit reached"
                );
            }
            return Ok(AuthOutcome::Reject(RejectReason::MaxConnsReached));
        }

        if !policy.ok {
            return Ok(AuthOutcome::Reject(RejectReason::Disabled));
        }

        Ok(AuthOutcome::Accept(policy_attributes(&policy)))
    }

    /// Decide and build the signed Access-Accept or Access-Reject
    pub async fn handle(&self, packet: &Packet, secret: &[u8]) -> Disposition {
        let outcome = match self.decide(packet, secret).await {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!(request_id = packet.identifier, error = %reason, "Dropping Access-Request");
                return Disposition::Dropped(reason);
            }
        };

        let user = packet
            .find_attribute(AttributeType::UserName.as_u8())
            .and_then(|a| a.as_string().ok())
            .unwrap_or_default();

        let response = match outcome {
            AuthOutcome::Accept(attributes) => {
                info!(user = %user, attributes = attributes.len(), "Access-Accept");
                Packet::reply_to(packet, Code::AccessAccept, attributes, secret)
            }
            AuthOutcome::Reject(reason) => {
                info!(user = %user, reason = %reason, "Access-Reject");
                Packet::reply_with_message(packet, Code::AccessReject, &reason.to_string(), secret)
            }
        };

        match response {
            Ok(response) => Disposition::Responded(response),
            Err(e) => {
                warn!(user = %user, error = %e, "Failed to encode Access response");
                Disposition::Dropped(DropReason::Encode(e))
            }
        }
    }
}
