//! Request validation
//!
//! Turns a decoded [`Packet`] into a fully populated request struct. The
//! engines only ever see requests that passed these checks; anything that
//! fails is dropped without a response.

use crate::attrs;
use crate::model::NewSession;
use crate::model::SessionSnapshot;
use radiusd_proto::auth::MAX_PASSWORD_LENGTH;
use radiusd_proto::{AcctStatusType, AttributeType, ChapResponse, Code, Packet};
use std::net::Ipv4Addr;
use thiserror::Error;

/// Why a request was not accepted for processing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing {0}")]
    Missing(AttributeType),

    #[error("Malformed {attribute}: {reason}")]
    Malformed {
        attribute: AttributeType,
        reason: String,
    },

    #[error("Both User-Password and CHAP-Password present")]
    AmbiguousCredentials,

    #[error("No User-Password or CHAP-Password")]
    NoCredentials,

    #[error("Unsupported Acct-Status-Type {0}")]
    UnsupportedStatusType(u32),

    #[error("Unexpected packet code {0:?}")]
    WrongCode(Code),
}

impl ValidationError {
    pub fn malformed(attribute: AttributeType, reason: impl Into<String>) -> Self {
        ValidationError::Malformed {
            attribute,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Hidden User-Password and the Request Authenticator it was hidden with
    Pap {
        cipher: Vec<u8>,
        authenticator: [u8; 16],
    },
    Chap {
        response: ChapResponse,
        challenge: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    pub user: String,
    pub credentials: Credentials,
    pub nas_ip: Option<Ipv4Addr>,
}

impl AccessRequest {
    pub fn from_packet(packet: &Packet) -> Result<Self, ValidationError> {
        if packet.code != Code::AccessRequest {
            return Err(ValidationError::WrongCode(packet.code));
        }

        let user = attrs::string(packet, AttributeType::UserName)?;
        let nas_ip = match packet.find_attribute(AttributeType::NasIpAddress.as_u8()) {
            Some(_) => Some(attrs::ipv4(packet, AttributeType::NasIpAddress)?),
            None => None,
        };

        let password = attrs::optional_bytes(packet, AttributeType::UserPassword);
        let chap = attrs::optional_bytes(packet, AttributeType::ChapPassword);
        let credentials = match (password, chap) {
            (Some(_), Some(_)) => return Err(ValidationError::AmbiguousCredentials),
            (None, None) => return Err(ValidationError::NoCredentials),
            (Some(cipher), None) => {
                if cipher.is_empty() || cipher.len() % 16 != 0 || cipher.len() > MAX_PASSWORD_LENGTH {
                    return Err(ValidationError::malformed(
                        AttributeType::UserPassword,
                        format!(
                            "length {} is not a multiple of 16 up to {}",
                            cipher.len(),
                            MAX_PASSWORD_LENGTH
                        ),
                    ));
                }
                Credentials::Pap {
                    cipher: cipher.to_vec(),
                    authenticator: packet.authenticator,
                }
            }
            (None, Some(chap)) => {
                let response = ChapResponse::from_bytes(chap).map_err(|e| {
                    ValidationError::malformed(AttributeType::ChapPassword, e.to_string())
                })?;
                let challenge = attrs::bytes(packet, AttributeType::ChapChallenge)?;
                Credentials::Chap {
                    response,
                    challenge: challenge.to_vec(),
                }
            }
        };

        Ok(AccessRequest {
            user,
            credentials,
            nas_ip,
        })
    }
}

/// What an Accounting-Request asks the engine to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcctEvent {
    Start(NewSession),
    InterimUpdate(SessionSnapshot),
    Stop(SessionSnapshot),
    /// Accounting-On / Accounting-Off; no session attached
    Nas(AcctStatusType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountingRequest {
    pub status: AcctStatusType,
    pub event: AcctEvent,
}

impl AccountingRequest {
    pub fn from_packet(packet: &Packet) -> Result<Self, ValidationError> {
        if packet.code != Code::AccountingRequest {
            return Err(ValidationError::WrongCode(packet.code));
        }

        let raw = attrs::integer(packet, AttributeType::AcctStatusType)?;
        let status =
            AcctStatusType::from_u32(raw).ok_or(ValidationError::UnsupportedStatusType(raw))?;

        let event = match status {
            AcctStatusType::Start => {
                let key = attrs::session_key(packet)?;
                AcctEvent::Start(NewSession {
                    key,
                    assigned_ip: attrs::ipv4(packet, AttributeType::FramedIpAddress)?,
                    calling_station: attrs::optional_string(packet, AttributeType::CallingStationId)?,
                })
            }
            AcctStatusType::InterimUpdate => AcctEvent::InterimUpdate(attrs::session_snapshot(packet)?),
            AcctStatusType::Stop => AcctEvent::Stop(attrs::session_snapshot(packet)?),
            AcctStatusType::AccountingOn | AcctStatusType::AccountingOff => AcctEvent::Nas(status),
        };

        Ok(AccountingRequest { status, event })
    }
}
