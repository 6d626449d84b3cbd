use crate::request::ValidationError;
use crate::store::StoreError;
use radiusd_proto::{Code, PacketError};
use thiserror::Error;

/// Why a request got no response
///
/// Every variant is a silent drop on the wire; the NAS retransmits.
#[derive(Debug, Error)]
pub enum DropReason {
    #[error("Invalid request: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Backend fault: {0}")]
    Backend(#[from] StoreError),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Unsupported packet code: {0:?}")]
    UnsupportedCode(Code),

    #[error("Failed to encode response: {0}")]
    Encode(#[from] PacketError),
}
