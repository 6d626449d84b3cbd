//! RADIUS protocol primitives
//!
//! Packet and attribute codec for RFC 2865 / 2866, plus the cryptographic
//! helpers the server side needs: User-Password hiding (PAP), CHAP response
//! verification and Response Authenticator signing. Vendor-Specific
//! attributes for the MikroTik and Microsoft dictionaries live in
//! [`attributes::vendor`].
//!
//! # Example
//!
//! ```rust
//! use radiusd_proto::{Attribute, AttributeType, Code, Packet};
//! use radiusd_proto::auth::{encrypt_user_password, generate_request_authenticator};
//!
//! let req_auth = generate_request_authenticator();
//! let mut packet = Packet::new(Code::AccessRequest, 1, req_auth);
//! packet.add_attribute(Attribute::string(AttributeType::UserName.as_u8(), "bob").unwrap());
//!
//! let hidden = encrypt_user_password(b"secret", b"testing123", &req_auth).unwrap();
//! packet.add_attribute(Attribute::new(AttributeType::UserPassword.as_u8(), hidden).unwrap());
//!
//! let bytes = packet.encode().unwrap();
//! assert_eq!(Packet::decode(&bytes).unwrap(), packet);
//! ```

pub mod accounting;
pub mod attributes;
pub mod auth;
pub mod chap;
pub mod packet;

pub use accounting::AcctStatusType;
pub use attributes::{Attribute, AttributeType, VendorAttribute, VendorSubAttribute};
pub use auth::{
    PasswordError, calculate_response_authenticator, decrypt_user_password,
    encrypt_user_password, generate_request_authenticator, verify_response_authenticator,
};
pub use chap::{ChapError, ChapResponse, compute_chap_response, verify_chap_response};
pub use packet::{Code, Packet, PacketError};
