use crate::packet::{Packet, PacketError};
use rand::Rng;
use thiserror::Error;

/// RFC 2865 Section 5.2: User-Password is at most 128 octets
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Invalid encrypted password length: {0} (must be a non-zero multiple of 16, max 128)")]
    InvalidLength(usize),
    #[error("Password too long: {0} bytes (max 128)")]
    TooLong(usize),
}

/// Random Request Authenticator (RFC 2865 Section 3)
pub fn generate_request_authenticator() -> [u8; 16] {
    let mut authenticator = [0u8; 16];
    rand::rng().fill(&mut authenticator);
    authenticator
}

/// Response Authenticator per RFC 2865 Section 3 / RFC 2866 Section 3
///
/// MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)
pub fn calculate_response_authenticator(
    packet: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<[u8; 16], PacketError> {
    let mut data = packet.encode()?;
    data[4..20].copy_from_slice(request_authenticator);
    data.extend_from_slice(secret);
    Ok(md5::compute(&data).0)
}

pub fn verify_response_authenticator(
    response: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> bool {
    calculate_response_authenticator(response, request_authenticator, secret)
        .map(|expected| expected == response.authenticator)
        .unwrap_or(false)
}

/// XOR `block` with MD5(secret + chain), the keystream step shared by both directions
fn keystream_block(secret: &[u8], chain: &[u8], block: &[u8]) -> [u8; 16] {
    let mut data = Vec::with_capacity(secret.len() + chain.len());
    data.extend_from_slice(secret);
    data.extend_from_slice(chain);
    let hash = md5::compute(&data);

    let mut out = [0u8; 16];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = block[i] ^ hash.0[i];
    }
    out
}

/// Hide a User-Password per RFC 2865 Section 5.2
///
/// The password is NUL-padded to a multiple of 16 octets; block `i` is XORed
/// with MD5(secret + c(i-1)), where c(0) is the Request Authenticator.
pub fn encrypt_user_password(
    password: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<Vec<u8>, PasswordError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong(password.len()));
    }

    let mut padded = password.to_vec();
    let padded_len = password.len().div_ceil(16).max(1) * 16;
    padded.resize(padded_len, 0);

    let mut result = Vec::with_capacity(padded_len);
    let mut chain: [u8; 16] = *authenticator;
    for chunk in padded.chunks(16) {
        chain = keystream_block(secret, &chain, chunk);
        result.extend_from_slice(&chain);
    }
    Ok(result)
}

/// Recover a User-Password per RFC 2865 Section 5.2
///
/// Returns the raw password octets with trailing NUL padding removed.
pub fn decrypt_user_password(
    encrypted: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<Vec<u8>, PasswordError> {
    if encrypted.is_empty() || encrypted.len() % 16 != 0 || encrypted.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::InvalidLength(encrypted.len()));
    }

    let mut result = Vec::with_capacity(encrypted.len());
    let mut chain: &[u8] = authenticator;
    for chunk in encrypted.chunks(16) {
        result.extend_from_slice(&keystream_block(secret, chain, chunk));
        chain = chunk;
    }

    while result.last() == Some(&0) {
        result.pop();
    }
    Ok(result)
}
