//! CHAP (RFC 1994) as carried in RADIUS (RFC 2865 Section 5.3)
//!
//! The NAS sends CHAP-Password = ident || MD5(ident || secret || challenge)
//! together with the challenge it issued in CHAP-Challenge.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChapError {
    #[error("Invalid CHAP-Password length: expected 17 bytes, got {0}")]
    InvalidLength(usize),
}

/// Parsed CHAP-Password attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapResponse {
    /// CHAP identifier, the first octet of CHAP-Password
    pub ident: u8,
    /// MD5 response value
    pub response: [u8; 16],
}

impl ChapResponse {
    pub const LENGTH: usize = 17;

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChapError> {
        if bytes.len() != Self::LENGTH {
            return Err(ChapError::InvalidLength(bytes.len()));
        }

        let mut response = [0u8; 16];
        response.copy_from_slice(&bytes[1..]);
        Ok(ChapResponse {
            ident: bytes[0],
            response,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::LENGTH);
        bytes.push(self.ident);
        bytes.extend_from_slice(&self.response);
        bytes
    }
}

/// MD5(ident || secret || challenge)
pub fn compute_chap_response(ident: u8, secret: &[u8], challenge: &[u8]) -> [u8; 16] {
    let mut data = Vec::with_capacity(1 + secret.len() + challenge.len());
    data.push(ident);
    data.extend_from_slice(secret);
    data.extend_from_slice(challenge);
    md5::compute(&data).0
}

/// Check a CHAP response against the stored secret
pub fn verify_chap_response(response: &ChapResponse, secret: &[u8], challenge: &[u8]) -> bool {
    let expected = compute_chap_response(response.ident, secret, challenge);
    constant_time_eq(&expected, &response.response)
}

fn constant_time_eq(a: &[u8; 16], b: &[u8; 16]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chap_response_from_bytes() {
        let mut bytes = vec![0x07];
        bytes.extend_from_slice(&[0xAB; 16]);
        let response = ChapResponse::from_bytes(&bytes).unwrap();
        assert_eq!(response.ident, 0x07);
        assert_eq!(response.response, [0xAB; 16]);
        assert_eq!(response.to_bytes(), bytes);
    }

    #[test]
    fn test_chap_response_invalid_length() {
        assert_eq!(
            ChapResponse::from_bytes(&[1u8; 16]),
            Err(ChapError::InvalidLength(16))
        );
        assert_eq!(
            ChapResponse::from_bytes(&[1u8; 18]),
            Err(ChapError::InvalidLength(18))
        );
    }

    #[test]
    fn test_known_digest() {
        // md5("\x01" "secret" "challenge")
        let expected = md5::compute(b"\x01secretchallenge").0;
        assert_eq!(compute_chap_response(1, b"secret", b"challenge"), expected);
    }

    #[test]
    fn test_verify_chap_response() {
        let challenge = b"0123456789abcdef";
        let response = ChapResponse {
            ident: 0x10,
            response: compute_chap_response(0x10, b"secret123", challenge),
        };

        assert!(verify_chap_response(&response, b"secret123", challenge));
        assert!(!verify_chap_response(&response, b"secret124", challenge));
        assert!(!verify_chap_response(&response, b"secret123", b"0123456789abcdeg"));

        let wrong_ident = ChapResponse {
            ident: 0x11,
            ..response
        };
        assert!(!verify_chap_response(&wrong_ident, b"secret123", challenge));
    }
}
