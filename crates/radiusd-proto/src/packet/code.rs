/// RADIUS packet codes (RFC 2865 Section 4, RFC 2866 Section 4, RFC 5997)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Code {
    /// Access-Request (1)
    AccessRequest = 1,
    /// Access-Accept (2)
    AccessAccept = 2,
    /// Access-Reject (3)
    AccessReject = 3,
    /// Accounting-Request (4)
    AccountingRequest = 4,
    /// Accounting-Response (5)
    AccountingResponse = 5,
    /// Access-Challenge (11)
    AccessChallenge = 11,
    /// Status-Server (12)
    StatusServer = 12,
    /// Status-Client (13)
    StatusClient = 13,
}

impl Code {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Code::AccessRequest),
            2 => Some(Code::AccessAccept),
            3 => Some(Code::AccessReject),
            4 => Some(Code::AccountingRequest),
            5 => Some(Code::AccountingResponse),
            11 => Some(Code::AccessChallenge),
            12 => Some(Code::StatusServer),
            13 => Some(Code::StatusClient),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Codes a NAS sends to the server (as opposed to replies)
    pub fn is_request(self) -> bool {
        matches!(
            self,
            Code::AccessRequest | Code::AccountingRequest | Code::StatusServer
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_from_u8() {
        assert_eq!(Code::from_u8(1), Some(Code::AccessRequest));
        assert_eq!(Code::from_u8(5), Some(Code::AccountingResponse));
        assert_eq!(Code::from_u8(6), None);
        assert_eq!(Code::AccountingRequest.as_u8(), 4);
    }

    #[test]
    fn test_request_codes() {
        assert!(Code::AccessRequest.is_request());
        assert!(Code::AccountingRequest.is_request());
        assert!(!Code::AccessReject.is_request());
    }
}
