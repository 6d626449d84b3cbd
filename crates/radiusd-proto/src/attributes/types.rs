/// RADIUS attribute types handled by this server (RFC 2865, 2866, 2869)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttributeType {
    UserName = 1,
    UserPassword = 2,
    ChapPassword = 3,
    NasIpAddress = 4,
    FramedIpAddress = 8,
    ReplyMessage = 18,
    VendorSpecific = 26,
    CallingStationId = 31,
    ProxyState = 33,
    /// Acct-Status-Type (40) - RFC 2866
    AcctStatusType = 40,
    AcctInputOctets = 42,
    AcctOutputOctets = 43,
    AcctSessionId = 44,
    AcctSessionTime = 46,
    AcctInputPackets = 47,
    AcctOutputPackets = 48,
    /// High 32 bits of Acct-Input-Octets (RFC 2869)
    AcctInputGigawords = 52,
    /// High 32 bits of Acct-Output-Octets (RFC 2869)
    AcctOutputGigawords = 53,
    ChapChallenge = 60,
}

impl AttributeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        use AttributeType::*;
        let known = [
            UserName,
            UserPassword,
            ChapPassword,
            NasIpAddress,
            FramedIpAddress,
            ReplyMessage,
            VendorSpecific,
            CallingStationId,
            ProxyState,
            AcctStatusType,
            AcctInputOctets,
            AcctOutputOctets,
            AcctSessionId,
            AcctSessionTime,
            AcctInputPackets,
            AcctOutputPackets,
            AcctInputGigawords,
            AcctOutputGigawords,
            ChapChallenge,
        ];
        known.into_iter().find(|t| t.as_u8() == value)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Dictionary name, used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            AttributeType::UserName => "User-Name",
            AttributeType::UserPassword => "User-Password",
            AttributeType::ChapPassword => "CHAP-Password",
            AttributeType::NasIpAddress => "NAS-IP-Address",
            AttributeType::FramedIpAddress => "Framed-IP-Address",
            AttributeType::ReplyMessage => "Reply-Message",
            AttributeType::VendorSpecific => "Vendor-Specific",
            AttributeType::CallingStationId => "Calling-Station-Id",
            AttributeType::ProxyState => "Proxy-State",
            AttributeType::AcctStatusType => "Acct-Status-Type",
            AttributeType::AcctInputOctets => "Acct-Input-Octets",
            AttributeType::AcctOutputOctets => "Acct-Output-Octets",
            AttributeType::AcctSessionId => "Acct-Session-Id",
            AttributeType::AcctSessionTime => "Acct-Session-Time",
            AttributeType::AcctInputPackets => "Acct-Input-Packets",
            AttributeType::AcctOutputPackets => "Acct-Output-Packets",
            AttributeType::AcctInputGigawords => "Acct-Input-Gigawords",
            AttributeType::AcctOutputGigawords => "Acct-Output-Gigawords",
            AttributeType::ChapChallenge => "CHAP-Challenge",
        }
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
