//! Vendor-Specific attributes (RFC 2865 Section 5.26)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Type      |  Length       |            Vendor-Id
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!      Vendor-Id (cont)           | Vendor type   | Vendor length |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |    Attribute-Specific...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-
//! ```

use super::{Attribute, AttributeType};
use crate::packet::PacketError;

/// MikroTik private enterprise number
pub const MIKROTIK_VENDOR_ID: u32 = 14988;
/// Mikrotik-Rate-Limit, e.g. `"10M/20M"`
pub const MIKROTIK_RATE_LIMIT: u8 = 8;

/// Microsoft private enterprise number
pub const MICROSOFT_VENDOR_ID: u32 = 311;
pub const MS_PRIMARY_DNS_SERVER: u8 = 28;
pub const MS_SECONDARY_DNS_SERVER: u8 = 29;

/// One vendor-local type/length/value triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSubAttribute {
    pub vendor_type: u8,
    pub value: Vec<u8>,
}

impl VendorSubAttribute {
    pub fn new(vendor_type: u8, value: impl Into<Vec<u8>>) -> Self {
        VendorSubAttribute {
            vendor_type,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorAttribute {
    pub vendor_id: u32,
    pub values: Vec<VendorSubAttribute>,
}

impl VendorAttribute {
    pub fn new(vendor_id: u32) -> Self {
        VendorAttribute {
            vendor_id,
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, vendor_type: u8, value: impl Into<Vec<u8>>) -> Self {
        self.values.push(VendorSubAttribute::new(vendor_type, value));
        self
    }

    /// Wrap the sub-attributes into a single Vendor-Specific (26) attribute
    pub fn encode(&self) -> Result<Attribute, PacketError> {
        let mut value = Vec::with_capacity(
            4 + self.values.iter().map(|v| 2 + v.value.len()).sum::<usize>(),
        );
        value.extend_from_slice(&self.vendor_id.to_be_bytes());
        for sub in &self.values {
            let length = 2 + sub.value.len();
            if length > u8::MAX as usize {
                return Err(PacketError::AttributeError(format!(
                    "Vendor {} sub-attribute {} too long: {} bytes",
                    self.vendor_id, sub.vendor_type, length
                )));
            }
            value.push(sub.vendor_type);
            value.push(length as u8);
            value.extend_from_slice(&sub.value);
        }
        Attribute::new(AttributeType::VendorSpecific.as_u8(), value)
    }

    pub fn decode(attr: &Attribute) -> Result<Self, PacketError> {
        if attr.attr_type != AttributeType::VendorSpecific.as_u8() {
            return Err(PacketError::AttributeError(format!(
                "Attribute {} is not Vendor-Specific",
                attr.attr_type
            )));
        }
        if attr.value.len() < 4 {
            return Err(PacketError::AttributeError(
                "Vendor-Specific attribute shorter than vendor id".to_string(),
            ));
        }

        let vendor_id = u32::from_be_bytes([attr.value[0], attr.value[1], attr.value[2], attr.value[3]]);
        let mut values = Vec::new();
        let mut rest = &attr.value[4..];
        while !rest.is_empty() {
            if rest.len() < 2 || (rest[1] as usize) < 2 || rest.len() < rest[1] as usize {
                return Err(PacketError::AttributeError(format!(
                    "Malformed sub-attribute in vendor {}",
                    vendor_id
                )));
            }
            let length = rest[1] as usize;
            values.push(VendorSubAttribute::new(rest[0], &rest[2..length]));
            rest = &rest[length..];
        }

        Ok(VendorAttribute { vendor_id, values })
    }

    pub fn find(&self, vendor_type: u8) -> Option<&VendorSubAttribute> {
        self.values.iter().find(|v| v.vendor_type == vendor_type)
    }
}
