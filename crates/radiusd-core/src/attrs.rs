//! Typed attribute accessors over a decoded request
//!
//! Every accessor names the attribute it failed on, so a dropped request
//! can be logged with a useful diagnostic.

use crate::model::{SessionCounters, SessionKey, SessionSnapshot};
use crate::request::ValidationError;
use radiusd_proto::{AttributeType, Packet};
use std::net::Ipv4Addr;

/// Raw value of the first attribute of `attr`
pub fn bytes(packet: &Packet, attr: AttributeType) -> Result<&[u8], ValidationError> {
    packet
        .find_attribute(attr.as_u8())
        .map(|a| a.value.as_slice())
        .ok_or(ValidationError::Missing(attr))
}

pub fn optional_bytes(packet: &Packet, attr: AttributeType) -> Option<&[u8]> {
    packet.find_attribute(attr.as_u8()).map(|a| a.value.as_slice())
}

pub fn string(packet: &Packet, attr: AttributeType) -> Result<String, ValidationError> {
    to_string(attr, bytes(packet, attr)?)
}

/// Empty when absent
pub fn optional_string(packet: &Packet, attr: AttributeType) -> Result<String, ValidationError> {
    optional_bytes(packet, attr).map_or(Ok(String::new()), |value| to_string(attr, value))
}

pub fn integer(packet: &Packet, attr: AttributeType) -> Result<u32, ValidationError> {
    let value = bytes(packet, attr)?;
    let octets: [u8; 4] = value
        .try_into()
        .map_err(|_| ValidationError::malformed(attr, format!("expected 4 bytes, got {}", value.len())))?;
    Ok(u32::from_be_bytes(octets))
}

pub fn ipv4(packet: &Packet, attr: AttributeType) -> Result<Ipv4Addr, ValidationError> {
    let value = bytes(packet, attr)?;
    let octets: [u8; 4] = value
        .try_into()
        .map_err(|_| ValidationError::malformed(attr, format!("expected 4 bytes, got {}", value.len())))?;
    Ok(Ipv4Addr::from(octets))
}

/// 64-bit counter from an octet attribute and its Gigawords companion
/// (RFC 2869 Section 5.1/5.2); a missing Gigawords attribute counts as zero.
pub fn counter64(
    packet: &Packet,
    low: AttributeType,
    high: AttributeType,
) -> Result<u64, ValidationError> {
    let low = integer(packet, low)?;
    let high = match packet.find_attribute(high.as_u8()) {
        Some(_) => integer(packet, high)?,
        None => 0,
    };
    Ok((u64::from(high) << 32) | u64::from(low))
}

/// (Acct-Session-Id, User-Name, NAS-IP-Address)
pub fn session_key(packet: &Packet) -> Result<SessionKey, ValidationError> {
    Ok(SessionKey {
        user: string(packet, AttributeType::UserName)?,
        session_id: string(packet, AttributeType::AcctSessionId)?,
        nas_ip: ipv4(packet, AttributeType::NasIpAddress)?,
    })
}

/// Session key plus the cumulative counters of an Interim-Update or Stop
pub fn session_snapshot(packet: &Packet) -> Result<SessionSnapshot, ValidationError> {
    let key = session_key(packet)?;
    let counters = SessionCounters {
        bytes_in: counter64(
            packet,
            AttributeType::AcctInputOctets,
            AttributeType::AcctInputGigawords,
        )?,
        bytes_out: counter64(
            packet,
            AttributeType::AcctOutputOctets,
            AttributeType::AcctOutputGigawords,
        )?,
        packets_in: u64::from(integer(packet, AttributeType::AcctInputPackets)?),
        packets_out: u64::from(integer(packet, AttributeType::AcctOutputPackets)?),
        session_time: integer(packet, AttributeType::AcctSessionTime)?,
    };
    Ok(SessionSnapshot { key, counters })
}

fn to_string(attr: AttributeType, value: &[u8]) -> Result<String, ValidationError> {
    String::from_utf8(value.to_vec()).map_err(|_| ValidationError::malformed(attr, "not valid UTF-8"))
}
