//! Access-Accept attributes derived from a user's policy

use crate::model::PolicyLimits;
use radiusd_proto::attributes::vendor::{
    MICROSOFT_VENDOR_ID, MIKROTIK_RATE_LIMIT, MIKROTIK_VENDOR_ID, MS_PRIMARY_DNS_SERVER,
    MS_SECONDARY_DNS_SERVER,
};
use radiusd_proto::{Attribute, AttributeType, PacketError, VendorAttribute};
use tracing::warn;

/// Framed-IP-Address, Mikrotik-Rate-Limit and the MS DNS pair, in that
/// order; absent policy fields contribute nothing.
pub fn policy_attributes(limits: &PolicyLimits) -> Vec<Attribute> {
    let mut attributes = Vec::with_capacity(3);

    if let Some(ip) = limits.dedicated_ip {
        push_encoded(
            &mut attributes,
            Attribute::ipv4(AttributeType::FramedIpAddress.as_u8(), ip),
            "Framed-IP-Address",
        );
    }

    if let Some(rate) = &limits.ratelimit {
        push_encoded(
            &mut attributes,
            VendorAttribute::new(MIKROTIK_VENDOR_ID)
                .with_value(MIKROTIK_RATE_LIMIT, rate.as_bytes())
                .encode(),
            "Mikrotik-Rate-Limit",
        );
    }

    if let Some(dns) = limits.dns {
        push_encoded(
            &mut attributes,
            VendorAttribute::new(MICROSOFT_VENDOR_ID)
                .with_value(MS_PRIMARY_DNS_SERVER, dns.primary.octets())
                .with_value(MS_SECONDARY_DNS_SERVER, dns.secondary.octets())
                .encode(),
            "MS DNS servers",
        );
    }

    attributes
}

fn push_encoded(
    attributes: &mut Vec<Attribute>,
    encoded: Result<Attribute, PacketError>,
    name: &str,
) {
    match encoded {
        Ok(attr) => attributes.push(attr),
        Err(e) => warn!(attribute = name, error = %e, "Attribute omitted from Access-Accept"),
    }
}
