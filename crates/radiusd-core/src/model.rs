//! Session and policy records shared by the engines and the stores

use crate::store::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Longest Mikrotik-Rate-Limit value that still fits one Vendor-Specific attribute
pub const MAX_RATELIMIT_LEN: usize = 247;

/// Identity of an open session: the NAS-assigned id, the subscriber and the owning NAS
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub session_id: String,
    pub user: String,
    pub nas_ip: Ipv4Addr,
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.session_id, self.user, self.nas_ip)
    }
}

/// Cumulative counters as last reported by the NAS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub packets_in: u64,
    pub packets_out: u64,
    /// Seconds since session start
    pub session_time: u32,
}

/// Transient per-request view of a session built from an Interim-Update or Stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub key: SessionKey,
    pub counters: SessionCounters,
}

/// Everything an Accounting-Start carries about a new session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub key: SessionKey,
    pub assigned_ip: Ipv4Addr,
    /// Calling-Station-Id, empty when the NAS did not send one
    pub calling_station: String,
}

/// A session row as held by a session store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub key: SessionKey,
    pub assigned_ip: Ipv4Addr,
    pub calling_station: String,
    pub counters: SessionCounters,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn open(new: &NewSession) -> Self {
        let now = Utc::now();
        Session {
            key: new.key.clone(),
            assigned_ip: new.assigned_ip,
            calling_station: new.calling_station.clone(),
            counters: SessionCounters::default(),
            started_at: now,
            updated_at: now,
        }
    }

    /// Overwrite counters with the NAS-reported totals
    pub fn apply(&mut self, snapshot: &SessionSnapshot) {
        self.counters = snapshot.counters;
        self.updated_at = Utc::now();
    }
}

/// Audit record appended when a session is finalized by Accounting-Stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalRecord {
    pub session: Session,
    pub stopped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsPair {
    pub primary: Ipv4Addr,
    pub secondary: Ipv4Addr,
}

/// A user's authorization policy, read-only to the engines
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyLimits {
    /// Expected credential secret; empty means "no such user"
    pub pass: String,
    /// Administrative enable flag, independent of credential validity
    pub ok: bool,
    pub simultaneous_use: u32,
    pub dedicated_ip: Option<Ipv4Addr>,
    pub ratelimit: Option<String>,
    pub dns: Option<DnsPair>,
}

/// Policy data as it is written by operators: config `users` entries and
/// `radius_users` rows. Converted to [`PolicyLimits`] at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPolicy {
    pub username: String,
    pub password: String,
    #[serde(default = "default_ok")]
    pub ok: bool,
    #[serde(default = "default_simultaneous_use")]
    pub simultaneous_use: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratelimit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_one: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_two: Option<String>,
}

fn default_ok() -> bool {
    true
}

fn default_simultaneous_use() -> u32 {
    1
}

impl UserPolicy {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        UserPolicy {
            username: username.into(),
            password: password.into(),
            ok: default_ok(),
            simultaneous_use: default_simultaneous_use(),
            dedicated_ip: None,
            ratelimit: None,
            dns_one: None,
            dns_two: None,
        }
    }

    /// Parse and check the optional fields.
    ///
    /// A primary DNS server without a secondary one is rejected here, so the
    /// engines only ever see complete pairs.
    pub fn to_limits(&self) -> Result<PolicyLimits, StoreError> {
        let dedicated_ip = self
            .dedicated_ip
            .as_deref()
            .map(|ip| parse_ipv4(&self.username, "dedicated_ip", ip))
            .transpose()?;

        if let Some(rate) = &self.ratelimit {
            if rate.len() > MAX_RATELIMIT_LEN {
                return Err(StoreError::InvalidPolicy(format!(
                    "user {}: ratelimit is {} bytes (max {})",
                    self.username,
                    rate.len(),
                    MAX_RATELIMIT_LEN
                )));
            }
        }

        let dns = match (self.dns_one.as_deref(), self.dns_two.as_deref()) {
            (None, None) => None,
            (Some(one), Some(two)) => Some(DnsPair {
                primary: parse_ipv4(&self.username, "dns_one", one)?,
                secondary: parse_ipv4(&self.username, "dns_two", two)?,
            }),
            (Some(_), None) => {
                return Err(StoreError::InvalidPolicy(format!(
                    "user {}: dns_one set without dns_two",
                    self.username
                )));
            }
            (None, Some(_)) => {
                return Err(StoreError::InvalidPolicy(format!(
                    "user {}: dns_two set without dns_one",
                    self.username
                )));
            }
        };

        Ok(PolicyLimits {
            pass: self.password.clone(),
            ok: self.ok,
            simultaneous_use: self.simultaneous_use,
            dedicated_ip,
            ratelimit: self.ratelimit.clone(),
            dns,
        })
    }
}

fn parse_ipv4(user: &str, field: &str, value: &str) -> Result<Ipv4Addr, StoreError> {
    value.trim().parse().map_err(|_| {
        StoreError::InvalidPolicy(format!("user {}: {} is not an IPv4 address: {}", user, field, value))
    })
}
