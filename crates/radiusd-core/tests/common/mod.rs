//! Shared fixtures: a fault-injecting store wrapper, a recording usage queue
//! and request builders.

#![allow(dead_code)]

use async_trait::async_trait;
use radiusd_core::{
    AccountingEngine, AuthEngine, EngineOptions, MemoryStore, NewSession, PolicyLimits,
    PolicyStore, RequestHandler, SessionKey, SessionSnapshot, SessionStore, SessionTransaction,
    StoreError, UsageQueue, UsageRecord, UserPolicy,
};
use radiusd_proto::{
    AcctStatusType, Attribute, AttributeType, Code, Packet, compute_chap_response,
    encrypt_user_password, generate_request_authenticator,
};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const SECRET: &[u8] = b"testing123";
pub const NAS_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
pub const FRAMED_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 5);

/// Operations of [`FaultyStore`] that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Lookup,
    Count,
    Create,
    Begin,
    Update,
    Log,
    Remove,
    Commit,
}

#[derive(Debug, Default)]
pub struct Faults {
    lookup: AtomicBool,
    count: AtomicBool,
    create: AtomicBool,
    begin: AtomicBool,
    update: AtomicBool,
    log: AtomicBool,
    remove: AtomicBool,
    commit: AtomicBool,
}

impl Faults {
    fn flag(&self, op: Op) -> &AtomicBool {
        match op {
            Op::Lookup => &self.lookup,
            Op::Count => &self.count,
            Op::Create => &self.create,
            Op::Begin => &self.begin,
            Op::Update => &self.update,
            Op::Log => &self.log,
            Op::Remove => &self.remove,
            Op::Commit => &self.commit,
        }
    }

    fn check(&self, op: Op) -> Result<(), StoreError> {
        if self.flag(op).load(Ordering::SeqCst) {
            Err(StoreError::Backend(format!("injected {:?} failure", op)))
        } else {
            Ok(())
        }
    }
}

/// Ordered record of commits and usage notifications
pub type EventLog = Arc<Mutex<Vec<&'static str>>>;

/// [`MemoryStore`] with switchable failures on every operation
#[derive(Clone)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    faults: Arc<Faults>,
    events: EventLog,
}

impl FaultyStore {
    pub fn new(inner: MemoryStore, events: EventLog) -> Self {
        FaultyStore {
            inner,
            faults: Arc::new(Faults::default()),
            events,
        }
    }

    pub fn fail(&self, op: Op) {
        self.faults.flag(op).store(true, Ordering::SeqCst);
    }

    pub fn heal(&self, op: Op) {
        self.faults.flag(op).store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl PolicyStore for FaultyStore {
    async fn lookup_policy(&self, user: &str) -> Result<Option<PolicyLimits>, StoreError> {
        self.faults.check(Op::Lookup)?;
        self.inner.lookup_policy(user).await
    }

    async fn count_open_sessions(&self, user: &str) -> Result<u32, StoreError> {
        self.faults.check(Op::Count)?;
        self.inner.count_open_sessions(user).await
    }
}

#[async_trait]
impl SessionStore for FaultyStore {
    async fn create_session(&self, session: &NewSession) -> Result<(), StoreError> {
        self.faults.check(Op::Create)?;
        self.inner.create_session(session).await
    }

    async fn begin(&self) -> Result<Box<dyn SessionTransaction>, StoreError> {
        self.faults.check(Op::Begin)?;
        Ok(Box::new(FaultyTransaction {
            inner: self.inner.begin().await?,
            faults: Arc::clone(&self.faults),
            events: Arc::clone(&self.events),
        }))
    }
}

struct FaultyTransaction {
    inner: Box<dyn SessionTransaction>,
    faults: Arc<Faults>,
    events: EventLog,
}

#[async_trait]
impl SessionTransaction for FaultyTransaction {
    async fn update_session(&mut self, snapshot: &SessionSnapshot) -> Result<(), StoreError> {
        self.faults.check(Op::Update)?;
        self.inner.update_session(snapshot).await
    }

    async fn log_terminal_session(&mut self, key: &SessionKey) -> Result<(), StoreError> {
        self.faults.check(Op::Log)?;
        self.inner.log_terminal_session(key).await
    }

    async fn remove_session(&mut self, key: &SessionKey) -> Result<(), StoreError> {
        self.faults.check(Op::Remove)?;
        self.inner.remove_session(key).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.faults.check(Op::Commit)?;
        self.inner.commit().await?;
        self.events.lock().unwrap().push("commit");
        Ok(())
    }
}

/// Usage queue that keeps every record
#[derive(Clone, Default)]
pub struct RecordingQueue {
    records: Arc<Mutex<Vec<UsageRecord>>>,
    events: EventLog,
}

impl RecordingQueue {
    pub fn new(events: EventLog) -> Self {
        RecordingQueue {
            records: Arc::default(),
            events,
        }
    }

    pub fn records(&self) -> Vec<UsageRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl UsageQueue for RecordingQueue {
    fn enqueue(&self, record: UsageRecord) {
        self.records.lock().unwrap().push(record);
        self.events.lock().unwrap().push("enqueue");
    }
}

/// Engines wired to one faulty store and one recording queue
pub struct Harness {
    pub store: FaultyStore,
    pub queue: RecordingQueue,
    pub events: EventLog,
    pub handler: RequestHandler,
}

impl Harness {
    pub fn new(users: &[UserPolicy], options: EngineOptions) -> Self {
        let events = EventLog::default();
        let store = FaultyStore::new(MemoryStore::from_users(users).unwrap(), Arc::clone(&events));
        let queue = RecordingQueue::new(Arc::clone(&events));
        let handler = RequestHandler::new(
            AuthEngine::new(Arc::new(store.clone()), options),
            AccountingEngine::new(
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                Arc::new(queue.clone()),
                options,
            ),
        );
        Harness {
            store,
            queue,
            events,
            handler,
        }
    }

    pub fn with_bob(simultaneous_use: u32) -> Self {
        let mut bob = UserPolicy::new("bob", "secret");
        bob.simultaneous_use = simultaneous_use;
        Self::new(&[bob], EngineOptions::default())
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    /// Open `count` sessions for `user` directly in the store
    pub async fn open_sessions(&self, user: &str, count: usize) {
        for i in 0..count {
            self.store
                .inner
                .create_session(&NewSession {
                    key: session_key(&format!("pre-{}", i), user),
                    assigned_ip: FRAMED_IP,
                    calling_station: String::new(),
                })
                .await
                .unwrap();
        }
    }
}

pub fn session_key(session_id: &str, user: &str) -> SessionKey {
    SessionKey {
        session_id: session_id.to_string(),
        user: user.to_string(),
        nas_ip: NAS_IP,
    }
}

pub fn pap_request(user: &str, password: &[u8]) -> Packet {
    pap_request_with_secret(user, password, SECRET)
}

pub fn pap_request_with_secret(user: &str, password: &[u8], secret: &[u8]) -> Packet {
    let authenticator = generate_request_authenticator();
    let hidden = encrypt_user_password(password, secret, &authenticator).unwrap();
    Packet::new(Code::AccessRequest, 1, authenticator)
        .with_attribute(Attribute::string(AttributeType::UserName.as_u8(), user).unwrap())
        .with_attribute(Attribute::new(AttributeType::UserPassword.as_u8(), hidden).unwrap())
        .with_attribute(Attribute::ipv4(AttributeType::NasIpAddress.as_u8(), NAS_IP).unwrap())
}

/// CHAP-Password = ident || hash, sent with `challenge`
pub fn chap_request(user: &str, ident: u8, hash: [u8; 16], challenge: &[u8]) -> Packet {
    let mut value = vec![ident];
    value.extend_from_slice(&hash);
    Packet::new(Code::AccessRequest, 2, generate_request_authenticator())
        .with_attribute(Attribute::string(AttributeType::UserName.as_u8(), user).unwrap())
        .with_attribute(Attribute::new(AttributeType::ChapPassword.as_u8(), value).unwrap())
        .with_attribute(
            Attribute::new(AttributeType::ChapChallenge.as_u8(), challenge.to_vec()).unwrap(),
        )
}

pub fn valid_chap_request(user: &str, password: &[u8], challenge: &[u8]) -> Packet {
    chap_request(user, 17, compute_chap_response(17, password, challenge), challenge)
}

fn accounting(status: AcctStatusType, user: &str, session_id: &str) -> Packet {
    Packet::new(Code::AccountingRequest, 3, generate_request_authenticator())
        .with_attribute(
            Attribute::integer(AttributeType::AcctStatusType.as_u8(), status.as_u32()).unwrap(),
        )
        .with_attribute(Attribute::string(AttributeType::UserName.as_u8(), user).unwrap())
        .with_attribute(Attribute::string(AttributeType::AcctSessionId.as_u8(), session_id).unwrap())
        .with_attribute(Attribute::ipv4(AttributeType::NasIpAddress.as_u8(), NAS_IP).unwrap())
}

pub fn acct_start(user: &str, session_id: &str) -> Packet {
    accounting(AcctStatusType::Start, user, session_id)
        .with_attribute(Attribute::ipv4(AttributeType::FramedIpAddress.as_u8(), FRAMED_IP).unwrap())
        .with_attribute(
            Attribute::string(AttributeType::CallingStationId.as_u8(), "aa:bb:cc:dd:ee:ff").unwrap(),
        )
}

fn with_counters(mut packet: Packet, bytes_in: u32, bytes_out: u32) -> Packet {
    for (attr, value) in [
        (AttributeType::AcctInputOctets, bytes_in),
        (AttributeType::AcctOutputOctets, bytes_out),
        (AttributeType::AcctInputPackets, 10),
        (AttributeType::AcctOutputPackets, 20),
        (AttributeType::AcctSessionTime, 300),
    ] {
        packet.add_attribute(Attribute::integer(attr.as_u8(), value).unwrap());
    }
    packet
}

pub fn acct_update(user: &str, session_id: &str, bytes_in: u32, bytes_out: u32) -> Packet {
    with_counters(
        accounting(AcctStatusType::InterimUpdate, user, session_id),
        bytes_in,
        bytes_out,
    )
}

pub fn acct_stop(user: &str, session_id: &str, bytes_in: u32, bytes_out: u32) -> Packet {
    with_counters(accounting(AcctStatusType::Stop, user, session_id), bytes_in, bytes_out)
}
