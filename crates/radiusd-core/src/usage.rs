//! Usage notifications for the aggregation pipeline
//!
//! Interim-Update and Stop forward the NAS-reported cumulative counters to a
//! [`UsageQueue`]. Delivery is fire-and-forget: the accounting engine never
//! waits on the consumer and never learns whether the record was processed.

use crate::model::SessionSnapshot;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub user: String,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub packets_in: u64,
    pub packets_out: u64,
}

impl From<&SessionSnapshot> for UsageRecord {
    fn from(snapshot: &SessionSnapshot) -> Self {
        UsageRecord {
            user: snapshot.key.user.clone(),
            bytes_in: snapshot.counters.bytes_in,
            bytes_out: snapshot.counters.bytes_out,
            packets_in: snapshot.counters.packets_in,
            packets_out: snapshot.counters.packets_out,
        }
    }
}

pub trait UsageQueue: Send + Sync {
    fn enqueue(&self, record: UsageRecord);
}

/// [`UsageQueue`] over an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelUsageQueue {
    sender: mpsc::UnboundedSender<UsageRecord>,
}

impl ChannelUsageQueue {
    /// The receiver goes to the aggregator task
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UsageRecord>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (ChannelUsageQueue { sender }, receiver)
    }
}

impl UsageQueue for ChannelUsageQueue {
    fn enqueue(&self, record: UsageRecord) {
        if let Err(mpsc::error::SendError(record)) = self.sender.send(record) {
            warn!(user = %record.user, "Usage queue receiver closed, record discarded");
        }
    }
}
