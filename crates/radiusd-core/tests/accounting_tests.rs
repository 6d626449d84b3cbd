//! Accounting lifecycle tests
//!
//! Start / Interim-Update / Stop against the in-memory store, with injected
//! failures at every transactional step.

mod common;

use common::{
    FRAMED_IP, Harness, Op, SECRET, acct_start, acct_stop, acct_update, session_key,
};
use radiusd_core::{
    DropReason, EngineOptions, SessionCounters, StoreError, UsageNotify, UsageRecord, UserPolicy,
};
use radiusd_proto::{Code, Packet, verify_response_authenticator};

async fn respond(harness: &Harness, request: &Packet) -> Packet {
    harness
        .handler
        .handle(request, SECRET)
        .await
        .response()
        .cloned()
        .expect("expected a response")
}

fn harness(usage_notify: UsageNotify) -> Harness {
    Harness::new(
        &[UserPolicy::new("bob", "secret")],
        EngineOptions {
            verbose: false,
            usage_notify,
        },
    )
}

async fn started(usage_notify: UsageNotify) -> Harness {
    let harness = harness(usage_notify);
    respond(&harness, &acct_start("bob", "S1")).await;
    harness
}

#[tokio::test]
async fn test_start_opens_zeroed_session() {
    let harness = harness(UsageNotify::BeforeCommit);
    let request = acct_start("bob", "S1");

    let response = respond(&harness, &request).await;
    assert_eq!(response.code, Code::AccountingResponse);
    assert_eq!(response.reply_message(), None);
    assert!(verify_response_authenticator(&response, &request.authenticator, SECRET));

    assert_eq!(harness.store.inner.session_count().await, 1);
    let session = harness.store.inner.session(&session_key("S1", "bob")).await.unwrap();
    assert_eq!(session.counters, SessionCounters::default());
    assert_eq!(session.assigned_ip, FRAMED_IP);
    assert_eq!(session.calling_station, "aa:bb:cc:dd:ee:ff");
}

#[tokio::test]
async fn test_stop_finalizes_session() {
    let harness = started(UsageNotify::BeforeCommit).await;

    let response = respond(&harness, &acct_stop("bob", "S1", 1000, 2000)).await;
    assert_eq!(response.code, Code::AccountingResponse);
    assert_eq!(response.reply_message().as_deref(), Some("Finished accounting."));

    assert_eq!(harness.store.inner.session_count().await, 0);
    let log = harness.store.inner.terminal_log().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].session.key, session_key("S1", "bob"));
    assert_eq!(log[0].session.counters.bytes_in, 1000);
    assert_eq!(log[0].session.counters.bytes_out, 2000);

    assert_eq!(
        harness.queue.records(),
        vec![UsageRecord {
            user: "bob".to_string(),
            bytes_in: 1000,
            bytes_out: 2000,
            packets_in: 10,
            packets_out: 20,
        }]
    );
}

#[tokio::test]
async fn test_interim_update_overwrites_counters() {
    let harness = started(UsageNotify::BeforeCommit).await;

    let response = respond(&harness, &acct_update("bob", "S1", 100, 200)).await;
    assert_eq!(response.reply_message().as_deref(), Some("Updated accounting."));
    respond(&harness, &acct_update("bob", "S1", 500, 700)).await;

    let session = harness.store.inner.session(&session_key("S1", "bob")).await.unwrap();
    assert_eq!(session.counters.bytes_in, 500);
    assert_eq!(session.counters.bytes_out, 700);
    assert_eq!(session.counters.session_time, 300);
    assert_eq!(harness.queue.records().len(), 2);
}

#[tokio::test]
async fn test_replayed_update_is_idempotent() {
    let harness = started(UsageNotify::BeforeCommit).await;
    let update = acct_update("bob", "S1", 100, 200);

    respond(&harness, &update).await;
    let first = harness.store.inner.session(&session_key("S1", "bob")).await.unwrap();
    respond(&harness, &update).await;
    let second = harness.store.inner.session(&session_key("S1", "bob")).await.unwrap();

    assert_eq!(first.counters, second.counters);
    assert_eq!(harness.store.inner.session_count().await, 1);
}

#[tokio::test]
async fn test_duplicate_start_overwrites_without_touching_log() {
    let harness = started(UsageNotify::BeforeCommit).await;
    respond(&harness, &acct_update("bob", "S1", 100, 200)).await;

    respond(&harness, &acct_start("bob", "S1")).await;
    let session = harness.store.inner.session(&session_key("S1", "bob")).await.unwrap();
    assert_eq!(session.counters, SessionCounters::default());
    assert_eq!(harness.store.inner.session_count().await, 1);
    assert!(harness.store.inner.terminal_log().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_stop_is_dropped() {
    let harness = started(UsageNotify::BeforeCommit).await;
    let stop = acct_stop("bob", "S1", 1000, 2000);
    respond(&harness, &stop).await;

    let disposition = harness.handler.handle(&stop, SECRET).await;
    assert!(matches!(
        disposition.drop_reason(),
        Some(DropReason::Backend(StoreError::SessionNotFound(_)))
    ));
    assert_eq!(harness.store.inner.terminal_log().await.len(), 1);
}

#[tokio::test]
async fn test_start_for_unknown_user_is_dropped() {
    let harness = harness(UsageNotify::BeforeCommit);
    let disposition = harness.handler.handle(&acct_start("mallory", "S9"), SECRET).await;

    assert!(matches!(disposition.drop_reason(), Some(DropReason::UnknownUser(_))));
    assert_eq!(harness.store.inner.session_count().await, 0);
}

#[tokio::test]
async fn test_start_store_faults_are_dropped() {
    let harness = harness(UsageNotify::BeforeCommit);

    harness.store.fail(Op::Lookup);
    assert!(harness.handler.handle(&acct_start("bob", "S1"), SECRET).await.is_dropped());
    harness.store.heal(Op::Lookup);

    harness.store.fail(Op::Create);
    assert!(harness.handler.handle(&acct_start("bob", "S1"), SECRET).await.is_dropped());
    assert_eq!(harness.store.inner.session_count().await, 0);
}

#[tokio::test]
async fn test_failed_stop_leaves_store_unchanged() {
    for op in [Op::Begin, Op::Update, Op::Log, Op::Remove, Op::Commit] {
        let harness = started(UsageNotify::AfterCommit).await;
        respond(&harness, &acct_update("bob", "S1", 100, 200)).await;
        let before = harness.store.inner.session(&session_key("S1", "bob")).await.unwrap();

        harness.store.fail(op);
        let disposition = harness.handler.handle(&acct_stop("bob", "S1", 1000, 2000), SECRET).await;
        assert!(disposition.is_dropped(), "{:?}", op);

        let after = harness.store.inner.session(&session_key("S1", "bob")).await;
        assert_eq!(after.map(|s| s.counters), Some(before.counters), "{:?}", op);
        assert!(harness.store.inner.terminal_log().await.is_empty(), "{:?}", op);
        assert_eq!(harness.queue.records().len(), 1, "{:?}", op);

        // retried Stop after the fault clears finalizes normally
        harness.store.heal(op);
        let response = respond(&harness, &acct_stop("bob", "S1", 1000, 2000)).await;
        assert_eq!(response.reply_message().as_deref(), Some("Finished accounting."));
        assert_eq!(harness.store.inner.session_count().await, 0);
        assert_eq!(harness.store.inner.terminal_log().await.len(), 1);
    }
}

#[tokio::test]
async fn test_failed_update_leaves_store_unchanged() {
    for op in [Op::Begin, Op::Update, Op::Commit] {
        let harness = started(UsageNotify::AfterCommit).await;

        harness.store.fail(op);
        let disposition = harness.handler.handle(&acct_update("bob", "S1", 100, 200), SECRET).await;
        assert!(disposition.is_dropped(), "{:?}", op);

        let session = harness.store.inner.session(&session_key("S1", "bob")).await.unwrap();
        assert_eq!(session.counters, SessionCounters::default(), "{:?}", op);
        assert!(harness.queue.records().is_empty(), "{:?}", op);
    }
}

#[tokio::test]
async fn test_usage_enqueued_before_commit() {
    let harness = started(UsageNotify::BeforeCommit).await;
    respond(&harness, &acct_update("bob", "S1", 100, 200)).await;
    respond(&harness, &acct_stop("bob", "S1", 1000, 2000)).await;

    assert_eq!(harness.events(), vec!["enqueue", "commit", "enqueue", "commit"]);
}

#[tokio::test]
async fn test_usage_enqueued_after_commit() {
    let harness = started(UsageNotify::AfterCommit).await;
    respond(&harness, &acct_update("bob", "S1", 100, 200)).await;
    respond(&harness, &acct_stop("bob", "S1", 1000, 2000)).await;

    assert_eq!(harness.events(), vec!["commit", "enqueue", "commit", "enqueue"]);
}

#[tokio::test]
async fn test_commit_failure_after_enqueue_keeps_record() {
    let harness = started(UsageNotify::BeforeCommit).await;
    harness.store.fail(Op::Commit);

    let disposition = harness.handler.handle(&acct_stop("bob", "S1", 1000, 2000), SECRET).await;
    assert!(disposition.is_dropped());
    assert_eq!(harness.store.inner.session_count().await, 1);
    assert_eq!(harness.queue.records().len(), 1);
}

#[tokio::test]
async fn test_sessions_are_keyed_by_user_and_nas() {
    let harness = Harness::new(
        &[UserPolicy::new("bob", "secret"), UserPolicy::new("carol", "secret")],
        EngineOptions::default(),
    );
    respond(&harness, &acct_start("bob", "S1")).await;
    respond(&harness, &acct_start("carol", "S1")).await;
    assert_eq!(harness.store.inner.session_count().await, 2);

    respond(&harness, &acct_stop("bob", "S1", 1, 2)).await;
    assert!(harness.store.inner.session(&session_key("S1", "carol")).await.is_some());
    assert!(harness.store.inner.session(&session_key("S1", "bob")).await.is_none());
}

#[tokio::test]
async fn test_open_sessions_count_toward_limit() {
    let mut bob = UserPolicy::new("bob", "secret");
    bob.simultaneous_use = 1;
    let harness = Harness::new(&[bob], EngineOptions::default());

    let accept = respond(&harness, &common::pap_request("bob", b"secret")).await;
    assert_eq!(accept.code, Code::AccessAccept);

    respond(&harness, &acct_start("bob", "S1")).await;
    let reject = respond(&harness, &common::pap_request("bob", b"secret")).await;
    assert_eq!(reject.reply_message().as_deref(), Some("Max conns reached"));

    respond(&harness, &acct_stop("bob", "S1", 1, 2)).await;
    let accept = respond(&harness, &common::pap_request("bob", b"secret")).await;
    assert_eq!(accept.code, Code::AccessAccept);
}
