// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the dispatch engine over a real SQLite store.
//!
//! Each test creates an isolated temp-file database and a scripted mock
//! transport. Tests are independent and order-insensitive.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use mailforge_config::model::{DispatchConfig, StorageConfig};
use mailforge_core::types::{DeliveryReceipt, MailBody, OutboundEmail, Plan};
use mailforge_core::{CampaignStore, MailTransport, MailforgeError, UsageLedger};
use mailforge_dispatch::engine::{DispatchEngine, DispatchRequest};
use mailforge_storage::SqliteStore;

/// Transport that fails recipients on a scripted list and counts calls.
struct ScriptedTransport {
    fail_addresses: Vec<String>,
    fail_verify: bool,
    verify_calls: AtomicU32,
    send_calls: AtomicU32,
    sent_to: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            fail_addresses: Vec::new(),
            fail_verify: false,
            verify_calls: AtomicU32::new(0),
            send_calls: AtomicU32::new(0),
            sent_to: Mutex::new(Vec::new()),
        }
    }

    fn failing_for(addresses: &[&str]) -> Self {
        Self {
            fail_addresses: addresses.iter().map(|s| s.to_string()).collect(),
            ..Self::new()
        }
    }

    fn with_broken_verify() -> Self {
        Self {
            fail_verify: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl MailTransport for ScriptedTransport {
    async fn verify(&self) -> Result<(), MailforgeError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_verify {
            return Err(MailforgeError::Transport {
                message: "relay refused connection".into(),
                source: None,
            });
        }
        Ok(())
    }

    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailforgeError> {
        let attempt = self.send_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_addresses.contains(&email.to) {
            return Err(MailforgeError::Transport {
                message: "mailbox unavailable".into(),
                source: None,
            });
        }
        self.sent_to.lock().unwrap().push(email.to.clone());
        Ok(DeliveryReceipt {
            message_id: format!("<msg-{attempt}@test>"),
        })
    }

    fn sender_address(&self) -> &str {
        "sender@example.com"
    }
}

struct Harness {
    _dir: TempDir,
    store: Arc<SqliteStore>,
    engine: DispatchEngine,
}

async fn harness_with_config(config: DispatchConfig) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::new(StorageConfig {
        database_path: dir
            .path()
            .join("dispatch.db")
            .to_str()
            .unwrap()
            .to_string(),
        wal_mode: true,
    }));
    store.initialize().await.unwrap();

    let engine = DispatchEngine::new(
        store.clone() as Arc<dyn CampaignStore>,
        store.clone() as Arc<dyn UsageLedger>,
        config,
    );
    Harness {
        _dir: dir,
        store,
        engine,
    }
}

async fn harness() -> Harness {
    harness_with_config(fast_config()).await
}

// Tests must not wait out production stagger/backoff delays.
fn fast_config() -> DispatchConfig {
    DispatchConfig {
        stagger_ms: 1,
        retry_backoff_ms: 1,
        max_attempts: 1,
        ..DispatchConfig::default()
    }
}

fn request(recipients: &[&str]) -> DispatchRequest {
    DispatchRequest {
        user_id: 7,
        campaign_name: "launch".to_string(),
        recipients: recipients.iter().map(|s| s.to_string()).collect(),
        mail_body: MailBody {
            subject: "Hello".to_string(),
            description: "Body text".to_string(),
            html_body: None,
        },
        sender_name: "Mailforge".to_string(),
        plan: Plan::Free,
    }
}

#[tokio::test]
async fn all_successful_batch_completes_campaign() {
    let h = harness().await;
    let transport = ScriptedTransport::new();

    let outcome = h
        .engine
        .dispatch(
            &transport,
            &request(&["a@x.com", "b@x.com", "c@x.com"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(outcome.result.success);
    assert_eq!(
        (outcome.result.sent, outcome.result.failed, outcome.result.total),
        (3, 0, 3)
    );
    assert_eq!(transport.verify_calls.load(Ordering::SeqCst), 1);

    let campaign = h.store.get(&outcome.campaign_id).await.unwrap().unwrap();
    assert_eq!(campaign.sent + campaign.failed, campaign.total);
    assert_eq!(campaign.status, mailforge_core::CampaignStatus::Completed);
    assert!(campaign.completed_at.is_some());
}

#[tokio::test]
async fn partial_failure_tallies_without_aborting() {
    let h = harness().await;
    let transport = ScriptedTransport::failing_for(&["b@x.com"]);

    let outcome = h
        .engine
        .dispatch(
            &transport,
            &request(&["a@x.com", "b@x.com", "c@x.com"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(outcome.result.success, "one success makes the batch a success");
    assert_eq!(
        (outcome.result.sent, outcome.result.failed, outcome.result.total),
        (2, 1, 3)
    );
    assert_eq!(outcome.result.errors.len(), 1);
    assert!(outcome.result.errors[0].starts_with("Failed to send to b@x.com:"));

    // Recipients after the failure were still attempted, in order.
    assert_eq!(
        *transport.sent_to.lock().unwrap(),
        vec!["a@x.com".to_string(), "c@x.com".to_string()]
    );
}

#[tokio::test]
async fn candidates_are_filtered_and_deduplicated() {
    let h = harness().await;
    let transport = ScriptedTransport::new();

    let outcome = h
        .engine
        .dispatch(
            &transport,
            &request(&["not-an-email", "ayush@x.com", "ayush@x.com"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.result.total, 1);
    assert_eq!(outcome.result.sent, 1);
}

#[tokio::test]
async fn verify_failure_creates_no_campaign() {
    let h = harness().await;
    let transport = ScriptedTransport::with_broken_verify();

    let err = h
        .engine
        .dispatch(&transport, &request(&["a@x.com"]), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, MailforgeError::Config(_)));
    assert_eq!(transport.send_calls.load(Ordering::SeqCst), 0);
    assert!(h.store.list_by_user(7).await.unwrap().is_empty());
}

#[tokio::test]
async fn quota_exceeded_creates_no_campaign() {
    let h = harness().await;
    let transport = ScriptedTransport::new();
    let today = chrono::Utc::now().date_naive();

    // Free plan cap is 50.
    for _ in 0..50 {
        h.store
            .record(7, today, mailforge_core::types::DeliveryOutcome::Sent)
            .await
            .unwrap();
    }

    let err = h
        .engine
        .dispatch(&transport, &request(&["a@x.com"]), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        MailforgeError::QuotaExceeded { remaining, .. } => assert_eq!(remaining, 0),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(transport.verify_calls.load(Ordering::SeqCst), 0);
    assert!(h.store.list_by_user(7).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_batch_completes_with_zero_progress() {
    let h = harness().await;
    let transport = ScriptedTransport::new();

    let outcome = h
        .engine
        .dispatch(
            &transport,
            &request(&["definitely not an address"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!outcome.result.success);
    assert_eq!(outcome.result.total, 0);

    let campaign = h.store.get(&outcome.campaign_id).await.unwrap().unwrap();
    let view = mailforge_core::types::ProgressView::from_campaign(&campaign);
    assert_eq!(view.progress, 0);
    assert_eq!(campaign.status, mailforge_core::CampaignStatus::Completed);
}

#[tokio::test]
async fn retries_exhaust_before_tallying_failed() {
    let h = harness_with_config(DispatchConfig {
        max_attempts: 3,
        ..fast_config()
    })
    .await;
    let transport = ScriptedTransport::failing_for(&["a@x.com"]);

    let outcome = h
        .engine
        .dispatch(&transport, &request(&["a@x.com"]), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.result.failed, 1);
    assert_eq!(transport.send_calls.load(Ordering::SeqCst), 3);

    let jobs = h.store.jobs_for_campaign(&outcome.campaign_id).await.unwrap();
    assert_eq!(jobs[0].attempts, 3);
    assert_eq!(jobs[0].terminal_state.as_deref(), Some("failed"));
}

#[tokio::test]
async fn terminal_counts_stable_across_repeated_queries() {
    let h = harness().await;
    let transport = ScriptedTransport::failing_for(&["b@x.com"]);

    let outcome = h
        .engine
        .dispatch(
            &transport,
            &request(&["a@x.com", "b@x.com"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let first = h.store.get(&outcome.campaign_id).await.unwrap().unwrap();
    let second = h.store.get(&outcome.campaign_id).await.unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!((first.sent, first.failed, first.total), (1, 1, 2));
}

#[tokio::test]
async fn cancellation_stops_between_recipients() {
    let h = harness().await;
    let transport = ScriptedTransport::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = h
        .engine
        .dispatch(
            &transport,
            &request(&["a@x.com", "b@x.com"]),
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(outcome.result.sent, 0);
    assert_eq!(transport.send_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn usage_ledger_tracks_both_outcomes() {
    let h = harness().await;
    let transport = ScriptedTransport::failing_for(&["b@x.com"]);

    h.engine
        .dispatch(
            &transport,
            &request(&["a@x.com", "b@x.com"]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let usage = h
        .store
        .usage_for_day(7, chrono::Utc::now().date_naive())
        .await
        .unwrap();
    assert_eq!((usage.sent_count, usage.failed_count), (1, 1));
}
