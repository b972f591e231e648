// End-to-end call lifecycle tests — the session driven by the real async
// driver with a paused tokio clock, an in-memory store, and mock
// sound/notifier collaborators. No real time passes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::Connection;
use truthshield::account::Account;
use truthshield::ai::traits::NoopAnalyzer;
use truthshield::alert::{Notifier, WarningSound};
use truthshield::call::driver::{run_call, CallScript};
use truthshield::call::{CallAction, CallState, IncomingCall};
use truthshield::db::models::{CallDirection, RiskStatus};
use truthshield::db::schema::create_tables;
use truthshield::db::sqlite::SqliteStore;
use truthshield::db::ProfileStore;
use truthshield::directory::{MemoryDirectory, ReputationDirectory};

struct RecordingSound {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingSound {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl WarningSound for RecordingSound {
    async fn play(&self) {
        self.events.lock().unwrap().push("play");
    }

    async fn stop(&self) {
        self.events.lock().unwrap().push("stop");
    }
}

struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _message: &str) {}
}

async fn test_account() -> Account {
    let conn = Connection::open_in_memory().unwrap();
    create_tables(&conn).unwrap();
    let store: Arc<dyn ProfileStore> = Arc::new(SqliteStore::new(conn));
    let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
    let (account, _) = Account::login(store, "0905555555", today).await.unwrap();
    account
}

fn incoming(number: &str, override_risk: Option<RiskStatus>) -> IncomingCall {
    IncomingCall {
        id: format!("call-{number}"),
        phone_number: number.to_string(),
        contact_name: None,
        direction: CallDirection::Incoming,
        timestamp_ms: 1_700_000_000_000,
        override_risk,
    }
}

fn directory() -> Arc<dyn ReputationDirectory> {
    Arc::new(MemoryDirectory::new())
}

#[tokio::test(start_paused = true)]
async fn dangerous_call_auto_ends_with_consent() {
    let mut account = test_account().await;
    account.set_auto_hangup(true).await.unwrap();
    let sound = RecordingSound::new();

    let outcome = run_call(
        incoming("0888999000", Some(RiskStatus::Scam)),
        &mut account,
        directory(),
        &NoopAnalyzer,
        sound.clone(),
        &SilentNotifier,
        CallScript::default(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_state, CallState::AutoEnded);
    let record = outcome.record.expect("auto-hangup persists a record");
    assert_eq!(record.risk_status, Some(RiskStatus::Scam));
    assert_eq!(record.duration_secs, 0);
    assert!(record.ai_analysis.is_some());

    // Exactly one history entry, and the tone played before it stopped
    assert_eq!(account.profile.call_history.len(), 1);
    assert_eq!(sound.events(), vec!["play", "stop"]);
}

#[tokio::test(start_paused = true)]
async fn dangerous_call_without_consent_rings_until_declined() {
    let mut account = test_account().await;
    assert!(!account.profile.auto_hangup_high_risk);
    let sound = RecordingSound::new();

    let outcome = run_call(
        incoming("0888999000", Some(RiskStatus::Scam)),
        &mut account,
        directory(),
        &NoopAnalyzer,
        sound.clone(),
        &SilentNotifier,
        CallScript {
            // Well past the 3-second countdown that must never arm
            actions: vec![(Duration::from_millis(5500), CallAction::Decline)],
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_state, CallState::Ended);
    assert_eq!(account.profile.call_history.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn accept_wins_over_late_decline() {
    let mut account = test_account().await;

    let outcome = run_call(
        incoming("0909999999", None),
        &mut account,
        directory(),
        &NoopAnalyzer,
        RecordingSound::new(),
        &SilentNotifier,
        CallScript {
            actions: vec![
                (Duration::from_millis(500), CallAction::Accept),
                // Arrives after accept — must be dropped, not queued
                (Duration::from_millis(700), CallAction::Decline),
                (Duration::from_millis(3500), CallAction::Hangup),
            ],
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_state, CallState::Ended);
    assert_eq!(account.profile.call_history.len(), 1);
    let record = outcome.record.unwrap();
    // Connected from 0.5s to 3.5s: the 1-second ticker fired three times
    assert_eq!(record.duration_secs, 3);
}

#[tokio::test(start_paused = true)]
async fn block_and_decline_updates_blocked_set() {
    let mut account = test_account().await;

    let outcome = run_call(
        incoming("0977123456", Some(RiskStatus::Scam)),
        &mut account,
        directory(),
        &NoopAnalyzer,
        RecordingSound::new(),
        &SilentNotifier,
        CallScript {
            actions: vec![(Duration::from_secs(1), CallAction::BlockAndDecline)],
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_state, CallState::Blocked);
    assert!(account.profile.is_blocked("0977123456"));
    assert_eq!(outcome.record.unwrap().duration_secs, 0);
}

#[tokio::test(start_paused = true)]
async fn call_from_blocked_number_is_rejected_immediately() {
    let mut account = test_account().await;
    account.block_number("0912349999").await.unwrap();

    let outcome = run_call(
        incoming("0912349999", None),
        &mut account,
        directory(),
        &NoopAnalyzer,
        RecordingSound::new(),
        &SilentNotifier,
        CallScript::default(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_state, CallState::Ended);
    assert_eq!(account.profile.call_history.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn community_data_upgrades_ringing_call_and_plays_warning() {
    let mut account = test_account().await;
    let sound = RecordingSound::new();

    // No override: the call starts suspicious; the seeded directory entry
    // for this number (scam, 1542 reports) arrives ~400ms in and upgrades it
    let outcome = run_call(
        incoming("0888999000", None),
        &mut account,
        directory(),
        &NoopAnalyzer,
        sound.clone(),
        &SilentNotifier,
        CallScript {
            actions: vec![(Duration::from_secs(2), CallAction::Decline)],
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_state, CallState::Ended);
    assert_eq!(sound.events(), vec!["play", "stop"]);
    let record = outcome.record.unwrap();
    let community = record.community.expect("lookup resolved before decline");
    assert_eq!(community.report_count, 1542);
}

#[tokio::test(start_paused = true)]
async fn safe_contact_call_plays_no_warning() {
    let mut account = test_account().await;
    let sound = RecordingSound::new();

    // 0912345678 is "Bố" in the default contacts
    let outcome = run_call(
        incoming("0912345678", None),
        &mut account,
        directory(),
        &NoopAnalyzer,
        sound.clone(),
        &SilentNotifier,
        CallScript {
            actions: vec![
                (Duration::from_millis(500), CallAction::Accept),
                (Duration::from_millis(2500), CallAction::Hangup),
            ],
        },
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_state, CallState::Ended);
    // Accept and hangup both stop the (never-started) tone; no play
    assert!(!sound.events().contains(&"play"));
    let record = outcome.record.unwrap();
    assert_eq!(record.contact_name.as_deref(), Some("Bố"));
    // Known contact heuristic from the fallback analyzer
    assert_eq!(record.ai_analysis.unwrap().risk_score, 5);
}

#[tokio::test(start_paused = true)]
async fn unanswered_call_times_out_as_declined() {
    let mut account = test_account().await;

    let outcome = run_call(
        incoming("0909999999", None),
        &mut account,
        directory(),
        &NoopAnalyzer,
        RecordingSound::new(),
        &SilentNotifier,
        CallScript::default(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.final_state, CallState::Ended);
    let record = outcome.record.unwrap();
    assert_eq!(record.duration_secs, 0);
    // Short unknown call scores as a flash call in the fallback analysis
    assert_eq!(record.ai_analysis.unwrap().risk_score, 75);
}
