// Composition tests — verifying that the pieces chain together correctly:
//   directory -> classifier -> session -> record -> account -> store
// without any network calls; only the in-memory directory and an in-memory
// SQLite store.

use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Connection;
use truthshield::account::Account;
use truthshield::call::{CallAction, CallSession, CallState, Effect, IncomingCall};
use truthshield::classifier::{classify_tier, RiskTier};
use truthshield::db::models::{CallDirection, RiskStatus, SubscriptionPlan};
use truthshield::db::schema::create_tables;
use truthshield::db::sqlite::SqliteStore;
use truthshield::db::ProfileStore;
use truthshield::directory::{MemoryDirectory, ReportKind, ReputationDirectory};
use truthshield::gate::{self, Feature};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
}

fn store() -> Arc<dyn ProfileStore> {
    let conn = Connection::open_in_memory().unwrap();
    create_tables(&conn).unwrap();
    Arc::new(SqliteStore::new(conn))
}

fn incoming(number: &str) -> IncomingCall {
    IncomingCall {
        id: format!("call-{number}"),
        phone_number: number.to_string(),
        contact_name: None,
        direction: CallDirection::Incoming,
        timestamp_ms: 1_700_000_000_000,
        override_risk: None,
    }
}

// ============================================================
// Chain: directory -> classifier
// ============================================================

#[tokio::test]
async fn seeded_scam_number_classifies_dangerous() {
    let directory = MemoryDirectory::new();
    let info = directory.lookup("0888999000").await.unwrap().unwrap();
    assert_eq!(classify_tier(None, None, Some(&info)), RiskTier::Dangerous);
}

#[tokio::test]
async fn seeded_safe_number_still_needs_a_contact() {
    // A trusted-directory number is not a saved contact: suspicious residual
    let directory = MemoryDirectory::new();
    let info = directory.lookup("0909112233").await.unwrap().unwrap();
    assert_eq!(classify_tier(None, None, Some(&info)), RiskTier::Suspicious);
    assert_eq!(
        classify_tier(Some("Shipper"), None, Some(&info)),
        RiskTier::Safe
    );
}

#[tokio::test]
async fn community_report_escalates_future_classification() {
    let directory = MemoryDirectory::new();
    let number = "0944000111";
    assert!(directory.lookup(number).await.unwrap().is_none());

    for _ in 0..5 {
        directory
            .report(number, ReportKind::Scam, "Giả danh điện lực")
            .await
            .unwrap();
    }

    let info = directory.lookup(number).await.unwrap().unwrap();
    assert_eq!(classify_tier(None, None, Some(&info)), RiskTier::Dangerous);
}

// ============================================================
// Chain: directory -> session -> record -> account
// ============================================================

#[tokio::test]
async fn declined_scam_call_lands_in_history_with_community_info() {
    let directory = MemoryDirectory::new();
    let store = store();
    let (mut account, _) = Account::login(store, "0905555555", today()).await.unwrap();

    let (mut session, _) = CallSession::new(incoming("0912349999"), false);
    let info = directory.lookup("0912349999").await.unwrap().unwrap();
    session.community_resolved(info);
    assert_eq!(session.tier(), RiskTier::Dangerous);

    let effects = session.apply(CallAction::Decline);
    let record = effects
        .into_iter()
        .find_map(|e| match e {
            Effect::SaveRecord(r) => Some(r),
            _ => None,
        })
        .unwrap();
    account.record_call(record).await.unwrap();

    assert_eq!(account.profile.call_history.len(), 1);
    let saved = &account.profile.call_history[0];
    assert_eq!(saved.community.as_ref().unwrap().report_count, 2300);
}

#[tokio::test]
async fn history_survives_reload_through_the_store() {
    let store = store();
    let (mut account, _) = Account::login(store.clone(), "0905555555", today())
        .await
        .unwrap();

    let (mut session, _) = CallSession::new(incoming("0909999999"), false);
    let effects = session.apply(CallAction::Decline);
    let record = effects
        .into_iter()
        .find_map(|e| match e {
            Effect::SaveRecord(r) => Some(r),
            _ => None,
        })
        .unwrap();
    account.record_call(record).await.unwrap();

    let reloaded = Account::resume(store, today()).await.unwrap().unwrap();
    assert_eq!(reloaded.profile.call_history.len(), 1);
    assert_eq!(reloaded.profile.call_history[0].phone_number, "0909999999");
}

// ============================================================
// Chain: gate -> account -> store
// ============================================================

#[tokio::test]
async fn gate_walks_to_exhaustion_and_upgrade_unblocks() {
    let store = store();
    let (mut account, _) = Account::login(store, "0905555555", today()).await.unwrap();

    for _ in 0..gate::FREE_MESSAGE_SCANS {
        assert!(gate::check_limit(&account.profile, Feature::MessageScan));
        account.consume(Feature::MessageScan).await.unwrap();
    }
    assert!(!gate::check_limit(&account.profile, Feature::MessageScan));

    account.upgrade(SubscriptionPlan::Monthly).await.unwrap();
    assert!(gate::check_limit(&account.profile, Feature::MessageScan));
    // Paid consumption no longer moves the counter
    account.consume(Feature::MessageScan).await.unwrap();
    assert_eq!(
        account.profile.usage.message_scans,
        gate::FREE_MESSAGE_SCANS
    );
}

// ============================================================
// Chain: save -> watch notification (cross-instance sync)
// ============================================================

#[tokio::test]
async fn profile_saves_notify_subscribers() {
    let store = store();
    let mut rx = store.subscribe();
    let initial = *rx.borrow_and_update();

    let (mut account, _) = Account::login(store.clone(), "0905555555", today())
        .await
        .unwrap();
    assert!(rx.has_changed().unwrap());
    rx.borrow_and_update();

    account.block_number("0888999000").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(*rx.borrow_and_update() > initial);
}

// ============================================================
// Full ringing flow without the driver: state machine invariants
// ============================================================

#[test]
fn session_connected_flow_counts_duration() {
    let (mut session, _) = CallSession::new(incoming("0909999999"), false);
    session.apply(CallAction::Accept);
    assert_eq!(session.state(), CallState::Connected);
    for _ in 0..125 {
        session.tick();
    }
    let effects = session.apply(CallAction::Hangup);
    let record = effects
        .into_iter()
        .find_map(|e| match e {
            Effect::SaveRecord(r) => Some(r),
            _ => None,
        })
        .unwrap();
    assert_eq!(record.duration_secs, 125);
    assert_eq!(record.risk_status, None);
}

#[test]
fn simulated_scam_keeps_override_in_declined_record() {
    let mut call = incoming("0888999000");
    call.override_risk = Some(RiskStatus::Scam);
    let (mut session, effects) = CallSession::new(call, false);
    assert!(effects.contains(&Effect::StartWarning));

    let effects = session.apply(CallAction::Decline);
    let record = effects
        .into_iter()
        .find_map(|e| match e {
            Effect::SaveRecord(r) => Some(r),
            _ => None,
        })
        .unwrap();
    assert_eq!(record.risk_status, Some(RiskStatus::Scam));
}
