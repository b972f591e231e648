// Data models — the user aggregate and the records nested inside it.
//
// The whole profile is persisted as one JSON document (see db/sqlite.rs),
// so these types are plain serde structs. They're separate from the store
// so the classifier, gate, and call modules can use them without depending
// on rusqlite directly.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Subscription plan. Free is quota-limited; paid plans are unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    Free,
    Monthly,
    Yearly,
}

impl SubscriptionPlan {
    pub fn is_paid(&self) -> bool {
        matches!(self, SubscriptionPlan::Monthly | SubscriptionPlan::Yearly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Free => "free",
            SubscriptionPlan::Monthly => "monthly",
            SubscriptionPlan::Yearly => "yearly",
        }
    }
}

/// Explicit risk label attached to a call, either by a simulation trigger
/// or forced by auto-hangup (`Scam`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskStatus {
    Safe,
    Suspicious,
    Scam,
}

impl RiskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::Safe => "safe",
            RiskStatus::Suspicious => "suspicious",
            RiskStatus::Scam => "scam",
        }
    }
}

impl std::fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Community tag on a phone number in the reputation directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberTag {
    Scam,
    Spam,
    Safe,
    Delivery,
    Business,
}

/// Community/carrier reputation record for a phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneLookupResult {
    pub phone_number: String,
    pub carrier: String,
    pub tags: Vec<NumberTag>,
    pub report_count: u32,
    /// 0–100, 100 = fully trusted
    pub reputation_score: u8,
    pub community_label: String,
}

impl PhoneLookupResult {
    pub fn is_flagged_scam(&self) -> bool {
        self.tags.contains(&NumberTag::Scam)
    }
}

/// Direction of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallDirection {
    Incoming,
    Outgoing,
}

/// AI (or fallback) analysis attached to a finished call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallAnalysis {
    /// 0–100, higher = more dangerous
    pub risk_score: u8,
    pub explanation: String,
    pub timestamp_ms: i64,
}

/// A single call event in the user's history.
///
/// Created when the call reaches a terminal state; `ai_analysis` is written
/// once and only overwritten by an explicit re-analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    pub direction: CallDirection,
    pub timestamp_ms: i64,
    /// Connected seconds — 0 for calls that never left ringing.
    pub duration_secs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_status: Option<RiskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_recording: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<CallAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<PhoneLookupResult>,
}

/// One analyzed message in the user's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub content: String,
    pub result: RiskStatus,
    pub explanation: String,
    pub timestamp_ms: i64,
}

/// One media forensic scan in the user's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepfakeRecord {
    pub id: String,
    pub file_name: String,
    pub media_kind: String,
    pub is_deepfake: bool,
    /// 0–100, 100 = definitely fake
    pub confidence_score: u8,
    pub explanation: String,
    pub timestamp_ms: i64,
}

/// A saved contact. Contacts are unique by phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub phone: String,
}

/// Daily usage counters for the free tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounters {
    pub deepfake_scans: u32,
    pub message_scans: u32,
    pub call_lookups: u32,
    /// Device-local calendar date of the last reset (YYYY-MM-DD).
    pub last_reset_date: NaiveDate,
}

impl UsageCounters {
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            deepfake_scans: 0,
            message_scans: 0,
            call_lookups: 0,
            last_reset_date: today,
        }
    }
}

/// The user aggregate. Persisted wholesale as JSON; every mutation is a full
/// read-modify-persist cycle (last writer wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub contacts: Vec<Contact>,
    pub blocked_numbers: BTreeSet<String>,
    pub auto_hangup_high_risk: bool,
    /// 50–95. Stored and displayed; not consumed by the classifier.
    pub risk_threshold: u8,
    pub plan: SubscriptionPlan,
    pub usage: UsageCounters,
    pub call_history: Vec<CallRecord>,
    pub message_history: Vec<MessageRecord>,
    pub deepfake_history: Vec<DeepfakeRecord>,
}

impl UserProfile {
    /// A brand-new free-tier profile, as created on first login.
    pub fn new(phone: &str, today: NaiveDate) -> Self {
        Self {
            id: format!("user-{phone}"),
            name: "Người dùng".to_string(),
            phone: phone.to_string(),
            contacts: Vec::new(),
            blocked_numbers: BTreeSet::new(),
            auto_hangup_high_risk: false,
            risk_threshold: 70,
            plan: SubscriptionPlan::Free,
            usage: UsageCounters::fresh(today),
            call_history: Vec::new(),
            message_history: Vec::new(),
            deepfake_history: Vec::new(),
        }
    }

    /// Look up a saved contact's name by phone number.
    pub fn contact_name(&self, phone: &str) -> Option<&str> {
        self.contacts
            .iter()
            .find(|c| c.phone == phone)
            .map(|c| c.name.as_str())
    }

    pub fn is_blocked(&self, phone: &str) -> bool {
        self.blocked_numbers.contains(phone)
    }
}
