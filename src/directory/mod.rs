// Community reputation directory — the lookup/report collaborator.
//
// Backed by a seeded in-memory table standing in for the shared community
// database. Lookups are async and deliberately non-instant so callers must
// handle results arriving mid-call (or after it ended).

pub mod seed;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Duration;
use tracing::debug;

use crate::db::models::{NumberTag, PhoneLookupResult};

/// Simulated round-trip to the community database.
const LOOKUP_LATENCY: Duration = Duration::from_millis(400);
const REPORT_LATENCY: Duration = Duration::from_millis(800);

/// What a community report classifies a number as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Scam,
    Spam,
    Safe,
}

impl ReportKind {
    fn tag(self) -> NumberTag {
        match self {
            ReportKind::Scam => NumberTag::Scam,
            ReportKind::Spam => NumberTag::Spam,
            ReportKind::Safe => NumberTag::Safe,
        }
    }
}

/// Reputation lookup collaborator. Absence (`None`) is a normal answer, not
/// an error.
#[async_trait]
pub trait ReputationDirectory: Send + Sync {
    async fn lookup(&self, phone: &str) -> Result<Option<PhoneLookupResult>>;
    async fn report(&self, phone: &str, kind: ReportKind, label: &str) -> Result<()>;
}

/// In-memory directory seeded with known scam/spam/safe numbers.
///
/// Reports mutate the table for the rest of the session; entries are never
/// deleted.
pub struct MemoryDirectory {
    entries: RwLock<HashMap<String, PhoneLookupResult>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        for entry in seed::seed_entries() {
            entries.insert(normalize(&entry.phone_number), entry);
        }
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip whitespace so "090 123 4567" and "0901234567" hit the same entry.
fn normalize(phone: &str) -> String {
    phone.split_whitespace().collect()
}

#[async_trait]
impl ReputationDirectory for MemoryDirectory {
    async fn lookup(&self, phone: &str) -> Result<Option<PhoneLookupResult>> {
        tokio::time::sleep(LOOKUP_LATENCY).await;
        let entries = self.entries.read().await;
        let result = entries.get(&normalize(phone)).cloned();
        debug!(phone, found = result.is_some(), "directory lookup");
        Ok(result)
    }

    async fn report(&self, phone: &str, kind: ReportKind, label: &str) -> Result<()> {
        tokio::time::sleep(REPORT_LATENCY).await;
        let key = normalize(phone);
        let mut entries = self.entries.write().await;
        let (previous_reports, carrier) = entries
            .get(&key)
            .map_or((0, "Unknown".to_string()), |e| {
                (e.report_count, e.carrier.clone())
            });
        entries.insert(
            key,
            PhoneLookupResult {
                phone_number: phone.to_string(),
                carrier,
                tags: vec![kind.tag()],
                report_count: previous_reports + 1,
                reputation_score: if kind == ReportKind::Safe { 100 } else { 10 },
                community_label: label.to_string(),
            },
        );
        Ok(())
    }
}
