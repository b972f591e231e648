// Account — the injectable state-holder around the user aggregate.
//
// Replaces ambient global access to the profile: whoever needs the profile
// gets an Account (or a reference) and mutates it through this API. Every
// mutation is a full read-modify-persist cycle so the stored aggregate is
// always whole (last writer wins), and the store's watch channel tells other
// open instances to reload.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;

use crate::db::models::{
    CallAnalysis, CallRecord, Contact, DeepfakeRecord, MessageRecord, SubscriptionPlan,
    UserProfile,
};
use crate::db::ProfileStore;
use crate::gate::{self, Feature};

/// Session-state key holding the active login token.
pub const SESSION_TOKEN_KEY: &str = "token";

/// Contacts pre-filled on first login, standing in for device contacts.
const DEFAULT_CONTACTS: &[(&str, &str)] = &[
    ("Mẹ Yêu", "0901234567"),
    ("Bố", "0912345678"),
    ("Anh Trai", "0987654321"),
    ("Chị Gái", "0999888777"),
];

pub struct Account {
    token: String,
    pub profile: UserProfile,
    store: Arc<dyn ProfileStore>,
}

impl Account {
    /// Log in with a phone number: reload the stored profile for it, or
    /// create a fresh one with the default contacts. Applies the daily usage
    /// reset before anything can read the counters. Returns the account and
    /// whether a new profile was created.
    pub async fn login(
        store: Arc<dyn ProfileStore>,
        phone: &str,
        today: NaiveDate,
    ) -> Result<(Self, bool)> {
        let token = format!("tok-{phone}");
        let stored = store.load_profile(&token).await?;
        let created = stored.is_none();

        let mut profile = match stored {
            Some(profile) if profile.phone == phone => profile,
            _ => {
                let mut fresh = UserProfile::new(phone, today);
                fresh.contacts = DEFAULT_CONTACTS
                    .iter()
                    .map(|(name, phone)| Contact {
                        id: (*phone).to_string(),
                        name: (*name).to_string(),
                        phone: (*phone).to_string(),
                    })
                    .collect();
                info!(phone, "created new profile");
                fresh
            }
        };

        gate::reset_usage_if_new_day(&mut profile, today);
        store.save_profile(&token, &profile).await?;
        store.set_session_state(SESSION_TOKEN_KEY, &token).await?;

        Ok((
            Self {
                token,
                profile,
                store,
            },
            created,
        ))
    }

    /// Resume the logged-in session, if any. Applies (and persists) the
    /// daily usage reset before handing the profile out.
    pub async fn resume(store: Arc<dyn ProfileStore>, today: NaiveDate) -> Result<Option<Self>> {
        let Some(token) = store.get_session_state(SESSION_TOKEN_KEY).await? else {
            return Ok(None);
        };
        let Some(mut profile) = store.load_profile(&token).await? else {
            return Ok(None);
        };

        if gate::reset_usage_if_new_day(&mut profile, today) {
            store.save_profile(&token, &profile).await?;
        }

        Ok(Some(Self {
            token,
            profile,
            store,
        }))
    }

    /// Clear the login token and the cached profile.
    pub async fn logout(store: &Arc<dyn ProfileStore>) -> Result<()> {
        if let Some(token) = store.get_session_state(SESSION_TOKEN_KEY).await? {
            store.delete_profile(&token).await?;
        }
        store.clear_session_state(SESSION_TOKEN_KEY).await?;
        Ok(())
    }

    pub async fn save(&self) -> Result<()> {
        self.store.save_profile(&self.token, &self.profile).await
    }

    // --- Mutations (each persists the whole aggregate) ---

    /// Append a finished call to the history.
    pub async fn record_call(&mut self, record: CallRecord) -> Result<()> {
        self.profile.call_history.push(record);
        self.save().await
    }

    /// Overwrite a call's analysis — the explicit re-analysis path, the only
    /// operation allowed to replace an existing `ai_analysis`.
    pub async fn reanalyze_call(&mut self, call_id: &str, analysis: CallAnalysis) -> Result<bool> {
        let Some(record) = self
            .profile
            .call_history
            .iter_mut()
            .find(|r| r.id == call_id)
        else {
            return Ok(false);
        };
        record.ai_analysis = Some(analysis);
        self.save().await?;
        Ok(true)
    }

    pub async fn record_message(&mut self, record: MessageRecord) -> Result<()> {
        self.profile.message_history.push(record);
        self.save().await
    }

    pub async fn record_deepfake(&mut self, record: DeepfakeRecord) -> Result<()> {
        self.profile.deepfake_history.push(record);
        self.save().await
    }

    pub async fn block_number(&mut self, phone: &str) -> Result<()> {
        if self.profile.blocked_numbers.insert(phone.to_string()) {
            info!(phone, "number blocked");
            self.save().await?;
        }
        Ok(())
    }

    pub async fn unblock_number(&mut self, phone: &str) -> Result<()> {
        if self.profile.blocked_numbers.remove(phone) {
            self.save().await?;
        }
        Ok(())
    }

    /// Add a contact; numbers already saved keep their existing entry.
    pub async fn add_contact(&mut self, name: &str, phone: &str) -> Result<bool> {
        if self.profile.contact_name(phone).is_some() {
            return Ok(false);
        }
        self.profile.contacts.push(Contact {
            id: phone.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
        });
        self.save().await?;
        Ok(true)
    }

    pub async fn upgrade(&mut self, plan: SubscriptionPlan) -> Result<()> {
        self.profile.plan = plan;
        self.save().await
    }

    pub async fn set_auto_hangup(&mut self, enabled: bool) -> Result<()> {
        self.profile.auto_hangup_high_risk = enabled;
        self.save().await
    }

    /// Clamped to the supported 50–95 range.
    pub async fn set_risk_threshold(&mut self, threshold: u8) -> Result<()> {
        self.profile.risk_threshold = threshold.clamp(50, 95);
        self.save().await
    }

    /// Count one use of a gated feature (no-op on paid plans) and persist.
    pub async fn consume(&mut self, feature: Feature) -> Result<()> {
        if gate::increment_usage(&mut self.profile, feature) {
            self.save().await?;
        }
        Ok(())
    }
}
