// Free-tier usage gating — daily quotas on the AI-backed features.
//
// Paid plans bypass the gate entirely and are never counted. The gate never
// errors: `check_limit` answering false means "present the upgrade prompt
// and do not perform the action".

use chrono::NaiveDate;
use tracing::debug;

use crate::db::models::UserProfile;

/// Free-tier daily quotas.
pub const FREE_DEEPFAKE_SCANS: u32 = 3;
pub const FREE_MESSAGE_SCANS: u32 = 2;
pub const FREE_CALL_LOOKUPS: u32 = 5;

/// A quota-limited feature. Exhaustive by construction — there is no way to
/// ask the gate about a feature it doesn't know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    DeepfakeScan,
    MessageScan,
    CallLookup,
}

impl Feature {
    pub fn quota(self) -> u32 {
        match self {
            Feature::DeepfakeScan => FREE_DEEPFAKE_SCANS,
            Feature::MessageScan => FREE_MESSAGE_SCANS,
            Feature::CallLookup => FREE_CALL_LOOKUPS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Feature::DeepfakeScan => "kiểm tra deepfake",
            Feature::MessageScan => "phân tích tin nhắn",
            Feature::CallLookup => "tra cứu số điện thoại",
        }
    }

    fn counter(self, profile: &UserProfile) -> u32 {
        match self {
            Feature::DeepfakeScan => profile.usage.deepfake_scans,
            Feature::MessageScan => profile.usage.message_scans,
            Feature::CallLookup => profile.usage.call_lookups,
        }
    }
}

/// Zero the counters if the stored reset date is not today.
///
/// Must run on every profile load, before any `check_limit` or
/// `increment_usage`. Idempotent: a second call on the same date is a no-op.
/// Returns true when a reset actually happened (the caller should persist).
pub fn reset_usage_if_new_day(profile: &mut UserProfile, today: NaiveDate) -> bool {
    if profile.usage.last_reset_date == today {
        return false;
    }
    debug!(
        last_reset = %profile.usage.last_reset_date,
        today = %today,
        "Resetting daily usage counters"
    );
    profile.usage.deepfake_scans = 0;
    profile.usage.message_scans = 0;
    profile.usage.call_lookups = 0;
    profile.usage.last_reset_date = today;
    true
}

/// May the user perform this feature right now?
///
/// Paid plans always pass. Free plans pass while the counter is strictly
/// below the quota.
pub fn check_limit(profile: &UserProfile, feature: Feature) -> bool {
    if profile.plan.is_paid() {
        return true;
    }
    feature.counter(profile) < feature.quota()
}

/// Count one successful use of the feature. No-op for paid plans.
///
/// Call only after the gated operation succeeded, never speculatively.
/// Returns true when a counter changed (the caller should persist).
pub fn increment_usage(profile: &mut UserProfile, feature: Feature) -> bool {
    if profile.plan.is_paid() {
        return false;
    }
    match feature {
        Feature::DeepfakeScan => profile.usage.deepfake_scans += 1,
        Feature::MessageScan => profile.usage.message_scans += 1,
        Feature::CallLookup => profile.usage.call_lookups += 1,
    }
    true
}

/// Remaining uses today, for display. `None` means unlimited (paid plan).
pub fn remaining(profile: &UserProfile, feature: Feature) -> Option<u32> {
    if profile.plan.is_paid() {
        return None;
    }
    Some(feature.quota().saturating_sub(feature.counter(profile)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::SubscriptionPlan;

    fn profile(today: NaiveDate) -> UserProfile {
        UserProfile::new("0901234567", today)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    #[test]
    fn free_plan_blocks_at_quota() {
        let mut p = profile(today());
        p.usage.message_scans = FREE_MESSAGE_SCANS;
        assert!(!check_limit(&p, Feature::MessageScan));
        // Other counters unaffected
        assert!(check_limit(&p, Feature::DeepfakeScan));
    }

    #[test]
    fn free_plan_passes_below_quota() {
        let mut p = profile(today());
        p.usage.message_scans = FREE_MESSAGE_SCANS - 1;
        assert!(check_limit(&p, Feature::MessageScan));
    }

    #[test]
    fn paid_plan_ignores_counters() {
        let mut p = profile(today());
        p.plan = SubscriptionPlan::Monthly;
        p.usage.deepfake_scans = 100;
        assert!(check_limit(&p, Feature::DeepfakeScan));
        assert_eq!(remaining(&p, Feature::DeepfakeScan), None);
    }

    #[test]
    fn upgrade_unblocks_without_resetting_counters() {
        let mut p = profile(today());
        p.usage.deepfake_scans = FREE_DEEPFAKE_SCANS;
        assert!(!check_limit(&p, Feature::DeepfakeScan));
        p.plan = SubscriptionPlan::Monthly;
        assert!(check_limit(&p, Feature::DeepfakeScan));
        assert_eq!(p.usage.deepfake_scans, FREE_DEEPFAKE_SCANS);
    }

    #[test]
    fn increment_counts_only_free_plans() {
        let mut p = profile(today());
        assert!(increment_usage(&mut p, Feature::CallLookup));
        assert_eq!(p.usage.call_lookups, 1);
        p.plan = SubscriptionPlan::Yearly;
        assert!(!increment_usage(&mut p, Feature::CallLookup));
        assert_eq!(p.usage.call_lookups, 1);
    }

    #[test]
    fn daily_reset_zeroes_all_counters() {
        let yesterday = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let mut p = profile(yesterday);
        p.usage.deepfake_scans = 3;
        p.usage.message_scans = 2;
        p.usage.call_lookups = 5;
        assert!(reset_usage_if_new_day(&mut p, today()));
        assert_eq!(p.usage.deepfake_scans, 0);
        assert_eq!(p.usage.message_scans, 0);
        assert_eq!(p.usage.call_lookups, 0);
        assert_eq!(p.usage.last_reset_date, today());
    }

    #[test]
    fn daily_reset_is_idempotent() {
        let yesterday = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let mut p = profile(yesterday);
        assert!(reset_usage_if_new_day(&mut p, today()));
        p.usage.message_scans = 1;
        assert!(!reset_usage_if_new_day(&mut p, today()));
        // Second call on the same date leaves counters untouched
        assert_eq!(p.usage.message_scans, 1);
    }

    #[test]
    fn remaining_counts_down() {
        let mut p = profile(today());
        assert_eq!(remaining(&p, Feature::CallLookup), Some(FREE_CALL_LOOKUPS));
        increment_usage(&mut p, Feature::CallLookup);
        assert_eq!(
            remaining(&p, Feature::CallLookup),
            Some(FREE_CALL_LOOKUPS - 1)
        );
    }
}
