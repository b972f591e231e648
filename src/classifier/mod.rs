// Tiered risk classification for incoming calls.
//
// The tier decides everything the call screen does: which warning banner to
// show, whether the warning tone plays, and whether auto-hangup arms. The
// rules are evaluated in strict precedence order — safe first, so a saved
// contact can never be escalated by community data.

pub mod context;
pub mod fallback;

use crate::db::models::{PhoneLookupResult, RiskStatus};

/// Community report count at which an unknown number is treated as dangerous
/// even without an explicit scam tag.
pub const DANGEROUS_REPORT_THRESHOLD: u32 = 5;

/// Classification verdict for a ringing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskTier {
    Safe,
    Suspicious,
    Dangerous,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Safe => "safe",
            RiskTier::Suspicious => "suspicious",
            RiskTier::Dangerous => "dangerous",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a call into a tier from what is known while it rings.
///
/// Precedence, first match wins:
/// 1. Safe — explicit `safe` override, or the caller is a saved contact.
/// 2. Dangerous — explicit `scam` override, or the directory flags the
///    number (scam tag or ≥ 5 reports) and no `suspicious` override caps it.
/// 3. Suspicious — everything else, including unknown numbers with no data.
///
/// A lookup still in flight is passed as `None` and counts as "no data";
/// the tier may upgrade once the lookup resolves (see call::session for the
/// no-downgrade rule while ringing).
pub fn classify_tier(
    contact_name: Option<&str>,
    override_risk: Option<RiskStatus>,
    community: Option<&PhoneLookupResult>,
) -> RiskTier {
    let known_contact = contact_name.is_some_and(|name| !name.is_empty());
    if override_risk == Some(RiskStatus::Safe) || known_contact {
        return RiskTier::Safe;
    }

    let db_is_scam = community.is_some_and(|c| c.is_flagged_scam());
    let db_report_count = community.map_or(0, |c| c.report_count);

    let db_dangerous = db_is_scam || db_report_count >= DANGEROUS_REPORT_THRESHOLD;
    if override_risk == Some(RiskStatus::Scam)
        || (db_dangerous && override_risk != Some(RiskStatus::Suspicious))
    {
        return RiskTier::Dangerous;
    }

    RiskTier::Suspicious
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NumberTag;

    fn community(tags: Vec<NumberTag>, report_count: u32) -> PhoneLookupResult {
        PhoneLookupResult {
            phone_number: "0888999000".to_string(),
            carrier: "Vinaphone".to_string(),
            tags,
            report_count,
            reputation_score: 5,
            community_label: "Giả danh Công an".to_string(),
        }
    }

    #[test]
    fn known_contact_overrides_scam_database() {
        let info = community(vec![NumberTag::Scam], 50);
        let tier = classify_tier(Some("Mẹ Yêu"), None, Some(&info));
        assert_eq!(tier, RiskTier::Safe);
    }

    #[test]
    fn empty_contact_name_is_not_a_contact() {
        let info = community(vec![NumberTag::Scam], 50);
        let tier = classify_tier(Some(""), None, Some(&info));
        assert_eq!(tier, RiskTier::Dangerous);
    }

    #[test]
    fn explicit_scam_override_is_dangerous() {
        let tier = classify_tier(None, Some(RiskStatus::Scam), None);
        assert_eq!(tier, RiskTier::Dangerous);
    }

    #[test]
    fn suspicious_override_caps_database_escalation() {
        let info = community(vec![NumberTag::Scam], 1542);
        let tier = classify_tier(None, Some(RiskStatus::Suspicious), Some(&info));
        assert_eq!(tier, RiskTier::Suspicious);
    }

    #[test]
    fn report_count_alone_escalates() {
        let info = community(vec![], DANGEROUS_REPORT_THRESHOLD);
        assert_eq!(classify_tier(None, None, Some(&info)), RiskTier::Dangerous);
        let below = community(vec![], DANGEROUS_REPORT_THRESHOLD - 1);
        assert_eq!(classify_tier(None, None, Some(&below)), RiskTier::Suspicious);
    }

    #[test]
    fn unknown_number_defaults_to_suspicious() {
        assert_eq!(classify_tier(None, None, None), RiskTier::Suspicious);
    }

    #[test]
    fn clean_community_record_stays_suspicious() {
        let info = community(vec![], 0);
        assert_eq!(classify_tier(None, None, Some(&info)), RiskTier::Suspicious);
    }

    #[test]
    fn safe_override_beats_scam_database() {
        let info = community(vec![NumberTag::Scam], 99);
        assert_eq!(
            classify_tier(None, Some(RiskStatus::Safe), Some(&info)),
            RiskTier::Safe
        );
    }
}
