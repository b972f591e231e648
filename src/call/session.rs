// Call lifecycle state machine.
//
// The session is a pure event/effect structure: every input returns the list
// of side effects the driver must perform. No timers or I/O live here, which
// is what makes the transition rules testable without sleeping.
//
//   ringing ──accept──▶ connected ──hangup──▶ ended
//      │ ├──decline──────────────────────────▶ ended
//      │ ├──block+decline─────────────────────▶ blocked
//      │ └──auto-hangup (dangerous + consent)─▶ auto_ended
//
// ended / auto_ended / blocked are terminal; a new session is created for
// the next call.

use std::time::Duration;

use crate::classifier::{classify_tier, RiskTier};
use crate::db::models::{CallDirection, CallRecord, PhoneLookupResult, RiskStatus};

/// Countdown before a dangerous call is hung up automatically.
pub const AUTO_HANGUP_DELAY: Duration = Duration::from_secs(3);
/// Overlay dismiss delay after ended/blocked.
pub const ENDED_DISMISS_DELAY: Duration = Duration::from_secs(1);
/// Longer dismiss after auto-hangup so the user can read the confirmation.
pub const AUTO_ENDED_DISMISS_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Ringing,
    Connected,
    Ended,
    AutoEnded,
    Blocked,
}

impl CallState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallState::Ended | CallState::AutoEnded | CallState::Blocked
        )
    }
}

/// User-initiated transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallAction {
    Accept,
    Decline,
    BlockAndDecline,
    Hangup,
}

/// Side effects the driver must carry out, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartWarning,
    StopWarning,
    ArmAutoHangup(Duration),
    CancelAutoHangup,
    BlockNumber(String),
    SaveRecord(CallRecord),
    Dismiss(Duration),
}

/// What the session knows about a call when it starts ringing.
#[derive(Debug, Clone)]
pub struct IncomingCall {
    pub id: String,
    pub phone_number: String,
    pub contact_name: Option<String>,
    pub direction: CallDirection,
    pub timestamp_ms: i64,
    /// Explicit label injected by simulation triggers.
    pub override_risk: Option<RiskStatus>,
}

pub struct CallSession {
    call: IncomingCall,
    state: CallState,
    tier: RiskTier,
    community: Option<PhoneLookupResult>,
    auto_hangup_enabled: bool,
    /// One-shot: the warning tone plays at most once per call.
    warning_started: bool,
    auto_hangup_armed: bool,
    /// Re-entrancy lock — set by the first terminal transition, never
    /// released for this call instance.
    processing: bool,
    connected_secs: u32,
}

impl CallSession {
    /// Start a ringing session. Classification runs immediately with no
    /// community data; the returned effects may already start the warning
    /// and arm auto-hangup for explicitly-flagged calls.
    pub fn new(call: IncomingCall, auto_hangup_enabled: bool) -> (Self, Vec<Effect>) {
        let tier = classify_tier(call.contact_name.as_deref(), call.override_risk, None);
        let mut session = Self {
            call,
            state: CallState::Ringing,
            tier,
            community: None,
            auto_hangup_enabled,
            warning_started: false,
            auto_hangup_armed: false,
            processing: false,
            connected_secs: 0,
        };
        let effects = session.arm_dangerous_response();
        (session, effects)
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn tier(&self) -> RiskTier {
        self.tier
    }

    pub fn connected_secs(&self) -> u32 {
        self.connected_secs
    }

    pub fn phone_number(&self) -> &str {
        &self.call.phone_number
    }

    pub fn contact_name(&self) -> Option<&str> {
        self.call.contact_name.as_deref()
    }

    pub fn community(&self) -> Option<&PhoneLookupResult> {
        self.community.as_ref()
    }

    /// Feed a resolved reputation lookup into the session.
    ///
    /// Results arriving after a terminal state are discarded (the lookup
    /// outlived the call). While ringing the tier is re-evaluated, with one
    /// restriction: once the warning has been signalled the tier never
    /// downgrades from dangerous for the rest of the ring.
    pub fn community_resolved(&mut self, info: PhoneLookupResult) -> Vec<Effect> {
        if self.state.is_terminal() {
            return Vec::new();
        }
        self.community = Some(info);

        if self.state != CallState::Ringing {
            return Vec::new();
        }

        let reclassified = classify_tier(
            self.call.contact_name.as_deref(),
            self.call.override_risk,
            self.community.as_ref(),
        );
        if self.warning_started && reclassified != RiskTier::Dangerous {
            // Pinned: the user has already been warned
            return Vec::new();
        }
        self.tier = reclassified;
        self.arm_dangerous_response()
    }

    /// One second of connected time has elapsed.
    pub fn tick(&mut self) {
        if self.state == CallState::Connected {
            self.connected_secs += 1;
        }
    }

    /// Apply a user action. Invalid or re-entrant actions return no effects.
    pub fn apply(&mut self, action: CallAction) -> Vec<Effect> {
        match action {
            CallAction::Accept => self.accept(),
            CallAction::Decline => self.decline(CallState::Ended),
            CallAction::BlockAndDecline => self.decline(CallState::Blocked),
            CallAction::Hangup => self.hangup(),
        }
    }

    /// The armed auto-hangup countdown fired.
    ///
    /// Guards re-check the full qualifying tuple: the countdown may have
    /// been armed and the world changed before the driver delivered it.
    pub fn auto_hangup_fired(&mut self) -> Vec<Effect> {
        if self.processing
            || self.state != CallState::Ringing
            || self.tier != RiskTier::Dangerous
            || !self.auto_hangup_enabled
            || !self.auto_hangup_armed
        {
            return Vec::new();
        }
        self.processing = true;
        self.auto_hangup_armed = false;
        self.state = CallState::AutoEnded;

        let record = self.finish_record(Some(RiskStatus::Scam));
        vec![
            Effect::StopWarning,
            Effect::SaveRecord(record),
            Effect::Dismiss(AUTO_ENDED_DISMISS_DELAY),
        ]
    }

    fn accept(&mut self) -> Vec<Effect> {
        if self.processing || self.state != CallState::Ringing {
            return Vec::new();
        }
        self.state = CallState::Connected;
        let mut effects = vec![Effect::StopWarning];
        if self.auto_hangup_armed {
            self.auto_hangup_armed = false;
            effects.push(Effect::CancelAutoHangup);
        }
        effects
    }

    fn decline(&mut self, terminal: CallState) -> Vec<Effect> {
        if self.processing || self.state != CallState::Ringing {
            return Vec::new();
        }
        self.processing = true;
        self.state = terminal;

        let mut effects = vec![Effect::StopWarning];
        if self.auto_hangup_armed {
            self.auto_hangup_armed = false;
            effects.push(Effect::CancelAutoHangup);
        }
        if terminal == CallState::Blocked {
            effects.push(Effect::BlockNumber(self.call.phone_number.clone()));
        }
        // Ring time is not counted — duration stays 0
        effects.push(Effect::SaveRecord(self.finish_record(None)));
        effects.push(Effect::Dismiss(ENDED_DISMISS_DELAY));
        effects
    }

    fn hangup(&mut self) -> Vec<Effect> {
        if self.processing || self.state != CallState::Connected {
            return Vec::new();
        }
        self.processing = true;
        self.state = CallState::Ended;
        vec![
            Effect::StopWarning,
            Effect::SaveRecord(self.finish_record(None)),
            Effect::Dismiss(ENDED_DISMISS_DELAY),
        ]
    }

    /// Start the warning and arm the countdown if the call qualifies.
    /// Keyed off the (tier, enabled, state, processing) tuple plus one-shot
    /// flags, so re-invocation never replays or re-arms.
    fn arm_dangerous_response(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state != CallState::Ringing || self.tier != RiskTier::Dangerous {
            return effects;
        }
        if !self.warning_started {
            self.warning_started = true;
            effects.push(Effect::StartWarning);
        }
        if self.auto_hangup_enabled && !self.auto_hangup_armed && !self.processing {
            self.auto_hangup_armed = true;
            effects.push(Effect::ArmAutoHangup(AUTO_HANGUP_DELAY));
        }
        effects
    }

    fn finish_record(&self, forced_status: Option<RiskStatus>) -> CallRecord {
        CallRecord {
            id: self.call.id.clone(),
            phone_number: self.call.phone_number.clone(),
            contact_name: self.call.contact_name.clone(),
            direction: self.call.direction,
            timestamp_ms: self.call.timestamp_ms,
            duration_secs: self.connected_secs,
            risk_status: forced_status.or(self.call.override_risk),
            has_recording: None,
            ai_analysis: None,
            community: self.community.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NumberTag;

    fn incoming(override_risk: Option<RiskStatus>, contact: Option<&str>) -> IncomingCall {
        IncomingCall {
            id: "call-1".to_string(),
            phone_number: "0888999000".to_string(),
            contact_name: contact.map(str::to_string),
            direction: CallDirection::Incoming,
            timestamp_ms: 1_700_000_000_000,
            override_risk,
        }
    }

    fn scam_community() -> PhoneLookupResult {
        PhoneLookupResult {
            phone_number: "0888999000".to_string(),
            carrier: "Vinaphone".to_string(),
            tags: vec![NumberTag::Scam],
            report_count: 1542,
            reputation_score: 5,
            community_label: "Giả danh Công an".to_string(),
        }
    }

    fn clean_community() -> PhoneLookupResult {
        PhoneLookupResult {
            phone_number: "0888999000".to_string(),
            carrier: "Mobifone".to_string(),
            tags: vec![],
            report_count: 0,
            reputation_score: 80,
            community_label: "Chưa có báo cáo".to_string(),
        }
    }

    #[test]
    fn scam_override_starts_warning_immediately() {
        let (session, effects) = CallSession::new(incoming(Some(RiskStatus::Scam), None), false);
        assert_eq!(session.tier(), RiskTier::Dangerous);
        assert_eq!(effects, vec![Effect::StartWarning]);
    }

    #[test]
    fn auto_hangup_arms_only_with_consent() {
        let (_, effects) = CallSession::new(incoming(Some(RiskStatus::Scam), None), true);
        assert!(effects.contains(&Effect::ArmAutoHangup(AUTO_HANGUP_DELAY)));

        let (_, effects) = CallSession::new(incoming(Some(RiskStatus::Scam), None), false);
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::ArmAutoHangup(_))));
    }

    #[test]
    fn auto_hangup_never_fires_without_consent() {
        let (mut session, _) = CallSession::new(incoming(Some(RiskStatus::Scam), None), false);
        assert!(session.auto_hangup_fired().is_empty());
        assert_eq!(session.state(), CallState::Ringing);
    }

    #[test]
    fn auto_hangup_forces_scam_status_and_zero_duration() {
        let (mut session, _) = CallSession::new(incoming(None, None), true);
        let effects = session.community_resolved(scam_community());
        assert!(effects.contains(&Effect::ArmAutoHangup(AUTO_HANGUP_DELAY)));

        let effects = session.auto_hangup_fired();
        assert_eq!(session.state(), CallState::AutoEnded);
        let record = effects.iter().find_map(|e| match e {
            Effect::SaveRecord(r) => Some(r),
            _ => None,
        });
        let record = record.expect("auto-hangup must persist a record");
        assert_eq!(record.risk_status, Some(RiskStatus::Scam));
        assert_eq!(record.duration_secs, 0);
        assert!(effects.contains(&Effect::Dismiss(AUTO_ENDED_DISMISS_DELAY)));
    }

    #[test]
    fn accept_then_decline_is_single_transition() {
        let (mut session, _) = CallSession::new(incoming(None, None), false);
        let accept = session.apply(CallAction::Accept);
        assert_eq!(session.state(), CallState::Connected);
        assert!(accept.contains(&Effect::StopWarning));

        // Decline after accept is a no-op — the call is no longer ringing
        let decline = session.apply(CallAction::Decline);
        assert!(decline.is_empty());
        assert_eq!(session.state(), CallState::Connected);
    }

    #[test]
    fn decline_then_accept_is_single_transition() {
        let (mut session, _) = CallSession::new(incoming(None, None), false);
        let decline = session.apply(CallAction::Decline);
        assert_eq!(session.state(), CallState::Ended);
        assert!(decline
            .iter()
            .any(|e| matches!(e, Effect::SaveRecord(_))));

        let accept = session.apply(CallAction::Accept);
        assert!(accept.is_empty());
        assert_eq!(session.state(), CallState::Ended);
    }

    #[test]
    fn auto_hangup_after_manual_decline_is_dropped() {
        let (mut session, _) = CallSession::new(incoming(Some(RiskStatus::Scam), None), true);
        let effects = session.apply(CallAction::Decline);
        assert!(effects.contains(&Effect::CancelAutoHangup));
        // Countdown delivered late anyway
        assert!(session.auto_hangup_fired().is_empty());
        assert_eq!(session.state(), CallState::Ended);
    }

    #[test]
    fn decline_persists_zero_duration_with_resolved_community() {
        let (mut session, _) = CallSession::new(incoming(None, None), false);
        session.community_resolved(clean_community());
        let effects = session.apply(CallAction::Decline);
        let record = effects
            .iter()
            .find_map(|e| match e {
                Effect::SaveRecord(r) => Some(r),
                _ => None,
            })
            .unwrap();
        assert_eq!(record.duration_secs, 0);
        assert!(record.community.is_some());
        assert!(effects.contains(&Effect::Dismiss(ENDED_DISMISS_DELAY)));
    }

    #[test]
    fn block_and_decline_blocks_then_persists() {
        let (mut session, _) = CallSession::new(incoming(Some(RiskStatus::Scam), None), false);
        let effects = session.apply(CallAction::BlockAndDecline);
        assert_eq!(session.state(), CallState::Blocked);

        let block_pos = effects
            .iter()
            .position(|e| matches!(e, Effect::BlockNumber(_)))
            .expect("block effect");
        let save_pos = effects
            .iter()
            .position(|e| matches!(e, Effect::SaveRecord(_)))
            .expect("save effect");
        assert!(block_pos < save_pos, "block before persist");

        if let Effect::BlockNumber(phone) = &effects[block_pos] {
            assert_eq!(phone, "0888999000");
        }
    }

    #[test]
    fn hangup_persists_ticked_duration() {
        let (mut session, _) = CallSession::new(incoming(None, Some("Bố")), false);
        session.apply(CallAction::Accept);
        for _ in 0..42 {
            session.tick();
        }
        let effects = session.apply(CallAction::Hangup);
        let record = effects
            .iter()
            .find_map(|e| match e {
                Effect::SaveRecord(r) => Some(r),
                _ => None,
            })
            .unwrap();
        assert_eq!(record.duration_secs, 42);
        assert_eq!(record.contact_name.as_deref(), Some("Bố"));
    }

    #[test]
    fn ticks_only_count_while_connected() {
        let (mut session, _) = CallSession::new(incoming(None, None), false);
        session.tick();
        session.tick();
        assert_eq!(session.connected_secs(), 0);
        session.apply(CallAction::Accept);
        session.tick();
        assert_eq!(session.connected_secs(), 1);
    }

    #[test]
    fn late_lookup_upgrades_ringing_tier() {
        let (mut session, initial) = CallSession::new(incoming(None, None), true);
        assert_eq!(session.tier(), RiskTier::Suspicious);
        assert!(initial.is_empty());

        let effects = session.community_resolved(scam_community());
        assert_eq!(session.tier(), RiskTier::Dangerous);
        assert!(effects.contains(&Effect::StartWarning));
        assert!(effects.contains(&Effect::ArmAutoHangup(AUTO_HANGUP_DELAY)));
    }

    #[test]
    fn warned_tier_never_downgrades_while_ringing() {
        let (mut session, _) = CallSession::new(incoming(None, None), false);
        session.community_resolved(scam_community());
        assert_eq!(session.tier(), RiskTier::Dangerous);

        // A second, cleaner lookup result must not flicker the tier back
        let effects = session.community_resolved(clean_community());
        assert!(effects.is_empty());
        assert_eq!(session.tier(), RiskTier::Dangerous);
    }

    #[test]
    fn warning_starts_at_most_once() {
        let (mut session, initial) = CallSession::new(incoming(Some(RiskStatus::Scam), None), false);
        assert_eq!(initial, vec![Effect::StartWarning]);
        let again = session.community_resolved(scam_community());
        assert!(!again.contains(&Effect::StartWarning));
    }

    #[test]
    fn lookup_after_terminal_state_is_discarded() {
        let (mut session, _) = CallSession::new(incoming(None, None), false);
        session.apply(CallAction::Decline);
        let effects = session.community_resolved(scam_community());
        assert!(effects.is_empty());
        assert!(session.community().is_none());
    }

    #[test]
    fn lookup_while_connected_enriches_without_reclassifying() {
        let (mut session, _) = CallSession::new(incoming(None, None), false);
        session.apply(CallAction::Accept);
        let effects = session.community_resolved(scam_community());
        assert!(effects.is_empty());
        assert_eq!(session.tier(), RiskTier::Suspicious);
        // The record still carries the community data for history display
        let saved = {
            session.tick();
            session.apply(CallAction::Hangup)
        };
        let record = saved
            .iter()
            .find_map(|e| match e {
                Effect::SaveRecord(r) => Some(r),
                _ => None,
            })
            .unwrap();
        assert!(record.community.is_some());
    }

    #[test]
    fn safe_contact_never_arms_anything() {
        let (session, effects) = CallSession::new(
            incoming(None, Some("Mẹ Yêu")),
            true, // auto-hangup consent is irrelevant for safe calls
        );
        assert_eq!(session.tier(), RiskTier::Safe);
        assert!(effects.is_empty());
    }
}
