// Async driver for a call session.
//
// The session decides; the driver executes. All wall-clock behavior lives
// here: the auto-hangup countdown, the 1-second connected ticker, the
// terminal-state dismiss delay, and the in-flight reputation lookup. The
// lookup runs on its own task and reports through a oneshot channel, so a
// result that arrives after the call ended is simply discarded by the
// session's liveness guard.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::oneshot;
use tokio::time::{interval_at, sleep_until, Duration, Instant};
use tracing::warn;

use super::session::{CallAction, CallSession, CallState, Effect, IncomingCall};
use crate::account::Account;
use crate::ai::{self, traits::ScamAnalyzer};
use crate::alert::{Notifier, WarningGuard, WarningSound};
use crate::db::models::CallRecord;
use crate::directory::ReputationDirectory;
use crate::output::terminal;

/// Calls nobody answers stop ringing after this long and are recorded as
/// declined.
const RING_TIMEOUT: Duration = Duration::from_secs(30);

/// Scripted user actions, as offsets from ring start. Drives simulations and
/// tests; a real UI would feed actions as they happen.
#[derive(Debug, Clone, Default)]
pub struct CallScript {
    pub actions: Vec<(Duration, CallAction)>,
}

/// How the call ended.
pub struct CallOutcome {
    pub final_state: CallState,
    pub record: Option<CallRecord>,
}

/// Run one incoming call to completion.
///
/// Calls from blocked numbers are rejected immediately without ringing.
pub async fn run_call(
    mut call: IncomingCall,
    account: &mut Account,
    directory: Arc<dyn ReputationDirectory>,
    analyzer: &dyn ScamAnalyzer,
    sound: Arc<dyn WarningSound>,
    notifier: &dyn Notifier,
    script: CallScript,
) -> Result<CallOutcome> {
    // Saved contacts win over any name the trigger supplied
    call.contact_name = account
        .profile
        .contact_name(&call.phone_number)
        .map(str::to_string)
        .or(call.contact_name);

    let blocked = account.profile.is_blocked(&call.phone_number);
    let auto_hangup_enabled = account.profile.auto_hangup_high_risk;
    let (mut session, initial_effects) = CallSession::new(call, auto_hangup_enabled);

    let warning = WarningGuard::new(sound);
    let mut ctx = EffectContext {
        warning: &warning,
        notifier,
        auto_hangup_at: None,
        dismiss_at: None,
        record: None,
    };

    if blocked {
        notifier.notify(&format!(
            "Số {} nằm trong danh sách chặn — từ chối tự động.",
            session.phone_number()
        ));
        let effects = session.apply(CallAction::Decline);
        apply_effects(effects, account, analyzer, &mut ctx).await?;
        return Ok(CallOutcome {
            final_state: session.state(),
            record: ctx.record,
        });
    }

    terminal::display_incoming(&session);
    apply_effects(initial_effects, account, analyzer, &mut ctx).await?;

    // Reputation lookup on its own task; the oneshot decouples its lifetime
    // from the call's.
    let (lookup_tx, mut lookup_rx) = oneshot::channel();
    {
        let directory = directory.clone();
        let phone = session.phone_number().to_string();
        tokio::spawn(async move {
            let result = directory.lookup(&phone).await;
            let _ = lookup_tx.send(result);
        });
    }
    let mut lookup_pending = true;

    let started = Instant::now();
    let ring_deadline = started + RING_TIMEOUT;
    let mut ticker = interval_at(started + Duration::from_secs(1), Duration::from_secs(1));
    let mut actions = script.actions;
    actions.sort_by_key(|(offset, _)| *offset);
    let mut next_action = 0;
    let mut last_state = session.state();

    loop {
        let far_future = Instant::now() + Duration::from_secs(86_400);
        let action_deadline = actions
            .get(next_action)
            .map_or(far_future, |(offset, _)| started + *offset);

        tokio::select! {
            result = &mut lookup_rx, if lookup_pending => {
                lookup_pending = false;
                match result {
                    Ok(Ok(Some(info))) => {
                        let effects = session.community_resolved(info);
                        apply_effects(effects, account, analyzer, &mut ctx).await?;
                    }
                    Ok(Ok(None)) => {}
                    Ok(Err(e)) => warn!(error = %e, "reputation lookup failed"),
                    Err(_) => warn!("reputation lookup task dropped"),
                }
            }
            _ = sleep_until(ctx.auto_hangup_at.unwrap_or(far_future)), if ctx.auto_hangup_at.is_some() => {
                ctx.auto_hangup_at = None;
                let effects = session.auto_hangup_fired();
                apply_effects(effects, account, analyzer, &mut ctx).await?;
            }
            _ = sleep_until(action_deadline), if next_action < actions.len() => {
                let (_, action) = actions[next_action];
                next_action += 1;
                let effects = session.apply(action);
                apply_effects(effects, account, analyzer, &mut ctx).await?;
            }
            _ = sleep_until(ring_deadline), if session.state() == CallState::Ringing => {
                notifier.notify("Cuộc gọi nhỡ — không ai trả lời.");
                let effects = session.apply(CallAction::Decline);
                apply_effects(effects, account, analyzer, &mut ctx).await?;
            }
            _ = sleep_until(ctx.dismiss_at.unwrap_or(far_future)), if ctx.dismiss_at.is_some() => {
                break;
            }
            _ = ticker.tick() => {
                session.tick();
            }
        }

        if session.state() != last_state {
            last_state = session.state();
            terminal::display_transition(&session);
        }
    }

    Ok(CallOutcome {
        final_state: session.state(),
        record: ctx.record,
    })
}

struct EffectContext<'a> {
    warning: &'a WarningGuard,
    notifier: &'a dyn Notifier,
    auto_hangup_at: Option<Instant>,
    dismiss_at: Option<Instant>,
    record: Option<CallRecord>,
}

async fn apply_effects(
    effects: Vec<Effect>,
    account: &mut Account,
    analyzer: &dyn ScamAnalyzer,
    ctx: &mut EffectContext<'_>,
) -> Result<()> {
    for effect in effects {
        match effect {
            Effect::StartWarning => ctx.warning.start().await,
            Effect::StopWarning => ctx.warning.stop().await,
            Effect::ArmAutoHangup(delay) => {
                ctx.auto_hangup_at = Some(Instant::now() + delay);
            }
            Effect::CancelAutoHangup => ctx.auto_hangup_at = None,
            Effect::BlockNumber(phone) => {
                account.block_number(&phone).await?;
                ctx.notifier.notify(&format!("Đã chặn số {phone}."));
            }
            Effect::SaveRecord(mut record) => {
                record.ai_analysis = Some(ai::analyze_call(analyzer, &record).await);
                ctx.record = Some(record.clone());
                account.record_call(record).await?;
            }
            Effect::Dismiss(delay) => {
                ctx.dismiss_at = Some(Instant::now() + delay);
            }
        }
    }
    Ok(())
}
