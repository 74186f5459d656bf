//! Periodic-pair controller.
//!
//! Keeps two independently ticking effects refreshed while steering them
//! toward a shared expiration, after which both can be refreshed by a single
//! combined action. The controller is consulted before the general planner
//! whenever the pair is in play.
//!
//! [`SyncController::plan`] is pure: it only proposes a [`RefreshAction`].
//! State changes happen in [`SyncController::record`], once the driver has
//! attempted the proposed refresh.
mod guard;
mod ledger;

pub use guard::guarded_issue_at;
pub use ledger::RecastLedger;

use crate::config::SyncConfig;
use crate::env::{AttemptOutcome, ChargeProjection, EffectSnapshot};
use crate::ids::{ActionId, EffectId};
use crate::time::{SimDuration, SimTime};

/// Phase relation between the two effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncState {
    #[default]
    Unsynced,
    /// The primary was just reapplied; the secondary should follow.
    PrimaryRefreshed { at: SimTime },
    /// Both share an expiration, the primary leading by `drift`.
    Synced { drift: SimDuration },
}

impl SyncState {
    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Synced { .. })
    }

    /// Offset subtracted from the primary's breach deadline.
    pub const fn drift(&self) -> SimDuration {
        match self {
            Self::Synced { drift } => *drift,
            _ => SimDuration::ZERO,
        }
    }
}

/// Which effect(s) a refresh is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RefreshTarget {
    Primary,
    Secondary,
    /// The combined action refreshing both at once.
    Both,
}

/// Why a refresh was proposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RefreshReason {
    /// The primary is inactive or expires before the next cast completes.
    Lapsing,
    /// The secondary follows a fresh primary to bring the pair in phase.
    Realign,
    /// The pending action would empty the refresh pool until after expiry.
    Starvation,
    /// The effect would expire before the pending action finishes.
    Breach,
}

/// Refresh proposed by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefreshAction {
    pub target: RefreshTarget,
    pub reason: RefreshReason,
    pub action: ActionId,
    /// When to issue the action; later than now when a tick is protected.
    pub issue_at: SimTime,
}

impl RefreshAction {
    pub fn is_deferred(&self, now: SimTime) -> bool {
        self.issue_at > now
    }
}

/// One effect of the pair at a decision point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotSnapshot {
    pub effect: EffectSnapshot,
    /// Whether the action refreshing this effect can be cast right now.
    pub castable: bool,
    /// How long the pool paying for the refresh has had a unit ready.
    pub grace: SimDuration,
}

/// The action the driver intends to cast if no refresh is needed, with the
/// charge pools as they would stand after paying for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingAction {
    pub action: ActionId,
    pub primary_pool: ChargeProjection,
    pub secondary_pool: ChargeProjection,
}

/// Inputs to one controller decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SyncContext {
    pub now: SimTime,
    /// Global cooldown of the next cast.
    pub cast_gcd: SimDuration,
    pub primary: SlotSnapshot,
    pub secondary: SlotSnapshot,
    pub pending: Option<PendingAction>,
    pub combined_castable: bool,
}

/// Per-agent controller state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncController {
    config: SyncConfig,
    state: SyncState,
    ledger: RecastLedger,
}

impl SyncController {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            state: SyncState::Unsynced,
            ledger: RecastLedger::default(),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn ledger(&self) -> RecastLedger {
        self.ledger
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Effects in (primary, secondary) order.
    pub fn effects(&self) -> (EffectId, EffectId) {
        self.config.lead.effects()
    }

    /// Proposes the refresh to perform at this decision point, if any.
    pub fn plan(&self, ctx: &SyncContext) -> Option<RefreshAction> {
        let now = ctx.now;
        let primary = &ctx.primary;
        let secondary = &ctx.secondary;

        let lapsing = !primary.effect.active || primary.effect.remaining(now) < ctx.cast_gcd;
        if lapsing && primary.castable {
            if self.state.is_synced() && self.config.combined_refresh && ctx.combined_castable {
                return Some(RefreshAction {
                    target: RefreshTarget::Both,
                    reason: RefreshReason::Lapsing,
                    action: ActionId::Pestilence,
                    issue_at: guarded_issue_at(&primary.effect, primary.grace, now, &self.config),
                });
            }
            return Some(self.refresh(RefreshTarget::Primary, RefreshReason::Lapsing, primary, now));
        }

        if matches!(self.state, SyncState::PrimaryRefreshed { .. }) && secondary.castable {
            return Some(self.refresh(
                RefreshTarget::Secondary,
                RefreshReason::Realign,
                secondary,
                now,
            ));
        }

        let after_cast = now + ctx.cast_gcd;
        let checks = [
            (
                RefreshTarget::Primary,
                primary,
                primary.effect.expires_at - self.state.drift(),
                ctx.pending.map(|p| p.primary_pool),
            ),
            (
                RefreshTarget::Secondary,
                secondary,
                secondary.effect.expires_at,
                ctx.pending.map(|p| p.secondary_pool),
            ),
        ];
        checks
            .into_iter()
            .filter(|(_, slot, _, _)| slot.castable)
            .find_map(|(target, slot, deadline, pool)| {
                breach_reason(deadline, after_cast, pool)
                    .map(|reason| self.refresh(target, reason, slot, now))
            })
    }

    fn refresh(
        &self,
        target: RefreshTarget,
        reason: RefreshReason,
        slot: &SlotSnapshot,
        now: SimTime,
    ) -> RefreshAction {
        RefreshAction {
            target,
            reason,
            action: slot.effect.effect.applied_by(),
            issue_at: guarded_issue_at(&slot.effect, slot.grace, now, &self.config),
        }
    }

    /// Applies the outcome of an attempted refresh issued at `at`.
    pub fn record(&mut self, target: RefreshTarget, outcome: AttemptOutcome, at: SimTime) {
        if !outcome.landed() {
            tracing::warn!(%target, %outcome, at = %at, "periodic refresh did not land");
            self.state = SyncState::Unsynced;
            return;
        }
        match target {
            RefreshTarget::Primary => {
                self.ledger.primary = true;
                self.state = SyncState::PrimaryRefreshed { at };
            }
            RefreshTarget::Secondary => {
                self.ledger.secondary = true;
                if let SyncState::PrimaryRefreshed { at: primary_at } = self.state {
                    self.state = SyncState::Synced {
                        drift: at.saturating_since(primary_at),
                    };
                }
            }
            RefreshTarget::Both => {
                self.ledger.primary = true;
                self.ledger.secondary = true;
                self.state = SyncState::Synced {
                    drift: SimDuration::ZERO,
                };
            }
        }
        tracing::debug!(%target, at = %at, state = ?self.state, "periodic refresh landed");
    }

    pub fn should_spread(&self, targets: u32) -> bool {
        self.ledger.should_spread(targets)
    }

    pub fn record_spread(&mut self, outcome: AttemptOutcome) {
        self.ledger.record_spread(outcome.landed());
    }
}

/// Whether an effect with `deadline` must be refreshed before the pending
/// action, given the pool the refresh would draw from.
fn breach_reason(
    deadline: SimTime,
    after_cast: SimTime,
    pool: Option<ChargeProjection>,
) -> Option<RefreshReason> {
    match pool {
        Some(pool) if pool.is_starved() => {
            (deadline < pool.next_unit_at).then_some(RefreshReason::Starvation)
        }
        _ => (after_cast > deadline).then_some(RefreshReason::Breach),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GCD: SimDuration = SimDuration::from_millis(1_000);

    fn slot(effect: EffectId, expires_ms: i64, tick_ms: Option<i64>) -> SlotSnapshot {
        SlotSnapshot {
            effect: EffectSnapshot {
                effect,
                active: true,
                expires_at: SimTime::from_millis(expires_ms),
                next_tick_at: tick_ms.map(SimTime::from_millis),
            },
            castable: true,
            grace: SimDuration::ZERO,
        }
    }

    fn context(now_ms: i64, primary: SlotSnapshot, secondary: SlotSnapshot) -> SyncContext {
        SyncContext {
            now: SimTime::from_millis(now_ms),
            cast_gcd: GCD,
            primary,
            secondary,
            pending: None,
            combined_castable: true,
        }
    }

    fn untouched(units: u32) -> ChargeProjection {
        ChargeProjection {
            cost: 0,
            units_after: units,
            next_unit_at: SimTime::ZERO,
        }
    }

    #[test]
    fn final_ticks_are_protected_and_pair_converges() {
        let mut controller = SyncController::new(SyncConfig {
            combined_refresh: true,
            ..SyncConfig::default()
        });

        // Both effects are down to their last tick.
        let ctx = context(
            900,
            slot(EffectId::FrostFever, 1_000, Some(1_000)),
            slot(EffectId::BloodPlague, 1_400, Some(1_400)),
        );
        let first = controller.plan(&ctx).unwrap();
        assert_eq!(first.target, RefreshTarget::Primary);
        assert_eq!(first.reason, RefreshReason::Lapsing);
        assert_eq!(first.action, ActionId::IcyTouch);
        assert_eq!(first.issue_at, SimTime::from_millis(1_050));
        assert_eq!(controller.state(), SyncState::Unsynced);

        controller.record(first.target, AttemptOutcome::Landed, first.issue_at);
        assert_eq!(
            controller.state(),
            SyncState::PrimaryRefreshed {
                at: SimTime::from_millis(1_050)
            }
        );

        let ctx = context(
            1_100,
            slot(EffectId::FrostFever, 16_050, Some(4_050)),
            slot(EffectId::BloodPlague, 1_400, Some(1_400)),
        );
        let second = controller.plan(&ctx).unwrap();
        assert_eq!(second.target, RefreshTarget::Secondary);
        assert_eq!(second.reason, RefreshReason::Realign);
        assert_eq!(second.issue_at, SimTime::from_millis(1_450));

        controller.record(second.target, AttemptOutcome::Landed, second.issue_at);
        assert_eq!(
            controller.state(),
            SyncState::Synced {
                drift: SimDuration::from_millis(400)
            }
        );

        // Next time the primary is due, one combined action covers both.
        let ctx = context(
            15_500,
            slot(EffectId::FrostFever, 16_050, Some(16_050)),
            slot(EffectId::BloodPlague, 16_450, Some(16_450)),
        );
        let third = controller.plan(&ctx).unwrap();
        assert_eq!(third.target, RefreshTarget::Both);
        assert_eq!(third.action, ActionId::Pestilence);
        assert_eq!(third.issue_at, SimTime::from_millis(15_500));

        controller.record(third.target, AttemptOutcome::Landed, third.issue_at);
        assert_eq!(controller.state().drift(), SimDuration::ZERO);
        assert!(controller.should_spread(2));
    }

    #[test]
    fn combined_refresh_requires_config() {
        let mut controller = SyncController::new(SyncConfig::default());
        controller.record(RefreshTarget::Both, AttemptOutcome::Landed, SimTime::ZERO);

        let ctx = context(
            14_500,
            slot(EffectId::FrostFever, 15_000, None),
            slot(EffectId::BloodPlague, 15_000, None),
        );
        assert_eq!(
            controller.plan(&ctx).unwrap().target,
            RefreshTarget::Primary
        );
    }

    #[test]
    fn miss_reverts_to_unsynced() {
        let mut controller = SyncController::new(SyncConfig::default());
        controller.record(RefreshTarget::Primary, AttemptOutcome::Landed, SimTime::ZERO);
        controller.record(
            RefreshTarget::Secondary,
            AttemptOutcome::Missed,
            SimTime::from_millis(1_000),
        );
        assert_eq!(controller.state(), SyncState::Unsynced);
        assert!(!controller.ledger().secondary);
    }

    #[test]
    fn inactive_primary_is_refreshed_immediately() {
        let controller = SyncController::new(SyncConfig::default());
        let mut primary = slot(EffectId::FrostFever, 0, None);
        primary.effect.active = false;
        let ctx = context(5_000, primary, slot(EffectId::BloodPlague, 9_000, None));

        let refresh = controller.plan(&ctx).unwrap();
        assert_eq!(refresh.target, RefreshTarget::Primary);
        assert!(!refresh.is_deferred(ctx.now));
    }

    #[test]
    fn nothing_due_yields_no_refresh() {
        let controller = SyncController::new(SyncConfig::default());
        let mut ctx = context(
            1_000,
            slot(EffectId::FrostFever, 10_000, Some(3_000)),
            slot(EffectId::BloodPlague, 12_000, Some(4_000)),
        );
        ctx.pending = Some(PendingAction {
            action: ActionId::ScourgeStrike,
            primary_pool: untouched(1),
            secondary_pool: untouched(0),
        });
        assert_eq!(controller.plan(&ctx), None);
    }

    #[test]
    fn starving_pending_action_forces_early_refresh() {
        let controller = SyncController::new(SyncConfig::default());
        let mut ctx = context(
            1_000,
            slot(EffectId::FrostFever, 6_000, None),
            slot(EffectId::BloodPlague, 12_000, None),
        );
        ctx.pending = Some(PendingAction {
            action: ActionId::ScourgeStrike,
            primary_pool: ChargeProjection {
                cost: 1,
                units_after: 0,
                next_unit_at: SimTime::from_millis(10_000),
            },
            secondary_pool: untouched(1),
        });

        let refresh = controller.plan(&ctx).unwrap();
        assert_eq!(refresh.target, RefreshTarget::Primary);
        assert_eq!(refresh.reason, RefreshReason::Starvation);
    }

    #[test]
    fn secondary_breach_is_refreshed() {
        let controller = SyncController::new(SyncConfig::default());
        let ctx = context(
            1_000,
            slot(EffectId::FrostFever, 10_000, None),
            slot(EffectId::BloodPlague, 1_800, None),
        );

        let refresh = controller.plan(&ctx).unwrap();
        assert_eq!(refresh.target, RefreshTarget::Secondary);
        assert_eq!(refresh.reason, RefreshReason::Breach);
        assert_eq!(refresh.action, ActionId::PlagueStrike);
    }

    #[test]
    fn drift_pulls_the_primary_deadline_forward() {
        let mut controller = SyncController::new(SyncConfig::default());
        controller.record(RefreshTarget::Primary, AttemptOutcome::Landed, SimTime::ZERO);
        controller.record(
            RefreshTarget::Secondary,
            AttemptOutcome::Landed,
            SimTime::from_millis(1_500),
        );

        // Primary still has 2.2s left, so it is not lapsing, but the drift
        // brings its deadline inside the next cast.
        let ctx = context(
            10_000,
            slot(EffectId::FrostFever, 12_200, None),
            slot(EffectId::BloodPlague, 13_700, None),
        );
        let refresh = controller.plan(&ctx).unwrap();
        assert_eq!(refresh.target, RefreshTarget::Primary);
        assert_eq!(refresh.reason, RefreshReason::Breach);
    }

    #[test]
    fn uncastable_refreshes_are_not_proposed() {
        let controller = SyncController::new(SyncConfig::default());
        let mut primary = slot(EffectId::FrostFever, 1_200, None);
        primary.castable = false;
        let mut secondary = slot(EffectId::BloodPlague, 1_200, None);
        secondary.castable = false;
        assert_eq!(controller.plan(&context(1_000, primary, secondary)), None);
    }
}
