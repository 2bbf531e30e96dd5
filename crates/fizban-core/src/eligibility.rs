//! Lane eligibility hooks.
//!
//! Travel consults a [`LaneEligibility`] implementation after the lane has
//! been resolved and before the move commits. The check is synchronous and
//! runs under the travelling actor's lock.

use fizban_types::ActorId;
use fizban_world::{Lane, Standing, check_requirements};

/// Verdict of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// The actor may take the lane.
    Allow,
    /// The actor may not take the lane.
    Deny(String),
}

/// Decides whether an actor may take a lane.
pub trait LaneEligibility: Send + Sync + std::fmt::Debug {
    /// Check `lane` for `actor`, whose current state is `standing`.
    fn check(&self, actor: &ActorId, lane: &Lane, standing: &dyn Standing) -> Eligibility;
}

/// Allows every lane.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl LaneEligibility for AllowAll {
    fn check(&self, _actor: &ActorId, _lane: &Lane, _standing: &dyn Standing) -> Eligibility {
        Eligibility::Allow
    }
}

/// Enforces the lane's declared requirements.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementEligibility;

impl LaneEligibility for RequirementEligibility {
    fn check(&self, _actor: &ActorId, lane: &Lane, standing: &dyn Standing) -> Eligibility {
        match check_requirements(lane, standing) {
            Ok(()) => Eligibility::Allow,
            Err(reason) => Eligibility::Deny(reason),
        }
    }
}
