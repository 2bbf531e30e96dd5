//! Travel state machine and the bounded travel log.
//!
//! Every travel request moves through
//! `Requested -> Validated -> Committed`, or `Requested -> Rejected`:
//!
//! - **Requested**: the request is well formed (no blank names).
//! - **Validated**: the actor really is at `from_location`, a lane to
//!   `to_location` resolves in the graph, and the eligibility hook allows
//!   it.
//! - **Committed**: the actor's location is overwritten, the tick
//!   advances, and a [`TravelRecord`] is appended to the log.
//! - **Rejected**: any failure; no state changes.
//!
//! The `Validated` checks and the commit run under the actor's lock, so a
//! concurrent selection or travel of the same actor can't slip in between.

use std::collections::VecDeque;

use fizban_types::{LocationId, TravelRecord, TravelRequest};
use fizban_world::{Lane, TravelGraph};

use crate::actor::ActorRecord;
use crate::eligibility::{Eligibility, LaneEligibility};
use crate::error::EngineError;

/// Default number of travel records kept in memory.
pub const DEFAULT_TRAVEL_LOG_CAPACITY: usize = 200;

/// Phase of a travel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelPhase {
    /// Received, not yet checked against world state.
    Requested,
    /// Checked; ready to commit.
    Validated,
    /// Applied.
    Committed,
    /// Refused; nothing changed.
    Rejected,
}

impl std::fmt::Display for TravelPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Requested => "requested",
            Self::Validated => "validated",
            Self::Committed => "committed",
            Self::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// Check that a request is well formed.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] if the actor, either location, or a
/// given lane is blank.
pub fn check_request(request: &TravelRequest) -> Result<(), EngineError> {
    if request.actor.is_blank() {
        return Err(EngineError::Validation(String::from("actor must not be empty")));
    }
    if request.from_location.is_blank() || request.to_location.is_blank() {
        return Err(EngineError::Validation(String::from(
            "from_location and to_location must not be empty",
        )));
    }
    if request.lane.as_deref().is_some_and(|lane| lane.trim().is_empty()) {
        return Err(EngineError::Validation(String::from("lane must not be empty")));
    }
    Ok(())
}

/// Validate a travel request against the actor's current record.
///
/// `record` is `None` for an actor the world has never seen, which is
/// treated as unplaced. When the request names no lane, the first lane to
/// the destination in option order is used.
///
/// # Errors
///
/// Returns [`EngineError::LocationMismatch`], [`EngineError::UnknownLocation`],
/// [`EngineError::NoSuchLane`], or [`EngineError::LaneDenied`].
pub fn validate<'g>(
    graph: &'g TravelGraph,
    eligibility: &dyn LaneEligibility,
    request: &TravelRequest,
    record: Option<&ActorRecord>,
) -> Result<&'g Lane, EngineError> {
    let actual: Option<&LocationId> = record.and_then(|r| r.location.as_ref());
    if actual != Some(&request.from_location) {
        return Err(EngineError::LocationMismatch {
            actor: request.actor.clone(),
            claimed: request.from_location.clone(),
            actual: actual.cloned(),
        });
    }

    let lane = match request.lane.as_deref() {
        Some(tier) => graph.resolve(&request.from_location, &request.to_location, tier.trim())?,
        None => graph.resolve_any(&request.from_location, &request.to_location)?,
    };

    let unplaced = ActorRecord::default();
    let standing = record.unwrap_or(&unplaced);
    match eligibility.check(&request.actor, lane, standing) {
        Eligibility::Allow => Ok(lane),
        Eligibility::Deny(reason) => Err(EngineError::LaneDenied {
            to: lane.to.clone(),
            lane: lane.tier.clone(),
            reason,
        }),
    }
}

/// Bounded, oldest-first log of committed journeys.
#[derive(Debug, Clone)]
pub struct TravelLog {
    capacity: usize,
    entries: VecDeque<TravelRecord>,
}

impl TravelLog {
    /// Create a log keeping at most `capacity` records (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Maximum number of records kept.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a record in tick order, evicting the oldest when full.
    ///
    /// Records of concurrent journeys may arrive out of tick order; the
    /// log stays sorted by tick regardless.
    pub fn push(&mut self, record: TravelRecord) {
        let at = self.entries.partition_point(|r| r.tick <= record.tick);
        self.entries.insert(at, record);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// The `limit` records with the highest ticks, newest first.
    pub fn recent(&self, limit: usize) -> Vec<TravelRecord> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    /// Every record in tick order, oldest first.
    pub fn to_vec(&self) -> Vec<TravelRecord> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for TravelLog {
    fn default() -> Self {
        Self::new(DEFAULT_TRAVEL_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fizban_types::{ActorId, TravelId};
    use fizban_world::create_starting_graph;

    use super::*;
    use crate::eligibility::{AllowAll, RequirementEligibility};

    fn request(from: &str, to: &str, lane: Option<&str>) -> TravelRequest {
        TravelRequest {
            actor: ActorId::from("Player"),
            from_location: LocationId::from(from),
            to_location: LocationId::from(to),
            lane: lane.map(str::to_owned),
        }
    }

    fn at(location: &str) -> ActorRecord {
        ActorRecord {
            location: Some(LocationId::from(location)),
            ..ActorRecord::default()
        }
    }

    fn record(tick: u64) -> TravelRecord {
        TravelRecord {
            id: TravelId::new(),
            tick,
            at: Utc::now(),
            actor: ActorId::from("Player"),
            from_location: LocationId::from("RainbowBridge"),
            to_location: LocationId::from("Whiterun"),
            lane: "gold".to_owned(),
            provider: "rainbow_bridge".to_owned(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn blank_fields_rejected_at_request() {
        assert!(check_request(&request("", "Whiterun", None)).is_err());
        assert!(check_request(&request("RainbowBridge", "Whiterun", Some(" "))).is_err());
        assert!(check_request(&request("RainbowBridge", "Whiterun", Some("gold"))).is_ok());
    }

    #[test]
    fn unplaced_actor_is_a_mismatch() {
        let graph = create_starting_graph().unwrap_or_default();
        let err = validate(&graph, &AllowAll, &request("RainbowBridge", "Whiterun", None), None).err();
        assert_eq!(err.map(|e| e.code()), Some("location_mismatch"));
    }

    #[test]
    fn stale_origin_is_a_mismatch() {
        let graph = create_starting_graph().unwrap_or_default();
        let actor = at("Whiterun");
        let err = validate(
            &graph,
            &AllowAll,
            &request("RainbowBridge", "Riften", Some("gold")),
            Some(&actor),
        )
        .err();
        assert_eq!(err.map(|e| e.code()), Some("location_mismatch"));
    }

    #[test]
    fn named_lane_resolves() {
        let graph = create_starting_graph().unwrap_or_default();
        let actor = at("RainbowBridge");
        let lane = validate(
            &graph,
            &RequirementEligibility,
            &request("RainbowBridge", "Whiterun", Some("blue")),
            Some(&actor),
        );
        assert_eq!(lane.map(|l| l.tier.as_str()), Ok("blue"));
    }

    #[test]
    fn omitted_lane_takes_first_option() {
        let graph = create_starting_graph().unwrap_or_default();
        let actor = at("RainbowBridge");
        let lane = validate(
            &graph,
            &RequirementEligibility,
            &request("RainbowBridge", "Whiterun", None),
            Some(&actor),
        );
        assert_eq!(lane.map(|l| l.tier.as_str()), Ok("gold"));
    }

    #[test]
    fn unknown_tier_is_no_such_lane() {
        let graph = create_starting_graph().unwrap_or_default();
        let actor = at("RainbowBridge");
        let err = validate(
            &graph,
            &AllowAll,
            &request("RainbowBridge", "Whiterun", Some("purple")),
            Some(&actor),
        )
        .err();
        assert_eq!(err.map(|e| e.code()), Some("no_such_lane"));
    }

    #[test]
    fn log_evicts_oldest() {
        let mut log = TravelLog::new(2);
        for tick in 1..=3 {
            log.push(record(tick));
        }
        assert_eq!(log.len(), 2);
        let ticks: Vec<u64> = log.recent(10).iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![3, 2]);
        let oldest_first: Vec<u64> = log.to_vec().iter().map(|r| r.tick).collect();
        assert_eq!(oldest_first, vec![2, 3]);
    }

    #[test]
    fn zero_capacity_still_keeps_latest() {
        let mut log = TravelLog::new(0);
        log.push(record(1));
        log.push(record(2));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.recent(5).first().map(|r| r.tick), Some(2));
    }

    #[test]
    fn late_record_is_placed_by_tick() {
        let mut log = TravelLog::new(3);
        log.push(record(1));
        log.push(record(3));
        log.push(record(2));
        let ticks: Vec<u64> = log.recent(10).iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![3, 2, 1]);

        log.push(record(5));
        log.push(record(4));
        let ticks: Vec<u64> = log.to_vec().iter().map(|r| r.tick).collect();
        assert_eq!(ticks, vec![3, 4, 5]);
    }
}
