//! The world facade.
//!
//! [`World`] composes the travel graph, the actor registry, the lane
//! eligibility hook, the tick counter, and the travel log behind the
//! operations the HTTP layer serves. Every operation is a short,
//! synchronous critical section on one actor; no operation performs I/O.
//!
//! # Locking
//!
//! - Actor records are locked one at a time, except gossip, which locks
//!   its actors together in sorted name order.
//! - The tick is an atomic and advances once per committed change.
//! - The travel log mutex is only taken after the actor lock is released.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use fizban_types::{
    ActorDescriptor, ActorId, FavorOutcome, FavorRequest, GOSSIP_HEAT_KEY, GossipOutcome,
    GossipRequest, LocationId, Selection, SelectionOutcome, TravelId, TravelOption, TravelReceipt,
    TravelRecord, TravelRequest,
};
use fizban_world::TravelGraph;
use tracing::{debug, info, warn};

use crate::actor::ActorRegistry;
use crate::channels;
use crate::eligibility::{LaneEligibility, RequirementEligibility};
use crate::error::EngineError;
use crate::selection::{apply_validated, validate_selection};
use crate::snapshot::WorldSnapshot;
use crate::travel::{self, DEFAULT_TRAVEL_LOG_CAPACITY, TravelLog, TravelPhase};

/// Tick and actor roster, as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldHealth {
    /// Current world tick.
    pub tick: u64,
    /// Every known actor, sorted.
    pub actors: Vec<ActorId>,
}

/// Shared world state.
#[derive(Debug)]
pub struct World {
    graph: TravelGraph,
    actors: ActorRegistry,
    eligibility: Box<dyn LaneEligibility>,
    tick: AtomicU64,
    travel_log: Mutex<TravelLog>,
}

impl World {
    /// Create a world over `graph` with requirement-checking eligibility
    /// and the default travel log capacity.
    pub fn new(graph: TravelGraph) -> Self {
        Self {
            graph,
            actors: ActorRegistry::new(),
            eligibility: Box::new(RequirementEligibility),
            tick: AtomicU64::new(0),
            travel_log: Mutex::new(TravelLog::new(DEFAULT_TRAVEL_LOG_CAPACITY)),
        }
    }

    /// Replace the lane eligibility hook.
    #[must_use]
    pub fn with_eligibility(mut self, hook: impl LaneEligibility + 'static) -> Self {
        self.eligibility = Box::new(hook);
        self
    }

    /// Replace the travel log with an empty one of `capacity` records.
    #[must_use]
    pub fn with_travel_log_capacity(mut self, capacity: usize) -> Self {
        self.travel_log = Mutex::new(TravelLog::new(capacity));
        self
    }

    /// The static travel graph.
    pub const fn graph(&self) -> &TravelGraph {
        &self.graph
    }

    /// The actor registry.
    pub const fn actors(&self) -> &ActorRegistry {
        &self.actors
    }

    /// Current tick.
    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }

    fn advance_tick(&self) -> Result<u64, EngineError> {
        self.tick
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| t.checked_add(1))
            .map(|previous| previous.saturating_add(1))
            .map_err(|current| EngineError::Internal(format!("tick counter overflow at {current}")))
    }

    // The log is append-only, so a poisoned lock still guards a usable log.
    fn log(&self) -> MutexGuard<'_, TravelLog> {
        self.travel_log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tick and sorted actor roster.
    pub fn health(&self) -> WorldHealth {
        WorldHealth {
            tick: self.tick(),
            actors: self.actors.actor_ids(),
        }
    }

    // -----------------------------------------------------------------
    // Selections and favor
    // -----------------------------------------------------------------

    /// Apply a realm selection atomically and idempotently.
    ///
    /// A repeated `selection_id` for the same actor returns the stored
    /// outcome flagged `replayed` without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] or [`EngineError::UnknownLocation`]
    /// for a bad request, [`EngineError::Internal`] on overflow or a
    /// poisoned lock. On error nothing changes.
    pub fn apply_selection(&self, selection: &Selection) -> Result<SelectionOutcome, EngineError> {
        let validated = validate_selection(selection, &self.graph).inspect_err(|err| {
            warn!(
                actor = %selection.actor,
                selection_id = %selection.selection_id,
                code = err.code(),
                error = %err,
                "Selection rejected"
            );
        })?;

        let outcome = self.actors.with_actor(&validated.actor, |record| {
            if let Some(previous) = record.selections.get(&validated.selection_id) {
                return Ok(SelectionOutcome {
                    replayed: true,
                    ..previous.clone()
                });
            }

            let mut staged = record.clone();
            let mut outcome = apply_validated(&mut staged, &validated)?;
            outcome.tick = self.advance_tick()?;
            staged
                .selections
                .insert(validated.selection_id.clone(), outcome.clone());
            *record = staged;
            Ok(outcome)
        })?;

        if outcome.replayed {
            debug!(
                actor = %outcome.actor,
                selection_id = %outcome.selection_id,
                "Selection replayed"
            );
        } else {
            info!(
                actor = %outcome.actor,
                selection_id = %outcome.selection_id,
                location = %outcome.location,
                relocated = outcome.relocated,
                effects = outcome.applied.len(),
                tick = outcome.tick,
                "Selection applied"
            );
        }
        Ok(outcome)
    }

    /// Apply one favor change to an actor's channel.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a blank actor,
    /// [`EngineError::MalformedEffect`] for a bad channel, key or delta, and
    /// [`EngineError::Internal`] on overflow or a poisoned lock.
    pub fn apply_favor(&self, request: &FavorRequest) -> Result<FavorOutcome, EngineError> {
        if request.actor.is_blank() {
            return Err(EngineError::Validation(String::from("actor must not be empty")));
        }
        let (channel, key) = channels::normalize(&request.channel, &request.key, request.delta)?;

        let (value, tick) = self.actors.with_actor(&request.actor, |record| {
            let mut staged = record.channels.clone();
            let value = staged.apply(&channel, &key, request.delta)?;
            let tick = self.advance_tick()?;
            record.channels = staged;
            Ok((value, tick))
        })?;

        info!(
            actor = %request.actor,
            channel = %channel,
            key = %key,
            delta = request.delta,
            value,
            reason = %request.reason,
            "Favor applied"
        );
        Ok(FavorOutcome {
            actor: request.actor.clone(),
            channel,
            key,
            value,
            tick,
        })
    }

    // -----------------------------------------------------------------
    // Gossip
    // -----------------------------------------------------------------

    /// Pass a rumor from `source` to every receiver.
    ///
    /// Each distinct receiver's `gossip/heat` channel rises by
    /// [`GossipRequest::bump`]. The teller and listeners are locked
    /// together, so either every listener is bumped or none is; the tick
    /// advances once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for blank names, an empty
    /// receiver list, or a strength or heat outside `0.0..=1.0`, and
    /// [`EngineError::Internal`] on overflow or a poisoned lock. On error
    /// nothing changes.
    pub fn propagate_gossip(&self, request: &GossipRequest) -> Result<GossipOutcome, EngineError> {
        check_gossip(request).inspect_err(|err| {
            warn!(
                source = %request.source,
                rumor = %request.item.rumor_id,
                error = %err,
                "Gossip rejected"
            );
        })?;

        let mut receivers: Vec<ActorId> = Vec::with_capacity(request.receivers.len());
        for receiver in &request.receivers {
            if !receivers.contains(receiver) {
                receivers.push(receiver.clone());
            }
        }
        let mut involved = receivers.clone();
        involved.push(request.source.clone());

        let bump = request.bump();
        let tick = self.actors.with_actors(&involved, |records| {
            let mut staged = Vec::with_capacity(receivers.len());
            for (index, (actor, record)) in records.iter().enumerate() {
                if receivers.contains(*actor) {
                    let mut store = record.channels.clone();
                    store.apply(fizban_types::channels::GOSSIP, GOSSIP_HEAT_KEY, bump)?;
                    staged.push((index, store));
                }
            }
            let tick = self.advance_tick()?;
            for (index, store) in staged {
                if let Some((_, record)) = records.get_mut(index) {
                    record.channels = store;
                }
            }
            Ok(tick)
        })?;

        info!(
            source = %request.source,
            rumor = %request.item.rumor_id,
            receivers = receivers.len(),
            bump,
            tick,
            "Gossip propagated"
        );
        Ok(GossipOutcome {
            rumor_id: request.item.rumor_id.clone(),
            source: request.source.clone(),
            receivers,
            bump,
            tick,
        })
    }

    // -----------------------------------------------------------------
    // Travel
    // -----------------------------------------------------------------

    /// Lanes leaving `from`, in configuration order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownLocation`] if `from` is not registered.
    pub fn travel_options(&self, from: &LocationId) -> Result<Vec<TravelOption>, EngineError> {
        Ok(self.graph.options(from)?)
    }

    /// Move an actor along a lane.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`], [`EngineError::LocationMismatch`],
    /// [`EngineError::UnknownLocation`], [`EngineError::NoSuchLane`],
    /// [`EngineError::LaneDenied`], or [`EngineError::Internal`]. On error
    /// the actor's location is unchanged.
    pub fn travel_go(&self, request: &TravelRequest) -> Result<TravelReceipt, EngineError> {
        debug!(
            phase = %TravelPhase::Requested,
            actor = %request.actor,
            from = %request.from_location,
            to = %request.to_location,
            lane = ?request.lane,
            "Travel requested"
        );

        let committed = travel::check_request(request).and_then(|()| {
            self.actors.with_existing(&request.actor, |record| {
                let lane = travel::validate(
                    &self.graph,
                    self.eligibility.as_ref(),
                    request,
                    record.as_deref(),
                )?;
                debug!(
                    phase = %TravelPhase::Validated,
                    actor = %request.actor,
                    lane = %lane.tier,
                    "Travel validated"
                );

                let Some(record) = record else {
                    return Err(EngineError::Internal(format!(
                        "validated travel for unknown actor {}",
                        request.actor
                    )));
                };
                let tick = self.advance_tick()?;
                record.location = Some(request.to_location.clone());
                Ok((lane.clone(), tick))
            })
        });

        let (lane, tick) = committed.inspect_err(|err| {
            warn!(
                phase = %TravelPhase::Rejected,
                actor = %request.actor,
                from = %request.from_location,
                to = %request.to_location,
                code = err.code(),
                error = %err,
                "Travel rejected"
            );
        })?;

        self.log().push(TravelRecord {
            id: TravelId::new(),
            tick,
            at: Utc::now(),
            actor: request.actor.clone(),
            from_location: request.from_location.clone(),
            to_location: request.to_location.clone(),
            lane: lane.tier.clone(),
            provider: lane.provider.clone(),
            tags: lane.tags.clone(),
        });

        info!(
            phase = %TravelPhase::Committed,
            actor = %request.actor,
            from = %request.from_location,
            to = %request.to_location,
            lane = %lane.tier,
            tick,
            "Travel committed"
        );

        Ok(TravelReceipt {
            actor: request.actor.clone(),
            from_location: request.from_location.clone(),
            to_location: request.to_location.clone(),
            message: format!(
                "{} travels from {} to {} by the {}.",
                request.actor, request.from_location, request.to_location, lane.title
            ),
            lane: lane.tier,
            provider: lane.provider,
            tick,
        })
    }

    /// Current location of an actor, `None` if unknown or unplaced.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if the actor's lock is poisoned.
    pub fn where_is(&self, actor: &ActorId) -> Result<Option<LocationId>, EngineError> {
        self.actors.get(actor)
    }

    /// Read-only descriptor of an actor. Unknown actors get an empty
    /// descriptor and are not created.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if the actor's lock is poisoned.
    pub fn describe_actor(&self, actor: &ActorId) -> Result<ActorDescriptor, EngineError> {
        Ok(self
            .actors
            .inspect(actor, |record| record.describe(actor))?
            .unwrap_or_else(|| ActorDescriptor::unknown(actor.clone())))
    }

    /// The newest `limit` committed journeys, newest first.
    pub fn travel_log(&self, limit: usize) -> Vec<TravelRecord> {
        self.log().recent(limit)
    }

    // -----------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------

    /// Copy the complete mutable state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if an actor's lock is poisoned.
    pub fn snapshot(&self) -> Result<WorldSnapshot, EngineError> {
        let tick = self.tick();
        let actors = self.actors.export()?;
        let travel_log = self.log().to_vec();
        Ok(WorldSnapshot {
            tick,
            actors,
            travel_log,
        })
    }

    /// Replace the complete mutable state with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownLocation`] if any actor is placed at a
    /// location missing from the graph; nothing changes in that case.
    pub fn restore(&self, snapshot: WorldSnapshot) -> Result<(), EngineError> {
        for record in snapshot.actors.values() {
            if let Some(location) = &record.location {
                if !self.graph.contains(location) {
                    return Err(EngineError::UnknownLocation(location.clone()));
                }
            }
        }

        let actors = snapshot.actors.len();
        self.actors.replace_all(snapshot.actors);
        self.tick.store(snapshot.tick, Ordering::SeqCst);
        {
            let mut log = self.log();
            let mut fresh = TravelLog::new(log.capacity());
            for entry in snapshot.travel_log {
                fresh.push(entry);
            }
            *log = fresh;
        }

        info!(tick = snapshot.tick, actors, "World restored from snapshot");
        Ok(())
    }
}

fn check_gossip(request: &GossipRequest) -> Result<(), EngineError> {
    if request.source.is_blank() {
        return Err(EngineError::Validation(String::from("source must not be empty")));
    }
    if request.receivers.is_empty() {
        return Err(EngineError::Validation(String::from("receivers must not be empty")));
    }
    if request.receivers.iter().any(ActorId::is_blank) {
        return Err(EngineError::Validation(String::from("receiver names must not be empty")));
    }
    if request.item.rumor_id.trim().is_empty() {
        return Err(EngineError::Validation(String::from("rumor_id must not be empty")));
    }
    for (field, value) in [("strength", request.strength), ("heat", request.item.heat)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(EngineError::Validation(format!(
                "{field} must be within 0.0..=1.0, got {value}"
            )));
        }
    }
    Ok(())
}
