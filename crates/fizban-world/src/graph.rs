//! Travel graph: locations as nodes, tiered lanes as directed edges.
//!
//! The [`TravelGraph`] answers two questions: which options leave a
//! location, and whether a specific `(destination, tier)` lane exists.
//! It is built once at startup and read concurrently afterwards; nothing
//! mutates it while requests are served.
//!
//! Internally an adjacency map stores the outbound lanes of every location
//! in insertion order, which is the order options are served in.

use std::collections::BTreeMap;

use fizban_types::{LocationId, TravelOption};
use tracing::debug;

use crate::error::WorldError;
use crate::lane::Lane;
use crate::spec::GraphSpec;

/// The travel graph holding all locations and their outbound lanes.
#[derive(Debug, Clone, Default)]
pub struct TravelGraph {
    /// Outbound adjacency: location -> lanes departing from it.
    outbound: BTreeMap<LocationId, Vec<Lane>>,
}

impl TravelGraph {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self {
            outbound: BTreeMap::new(),
        }
    }

    /// Build and validate a graph from its declarative description.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateLocation`], [`WorldError::UnknownTier`],
    /// [`WorldError::UnknownLocation`], [`WorldError::DuplicateLane`] or
    /// [`WorldError::BlankName`] when the description is inconsistent.
    pub fn from_spec(spec: &GraphSpec) -> Result<Self, WorldError> {
        let mut graph = Self::new();
        for location in &spec.locations {
            graph.add_location(location.clone())?;
        }

        for route in &spec.routes {
            let mut tiers = Vec::with_capacity(route.lanes.len());
            for tier_name in &route.lanes {
                if tier_name.trim().is_empty() {
                    return Err(WorldError::BlankName);
                }
                let tier = spec
                    .tiers
                    .get(tier_name)
                    .ok_or_else(|| WorldError::UnknownTier(tier_name.clone()))?;
                tiers.push((tier_name, tier));
            }

            for to in &route.to {
                for &(tier_name, tier) in &tiers {
                    let mut pairs = vec![(&route.from, to)];
                    if route.bidirectional {
                        pairs.push((to, &route.from));
                    }
                    for (origin, destination) in pairs {
                        let mut tags = vec![route.provider.clone()];
                        tags.extend(tier.tag.iter().cloned());
                        graph.add_lane(
                            origin,
                            Lane {
                                to: destination.clone(),
                                tier: tier_name.clone(),
                                title: format!("{} → {destination}", tier.title),
                                description: format!(
                                    "Take the {} ({tier_name}) from {origin} to {destination}.",
                                    tier.title
                                ),
                                tags,
                                cost: route.cost,
                                provider: route.provider.clone(),
                                requires: route.requires.clone(),
                            },
                        )?;
                    }
                }
            }
        }

        debug!(
            locations = graph.location_count(),
            lanes = graph.lane_count(),
            "Travel graph built"
        );
        Ok(graph)
    }

    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Register a location with no lanes.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateLocation`] if it already exists, or
    /// [`WorldError::BlankName`] for an empty name.
    pub fn add_location(&mut self, id: LocationId) -> Result<(), WorldError> {
        if id.is_blank() {
            return Err(WorldError::BlankName);
        }
        if self.outbound.contains_key(&id) {
            return Err(WorldError::DuplicateLocation(id));
        }
        self.outbound.insert(id, Vec::new());
        Ok(())
    }

    /// Add a lane leaving `from`.
    ///
    /// Both endpoints must already be registered.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownLocation`] if either endpoint is missing,
    /// or [`WorldError::DuplicateLane`] if the same `(destination, tier)`
    /// lane already leaves `from`.
    pub fn add_lane(&mut self, from: &LocationId, lane: Lane) -> Result<(), WorldError> {
        if !self.outbound.contains_key(&lane.to) {
            return Err(WorldError::UnknownLocation(lane.to));
        }
        let lanes = self
            .outbound
            .get_mut(from)
            .ok_or_else(|| WorldError::UnknownLocation(from.clone()))?;
        if lanes.iter().any(|l| l.connects(&lane.to, &lane.tier)) {
            return Err(WorldError::DuplicateLane {
                from: from.clone(),
                to: lane.to,
                lane: lane.tier,
            });
        }
        lanes.push(lane);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Whether `id` is a registered location.
    pub fn contains(&self, id: &LocationId) -> bool {
        self.outbound.contains_key(id)
    }

    /// Return the number of locations.
    pub fn location_count(&self) -> usize {
        self.outbound.len()
    }

    /// Return the total number of lanes.
    pub fn lane_count(&self) -> usize {
        self.outbound.values().map(Vec::len).sum()
    }

    /// Iterate over all location ids in sorted order.
    pub fn location_ids(&self) -> impl Iterator<Item = &LocationId> {
        self.outbound.keys()
    }

    /// Lanes leaving `from`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownLocation`] if `from` is not registered.
    pub fn lanes(&self, from: &LocationId) -> Result<&[Lane], WorldError> {
        self.outbound
            .get(from)
            .map(Vec::as_slice)
            .ok_or_else(|| WorldError::UnknownLocation(from.clone()))
    }

    /// Travel options leaving `from`.
    ///
    /// A registered location with no lanes is a dead end and yields an
    /// empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownLocation`] if `from` is not registered.
    pub fn options(&self, from: &LocationId) -> Result<Vec<TravelOption>, WorldError> {
        Ok(self.lanes(from)?.iter().map(Lane::to_option).collect())
    }

    /// Find the lane of tier `tier` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownLocation`] if `from` is not registered,
    /// or [`WorldError::NoSuchLane`] if no such lane exists.
    pub fn resolve(&self, from: &LocationId, to: &LocationId, tier: &str) -> Result<&Lane, WorldError> {
        self.lanes(from)?
            .iter()
            .find(|l| l.connects(to, tier))
            .ok_or_else(|| WorldError::NoSuchLane {
                from: from.clone(),
                to: to.clone(),
                lane: tier.to_owned(),
            })
    }

    /// Find the first lane, in option order, from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownLocation`] if `from` is not registered,
    /// or [`WorldError::NoRouteBetween`] if no lane reaches `to`.
    pub fn resolve_any(&self, from: &LocationId, to: &LocationId) -> Result<&Lane, WorldError> {
        self.lanes(from)?
            .iter()
            .find(|l| l.to == *to)
            .ok_or_else(|| WorldError::NoRouteBetween {
                from: from.clone(),
                to: to.clone(),
            })
    }
}
